//! Tests for the shared best record and the per-worker GRASP loop.

use carp_grasp::config::Config;
use carp_grasp::global_best::GlobalBest;
use carp_grasp::grasp::GraspWorker;
use carp_grasp::problem::{Cost, Link, Problem, Service};
use carp_grasp::solution::{Route, Solution};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// A solution whose single route starts at a depot numbered after `cost`, so a stored
/// solution can be matched against the cost it was published with.
fn tagged_solution(cost: Cost) -> Solution {
    Solution::from_routes(vec![Route::new(cost as usize)])
}

fn tag_of(solution: &Solution) -> Cost {
    solution.routes[0].stops[0].entry() as Cost
}

fn create_test_problem() -> Problem {
    Problem::new(
        "ring",
        6,
        1,
        8,
        vec![
            Service::edge(1, 2, 3, 2, 5),
            Service::edge(2, 3, 4, 3, 6),
            Service::arc(3, 4, 2, 4, 3),
            Service::node(5, 2, 2),
            Service::edge(5, 6, 6, 5, 7),
            Service::node(4, 1, 1),
        ],
        vec![
            Link::edge(4, 5, 3),
            Link::edge(6, 1, 2),
            Link::arc(4, 3, 7),
        ],
    )
    .unwrap()
}

#[test]
fn test_global_best_accepts_only_strict_improvements() {
    let best = GlobalBest::new();
    assert_eq!(best.cost(), Cost::MAX);
    assert!(best.snapshot().is_none());

    assert!(best.try_publish(&tagged_solution(50), 50));
    assert!(!best.try_publish(&tagged_solution(50), 50));
    assert!(!best.try_publish(&tagged_solution(70), 70));
    assert!(best.try_publish(&tagged_solution(30), 30));

    let (solution, cost) = best.snapshot().unwrap();
    assert_eq!(cost, 30);
    assert_eq!(tag_of(&solution), 30);
}

#[test]
fn test_global_best_under_concurrent_publishers() {
    let best = GlobalBest::new();
    let publishers = 8;
    let offers_per_thread = 500;
    let done = AtomicBool::new(false);

    let offered_minimum = thread::scope(|scope| {
        let monitor = scope.spawn(|| {
            let mut last = best.cost();
            while !done.load(Ordering::Acquire) {
                let current = best.cost();
                assert!(current <= last, "cost went up from {} to {}", last, current);
                if let Some((solution, cost)) = best.snapshot() {
                    assert_eq!(tag_of(&solution), cost);
                }
                last = current;
            }
        });

        let handles: Vec<_> = (0..publishers)
            .map(|worker| {
                let best = &best;
                scope.spawn(move || {
                    let mut rng = ChaCha8Rng::seed_from_u64(worker as u64);
                    let mut minimum = Cost::MAX;
                    for _ in 0..offers_per_thread {
                        let cost = rng.gen_range(1..100_000);
                        minimum = minimum.min(cost);
                        best.try_publish(&tagged_solution(cost), cost);
                    }
                    minimum
                })
            })
            .collect();

        let minimum = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .min()
            .unwrap();
        done.store(true, Ordering::Release);
        monitor.join().unwrap();
        minimum
    });

    let (solution, cost) = best.into_inner().unwrap();
    assert_eq!(cost, offered_minimum);
    assert_eq!(tag_of(&solution), offered_minimum);
}

#[test]
fn test_worker_publishes_valid_best() {
    let problem = create_test_problem();
    let best = GlobalBest::new();
    let config = Config::new().with_seed(11);

    let report = GraspWorker::new(0, &problem, &best, &config, 12).run();

    assert_eq!(report.worker, 0);
    assert!(report.iterations >= 1 && report.iterations <= 12);
    assert!(!report.improvements.is_empty());
    assert!(report.improvements.windows(2).all(|pair| pair[1] < pair[0]));

    let local = report.best.unwrap();
    local.validate(&problem).unwrap();
    assert_eq!(local.total_cost(&problem), report.best_cost);
    assert_eq!(best.cost(), report.best_cost);
    assert!(report.final_alpha > 0.0 && report.final_alpha <= 0.8);
}

#[test]
fn test_worker_stops_on_stagnation() {
    let problem = create_test_problem();
    let best = GlobalBest::new();
    let config = Config::new()
        .with_seed(5)
        .with_max_iterations_without_improvement(3);

    let report = GraspWorker::new(1, &problem, &best, &config, 100).run();

    // The objective only counts service costs, so no iteration after the first can improve
    assert_eq!(report.iterations, 4);
    assert_eq!(report.improvements.len(), 1);
}

#[test]
fn test_worker_without_local_search_still_covers_services() {
    let problem = create_test_problem();
    let best = GlobalBest::new();
    let config = Config::new()
        .with_seed(8)
        .with_initial_alpha(0.0)
        .with_max_local_search_passes(0);

    let worker = GraspWorker::new(3, &problem, &best, &config, 3);
    assert_eq!(worker.alpha(), 0.0);
    let report = worker.run();

    assert_eq!(report.moves.two_opt + report.moves.or_opt + report.moves.inter_or_opt, 0);
    report.best.unwrap().validate(&problem).unwrap();
}

#[test]
fn test_worker_with_zero_budget_reports_nothing() {
    let problem = create_test_problem();
    let best = GlobalBest::new();
    let config = Config::new().with_seed(2);

    let report = GraspWorker::new(2, &problem, &best, &config, 0).run();

    assert_eq!(report.iterations, 0);
    assert!(report.best.is_none());
    assert_eq!(report.best_cost, Cost::MAX);
    assert!(best.snapshot().is_none());
}

#[test]
fn test_alpha_adapts_to_global_gap() {
    let problem = create_test_problem();
    let config = Config::new().with_seed(3);

    // Nothing published yet: the gap is zero, so the worker diversifies
    let empty = GlobalBest::new();
    let mut worker = GraspWorker::new(0, &problem, &empty, &config, 1);
    worker.adapt_to_global(Cost::MAX);
    assert!((worker.alpha() - 0.45).abs() < 1e-9);

    let best = GlobalBest::new();
    assert!(best.try_publish(&tagged_solution(100), 100));

    let mut far = GraspWorker::new(1, &problem, &best, &config, 1);
    far.adapt_to_global(200);
    assert!((far.alpha() - 0.3 * 0.7).abs() < 1e-9);

    let mut close = GraspWorker::new(2, &problem, &best, &config, 1);
    close.adapt_to_global(102);
    assert!((close.alpha() - 0.45).abs() < 1e-9);

    // A 10% gap is neither converged nor distant
    let mut between = GraspWorker::new(3, &problem, &best, &config, 1);
    between.adapt_to_global(110);
    assert!((between.alpha() - 0.3).abs() < 1e-9);

    // Repeated diversification is capped
    for _ in 0..10 {
        close.adapt_to_global(100);
    }
    assert!((close.alpha() - 0.8).abs() < 1e-9);
}
