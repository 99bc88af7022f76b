//! Tests for the greedy and randomized route constructors.

use carp_grasp::construction::{efficiency, insertion_delta, Construction, MAX_RCL_SIZE};
use carp_grasp::problem::{Link, Problem, Service};
use carp_grasp::solution::{Route, Solution, Stop};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A 3x3 grid (vertices 1..=9, row-major, depot 5 in the middle) with unit-10 streets.
///
/// Every street is a required edge, plus two required nodes and one required arc.
fn create_grid_problem(capacity: u32) -> Problem {
    let mut services = Vec::new();
    for row in 0..3 {
        for col in 0..3 {
            let v = row * 3 + col + 1;
            if col < 2 {
                services.push(Service::edge(v, v + 1, 10, 1 + (v as u32 % 3), 10));
            }
            if row < 2 {
                services.push(Service::edge(v, v + 3, 10, 1 + (v as u32 % 2), 12));
            }
        }
    }
    services.push(Service::node(1, 2, 3));
    services.push(Service::node(9, 3, 4));
    services.push(Service::arc(9, 1, 25, 2, 25));

    Problem::new("grid", 9, 5, capacity, services, Vec::new()).unwrap()
}

#[test]
fn test_greedy_splits_services_that_do_not_fit_together() {
    // Capacity 10, two required edges of demand 6 and 5, nothing optional
    let problem = Problem::new(
        "two-edges",
        3,
        1,
        10,
        vec![Service::edge(1, 2, 4, 6, 4), Service::edge(2, 3, 7, 5, 7)],
        Vec::new(),
    )
    .unwrap();

    let solution = Construction::greedy(&problem);

    assert_eq!(solution.route_count(), 2);
    assert_eq!(solution.total_cost(&problem), 4 + 7);
    solution.validate(&problem).unwrap();
    for route in &solution.routes {
        assert_eq!(route.service_count(), 1);
    }
}

#[test]
fn test_greedy_covers_grid() {
    let problem = create_grid_problem(12);
    let solution = Construction::greedy(&problem);

    solution.validate(&problem).unwrap();
    let expected: i64 = problem.services().iter().map(|s| s.cost).sum();
    assert_eq!(solution.total_cost(&problem), expected);
}

#[test]
fn test_greedy_is_deterministic() {
    let problem = create_grid_problem(12);

    assert_eq!(Construction::greedy(&problem), Construction::greedy(&problem));
}

#[test]
fn test_greedy_reverses_edges_when_cheaper() {
    // Triangle around depot 1 with edge 3-2 stored "backwards": serving it 2 -> 3
    // continues from where the first edge ends and closes the loop through 3-1
    let problem = Problem::new(
        "reverse",
        3,
        1,
        10,
        vec![Service::edge(1, 2, 1, 1, 1), Service::edge(3, 2, 1, 1, 1)],
        vec![Link::edge(3, 1, 1)],
    )
    .unwrap();

    let solution = Construction::greedy(&problem);
    solution.validate(&problem).unwrap();
    assert_eq!(solution.route_count(), 1);

    let route = &solution.routes[0];
    let second = route
        .stops
        .iter()
        .find(|stop| stop.service_id() == Some(2))
        .unwrap();
    assert_eq!((second.entry(), second.exit()), (2, 3));
}

#[test]
fn test_randomized_respects_capacity_and_coverage() {
    let problem = create_grid_problem(9);

    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for &alpha in &[0.0, 0.1, 0.3, 0.8] {
            let solution = Construction::randomized(&problem, &mut rng, alpha);
            solution.validate(&problem).unwrap();
            for route in &solution.routes {
                assert!(route.load(&problem) <= u64::from(problem.capacity));
                assert!(!route.is_empty());
            }
        }
    }
}

#[test]
fn test_randomized_with_zero_alpha_takes_most_efficient_first() {
    // Three nodes with efficiencies 1.0, 0.5 and 2.0; alpha 0 leaves a single candidate
    let problem = Problem::new(
        "rcl",
        4,
        1,
        100,
        vec![
            Service::node(2, 2, 2),
            Service::node(3, 2, 1),
            Service::node(4, 1, 2),
        ],
        vec![Link::edge(1, 2, 1), Link::edge(1, 3, 1), Link::edge(1, 4, 1)],
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let solution = Construction::randomized(&problem, &mut rng, 0.0);

    assert_eq!(solution.route_count(), 1);
    let order: Vec<usize> = solution.routes[0].service_ids().collect();
    assert_eq!(order, vec![2, 1, 3]);
}

#[test]
fn test_zero_demand_services_fit_a_zero_capacity_vehicle() {
    let problem = Problem::new(
        "empty-truck",
        3,
        1,
        0,
        vec![Service::node(2, 0, 1), Service::node(3, 0, 1)],
        vec![Link::edge(1, 2, 1), Link::edge(2, 3, 1)],
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let randomized = Construction::randomized(&problem, &mut rng, 0.3);
    let greedy = Construction::greedy(&problem);

    randomized.validate(&problem).unwrap();
    greedy.validate(&problem).unwrap();
    assert_eq!(randomized.route_count(), 1);
    assert_eq!(greedy.route_count(), 1);
}

#[test]
fn test_loads_near_u32_limit_do_not_overflow() {
    let problem = Problem::new(
        "huge-demands",
        3,
        1,
        u32::MAX,
        vec![
            Service::node(2, 3_000_000_000, 1),
            Service::node(3, 3_000_000_000, 1),
        ],
        vec![Link::edge(1, 2, 1), Link::edge(2, 3, 1)],
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let greedy = Construction::greedy(&problem);
    let randomized = Construction::randomized(&problem, &mut rng, 0.3);

    for solution in [&greedy, &randomized] {
        solution.validate(&problem).unwrap();
        assert_eq!(solution.route_count(), 2);
        for route in &solution.routes {
            assert_eq!(route.load(&problem), 3_000_000_000);
        }
    }
}

#[test]
fn test_empty_instance_has_no_routes() {
    let problem = Problem::new("nothing", 2, 1, 5, Vec::new(), Vec::new()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    assert_eq!(Construction::greedy(&problem).route_count(), 0);
    assert_eq!(Construction::randomized(&problem, &mut rng, 0.3).route_count(), 0);
    assert_eq!(Construction::greedy(&problem), Solution::new());
    Solution::new().validate(&problem).unwrap();
}

#[test]
fn test_efficiency_and_insertion_delta() {
    let problem = create_grid_problem(12);
    let service = problem.service(1).unwrap();

    assert_eq!(efficiency(&Service::node(1, 0, 6)), 6.0);
    assert_eq!(efficiency(&Service::node(1, 4, 6)), 1.5);

    // Edge 1-2 inserted into the empty route at depot 5: 5 -> 1 -> (1,2) -> 2 -> 5
    let route = Route::new(problem.depot);
    let delta = insertion_delta(&problem, &route, 1, &Stop::serve(service));
    assert_eq!(delta, 20 + 10);

    assert_eq!(MAX_RCL_SIZE, 10);
}
