//! The per-worker GRASP loop: construct, improve, evaluate, publish.

use crate::config::Config;
use crate::construction::Construction;
use crate::global_best::GlobalBest;
use crate::local_search::{LocalSearch, MoveCounts};
use crate::problem::{Cost, Problem};
use crate::solution::Solution;
use log::{debug, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Gap to the global best, relative to the local best, under which a worker diversifies.
const CONVERGED_GAP: f64 = 0.05;
/// Gap above which a worker intensifies.
const DISTANT_GAP: f64 = 0.2;
/// Every this many consecutive failures alpha is widened a little.
const STAGNATION_PERIOD: u32 = 5;

/// What a worker hands back to the aggregator when its loop ends.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker: usize,
    pub iterations: u32,
    /// Best solution this worker built, `None` if it ran no iteration
    pub best: Option<Solution>,
    pub best_cost: Cost,
    /// Every accepted local-best cost, in acceptance order
    pub improvements: Vec<Cost>,
    pub final_alpha: f64,
    pub moves: MoveCounts,
}

/// One GRASP worker. Owns its random stream and route state; shares only the problem
/// and the global best record.
pub struct GraspWorker<'a> {
    id: usize,
    problem: &'a Problem,
    global_best: &'a GlobalBest,
    config: &'a Config,
    max_iterations: u32,
    local_search: LocalSearch,
    rng: ChaCha8Rng,
    alpha: f64,
}

impl<'a> GraspWorker<'a> {
    pub fn new(
        id: usize,
        problem: &'a Problem,
        global_best: &'a GlobalBest,
        config: &'a Config,
        max_iterations: u32,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(1000 * id as u64)),
            None => ChaCha8Rng::from_entropy(),
        };

        GraspWorker {
            id,
            problem,
            global_best,
            config,
            max_iterations,
            local_search: LocalSearch::from_config(config),
            rng,
            alpha: config.initial_alpha,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Iterate until the iteration budget or the stagnation limit is reached.
    pub fn run(mut self) -> WorkerReport {
        let mut best: Option<Solution> = None;
        let mut best_cost = Cost::MAX;
        let mut improvements = Vec::new();
        let mut iterations = 0;
        let mut without_improvement = 0;

        debug!(
            "worker {} starting: {} iterations, alpha {:.3}",
            self.id, self.max_iterations, self.alpha
        );

        while iterations < self.max_iterations
            && without_improvement < self.config.max_iterations_without_improvement
        {
            self.adapt_to_global(best_cost);

            let mut solution = self.construct(iterations);
            self.local_search.improve(&mut solution, self.problem);
            let cost = solution.total_cost(self.problem);
            iterations += 1;

            if cost < best_cost {
                trace!("worker {} iteration {}: new local best {}", self.id, iterations, cost);
                best_cost = cost;
                improvements.push(cost);
                without_improvement = 0;
                self.alpha = (self.alpha * 0.95).max(0.1);
                self.global_best.try_publish(&solution, cost);
                best = Some(solution);
            } else {
                without_improvement += 1;
                if without_improvement % STAGNATION_PERIOD == 0 {
                    self.alpha = (self.alpha * 1.1).min(0.5);
                }
            }
        }

        debug!(
            "worker {} finished after {} iterations: best {}, alpha {:.3}",
            self.id, iterations, best_cost, self.alpha
        );

        WorkerReport {
            worker: self.id,
            iterations,
            best,
            best_cost,
            improvements,
            final_alpha: self.alpha,
            moves: self.local_search.moves,
        }
    }

    /// Widen the candidate list when close to the global best, narrow it when far behind.
    pub fn adapt_to_global(&mut self, local_best: Cost) {
        let global_best = self.global_best.cost();
        let gap = local_best.saturating_sub(global_best) as f64;
        let local_best = local_best as f64;

        if gap < local_best * CONVERGED_GAP {
            self.alpha = (self.alpha * 1.5).min(0.8);
        } else if gap > local_best * DISTANT_GAP {
            self.alpha = (self.alpha * 0.7).max(0.05);
        }
    }

    fn construct(&mut self, iteration: u32) -> Solution {
        let greedy_turn =
            self.config.greedy_every > 0 && iteration % self.config.greedy_every == 0;
        if greedy_turn {
            Construction::greedy(self.problem)
        } else {
            Construction::randomized(self.problem, &mut self.rng, self.alpha)
        }
    }
}
