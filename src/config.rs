//! Configuration parameters for the GRASP solver.

use crate::problem::Cost;
use serde::{Deserialize, Serialize};

/// Configuration settings for the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on worker threads; the hardware parallelism bounds it further
    pub max_workers: usize,
    /// Iteration budget of the first half of the workers
    pub long_run_iterations: u32,
    /// Iteration budget of the second half of the workers
    pub short_run_iterations: u32,
    /// Consecutive non-improving iterations after which a worker stops
    pub max_iterations_without_improvement: u32,
    /// Every n-th iteration builds the deterministic greedy solution
    pub greedy_every: u32,
    /// Starting width of the restricted candidate list
    pub initial_alpha: f64,
    /// Maximum number of local search passes per iteration
    pub max_local_search_passes: u32,
    /// A pass gaining less than this share of the pre-pass cost ends the local search
    pub min_relative_gain: f64,
    /// Minimum estimated saving for a 2-opt reversal
    pub two_opt_margin: Cost,
    /// Seed for the worker random streams; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_workers: 6,
            long_run_iterations: 40,
            short_run_iterations: 20,
            max_iterations_without_improvement: 15,
            greedy_every: 5,
            initial_alpha: 0.3,
            max_local_search_passes: 5,
            min_relative_gain: 0.01,
            two_opt_margin: 5,
            seed: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the maximum number of worker threads.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    /// Set the iteration budgets of the long- and short-running workers.
    pub fn with_iterations(mut self, long_run: u32, short_run: u32) -> Self {
        self.long_run_iterations = long_run;
        self.short_run_iterations = short_run;
        self
    }

    /// Set the maximum iterations without improvement.
    pub fn with_max_iterations_without_improvement(mut self, iterations: u32) -> Self {
        self.max_iterations_without_improvement = iterations;
        self
    }

    /// Set the initial RCL alpha.
    pub fn with_initial_alpha(mut self, alpha: f64) -> Self {
        self.initial_alpha = alpha;
        self
    }

    /// Set the local search pass budget.
    pub fn with_max_local_search_passes(mut self, passes: u32) -> Self {
        self.max_local_search_passes = passes;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
