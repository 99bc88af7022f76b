//! Local search operators for the GRASP solver.
//!
//! Three neighborhoods are applied in a fixed order by [`LocalSearch::combined_pass`]:
//! 2-opt and intra-route Or-opt on every route, then one inter-route relocation.
//! [`LocalSearch::improve`] repeats the pass while it keeps paying off.

pub mod inter_or_opt;
pub mod or_opt;
pub mod two_opt;

use crate::config::Config;
use crate::problem::{Cost, Problem};
use crate::solution::Solution;
use log::trace;

/// Counts of applied moves, per neighborhood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveCounts {
    pub two_opt: u64,
    pub or_opt: u64,
    pub inter_or_opt: u64,
}

/// Manages the improvement phase of one worker.
#[derive(Debug, Clone)]
pub struct LocalSearch {
    /// Upper bound on combined passes per call to `improve`
    pub max_passes: u32,
    /// Smallest worthwhile pass gain, relative to the pre-pass cost
    pub min_relative_gain: f64,
    /// Estimated saving a 2-opt reversal must exceed
    pub two_opt_margin: Cost,
    pub moves: MoveCounts,
}

impl LocalSearch {
    /// Create a new local search instance.
    pub fn new(max_passes: u32, min_relative_gain: f64, two_opt_margin: Cost) -> Self {
        LocalSearch {
            max_passes,
            min_relative_gain,
            two_opt_margin,
            moves: MoveCounts::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        LocalSearch::new(
            config.max_local_search_passes,
            config.min_relative_gain,
            config.two_opt_margin,
        )
    }

    /// Run combined passes until one changes nothing, the pass budget is spent, or a pass
    /// gains less than `min_relative_gain` of the cost it started from.
    ///
    /// Returns the number of passes run.
    pub fn improve(&mut self, solution: &mut Solution, problem: &Problem) -> u32 {
        let mut passes = 0;

        while passes < self.max_passes {
            passes += 1;
            let before = solution.total_cost(problem);
            if !self.combined_pass(solution, problem) {
                break;
            }

            let after = solution.total_cost(problem);
            let gain = (before - after) as f64;
            trace!("local search pass {}: {} -> {}", passes, before, after);
            if gain < before as f64 * self.min_relative_gain {
                break;
            }
        }

        passes
    }

    /// 2-opt on every route, Or-opt on every route, then one inter-route relocation.
    ///
    /// Returns whether anything changed.
    pub fn combined_pass(&mut self, solution: &mut Solution, problem: &Problem) -> bool {
        let mut improvement = false;

        improvement |= self.two_opt_neighborhood(solution, problem);
        improvement |= self.or_opt_neighborhood(solution, problem);
        improvement |= self.inter_or_opt_neighborhood(solution, problem);

        improvement
    }
}

impl Default for LocalSearch {
    fn default() -> Self {
        LocalSearch::from_config(&Config::default())
    }
}
