//! Inter-route Or-opt: moves one service to the least loaded route that can take it.
//!
//! Targets are chosen by load alone, not by travel delta. The move balances loads
//! across vehicles rather than shortening any route.

use crate::problem::Problem;
use crate::solution::Solution;
use log::trace;

use super::LocalSearch;

impl LocalSearch {
    /// Relocate the first movable service. Returns whether a service was moved.
    ///
    /// Services are scanned route by route in order. For each, the other route with the
    /// lowest load that stays within capacity receives it right after its opening depot.
    /// A route emptied by the move is dropped.
    pub fn inter_or_opt_neighborhood(&mut self, solution: &mut Solution, problem: &Problem) -> bool {
        let capacity = u64::from(problem.capacity);
        let loads: Vec<u64> = solution
            .routes
            .iter()
            .map(|route| route.load(problem))
            .collect();

        for r1_idx in 0..solution.routes.len() {
            let route = &solution.routes[r1_idx];
            if route.is_empty() {
                continue;
            }

            for position in 1..route.len() - 1 {
                let Some(id) = route.stops[position].service_id() else {
                    continue;
                };
                let demand = u64::from(problem.demand_of(id));

                let target = (0..loads.len())
                    .filter(|&r2_idx| r2_idx != r1_idx && loads[r2_idx] + demand <= capacity)
                    .min_by_key(|&r2_idx| loads[r2_idx]);

                if let Some(r2_idx) = target {
                    let stop = solution.routes[r1_idx].stops.remove(position);
                    solution.routes[r2_idx].stops.insert(1, stop);
                    trace!(
                        "moved service {} from route {} to route {}",
                        id,
                        r1_idx,
                        r2_idx
                    );

                    if solution.routes[r1_idx].is_empty() {
                        solution.routes.remove(r1_idx);
                    }

                    self.moves.inter_or_opt += 1;
                    return true;
                }
            }
        }

        false
    }
}
