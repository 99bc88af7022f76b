//! 2-Opt neighborhood for local search (intra-route).

use crate::problem::{Cost, Problem};
use crate::solution::{Route, Solution};

use super::LocalSearch;

impl LocalSearch {
    /// Apply 2-opt to every route. Returns whether any route changed.
    pub fn two_opt_neighborhood(&mut self, solution: &mut Solution, problem: &Problem) -> bool {
        let mut improvement = false;

        for route in solution.routes.iter_mut() {
            if self.two_opt_route(route, problem) {
                self.moves.two_opt += 1;
                improvement = true;
            }
        }

        improvement
    }

    /// Reverse the first segment whose estimated relinking saves more than the margin.
    ///
    /// Routes with four stops or fewer are left alone. The first service never moves:
    /// segments start after it, so the opening depot is never a relinking endpoint.
    pub fn two_opt_route(&self, route: &mut Route, problem: &Problem) -> bool {
        let n = route.len();
        if n <= 4 {
            return false;
        }

        for i in 1..n - 3 {
            for j in i + 2..n - 1 {
                if self.evaluate_two_opt(route, problem, i, j) > self.two_opt_margin {
                    route.stops[i + 1..=j].reverse();
                    return true;
                }
            }
        }

        false
    }

    /// Estimated saving of reversing stops `i + 1..=j`, from the four boundary vertices.
    fn evaluate_two_opt(&self, route: &Route, problem: &Problem, i: usize, j: usize) -> Cost {
        let stops = &route.stops;
        let u1 = stops[i].exit();
        let v1 = stops[i + 1].entry();
        let u2 = stops[j].exit();
        let v2 = stops[j + 1].entry();

        let current = problem.distance(u1, v1) + problem.distance(u2, v2);
        let candidate = problem.distance(u1, u2) + problem.distance(v1, v2);

        current - candidate
    }
}
