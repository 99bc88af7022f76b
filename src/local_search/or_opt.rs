//! Or-opt neighborhood for local search (intra-route segment relocation).

use crate::problem::{Cost, Problem};
use crate::solution::{Route, Solution, Stop};
use itertools::Itertools;

use super::LocalSearch;

/// Longest segment moved as a block.
const MAX_SEGMENT_LEN: usize = 2;

impl LocalSearch {
    /// Apply Or-opt to every route. Returns whether any route changed.
    pub fn or_opt_neighborhood(&mut self, solution: &mut Solution, problem: &Problem) -> bool {
        let mut improvement = false;

        for route in solution.routes.iter_mut() {
            if self.or_opt_route(route, problem) {
                self.moves.or_opt += 1;
                improvement = true;
            }
        }

        improvement
    }

    /// Move the first segment of one or two services that has a strictly better position.
    ///
    /// Positions are tried nearest-first around the segment's original index; if none
    /// gains anything the segment is put back where it was.
    pub fn or_opt_route(&self, route: &mut Route, problem: &Problem) -> bool {
        let n = route.len();
        if n <= 4 {
            return false;
        }

        for segment_len in 1..=MAX_SEGMENT_LEN.min(n - 3) {
            for start in 1..n - segment_len {
                let end = start + segment_len;
                let gain = removal_gain(problem, &route.stops, start, end);
                let first = route.stops[start].entry();
                let last = route.stops[end - 1].exit();

                let segment: Vec<Stop> = route.stops.drain(start..end).collect();

                let target = (1..route.stops.len())
                    .filter(|&position| position != start)
                    .sorted_by_key(|&position| (position.abs_diff(start), position))
                    .find(|&position| {
                        gain - insertion_cost(problem, &route.stops, position, first, last) > 0
                    });

                match target {
                    Some(position) => {
                        route.stops.splice(position..position, segment);
                        return true;
                    }
                    None => {
                        route.stops.splice(start..start, segment);
                    }
                }
            }
        }

        false
    }
}

/// Travel saved by cutting `stops[start..end]` out and linking its neighbours directly.
fn removal_gain(problem: &Problem, stops: &[Stop], start: usize, end: usize) -> Cost {
    let prev = stops[start - 1].exit();
    let next = stops[end].entry();
    problem.distance(prev, stops[start].entry()) + problem.distance(stops[end - 1].exit(), next)
        - problem.distance(prev, next)
}

/// Travel added by splicing a segment entered at `first` and left at `last` before `stops[position]`.
fn insertion_cost(
    problem: &Problem,
    stops: &[Stop],
    position: usize,
    first: usize,
    last: usize,
) -> Cost {
    let prev = stops[position - 1].exit();
    let next = stops[position].entry();
    problem.distance(prev, first) + problem.distance(last, next) - problem.distance(prev, next)
}
