//! Initial route construction: a deterministic greedy insertion and a randomized RCL fill.

use crate::problem::{Cost, Problem, Service};
use crate::solution::{Route, Solution, Stop};
use itertools::Itertools;
use log::warn;
use rand::Rng;
use std::iter;

/// Upper bound on the restricted candidate list.
pub const MAX_RCL_SIZE: usize = 10;

/// Builders for initial solutions.
pub struct Construction;

impl Construction {
    /// Insert services by ascending efficiency score, each at its cheapest feasible position.
    ///
    /// The score is `cost / max(1, demand)` scaled by how far the service lies from the
    /// depot. A new route is opened whenever no open route has room for the service.
    pub fn greedy(problem: &Problem) -> Solution {
        let depot = problem.depot;
        let from_depot = problem.distances().row_for(depot);

        let order = problem
            .services()
            .iter()
            .map(|service| {
                let spread = (from_depot[service.origin] + from_depot[service.destination]) as f64;
                (efficiency(service) * (1.0 + spread / 200.0), service)
            })
            .sorted_by(|a, b| a.0.total_cmp(&b.0));

        let mut routes: Vec<Route> = Vec::new();
        let capacity = u64::from(problem.capacity);
        let mut loads: Vec<u64> = Vec::new();

        for (_, service) in order {
            let mut best: Option<(Cost, usize, usize, Stop)> = None;

            for (r_idx, route) in routes.iter().enumerate() {
                if loads[r_idx] + u64::from(service.demand) > capacity {
                    continue;
                }
                for position in 1..route.len() {
                    for stop in orientations(service) {
                        let delta = insertion_delta(problem, route, position, &stop);
                        if best.map_or(true, |(best_delta, ..)| delta < best_delta) {
                            best = Some((delta, r_idx, position, stop));
                        }
                    }
                }
            }

            match best {
                Some((_, r_idx, position, stop)) => {
                    routes[r_idx].stops.insert(position, stop);
                    loads[r_idx] += u64::from(service.demand);
                }
                None => {
                    let mut route = Route::new(depot);
                    route.push(Stop::serve(service));
                    routes.push(route);
                    loads.push(u64::from(service.demand));
                }
            }
        }

        Solution::from_routes(routes)
    }

    /// Fill routes one at a time by drawing from a restricted candidate list.
    ///
    /// Candidates are the unplaced services that still fit, ranked by `cost / demand`.
    /// The list keeps those within `(1 + alpha)` of the best efficiency, at most
    /// [`MAX_RCL_SIZE`] of them, and one is drawn uniformly.
    pub fn randomized<R: Rng + ?Sized>(problem: &Problem, rng: &mut R, alpha: f64) -> Solution {
        let services = problem.services();
        let mut placed = vec![false; services.len()];
        let mut remaining = services.len();
        let mut routes = Vec::new();
        let mut candidates: Vec<(f64, usize)> = Vec::with_capacity(services.len());

        while remaining > 0 {
            let mut route = Route::new(problem.depot);
            let mut capacity_left = problem.capacity;

            loop {
                candidates.clear();
                candidates.extend(
                    services
                        .iter()
                        .enumerate()
                        .filter(|(index, service)| {
                            !placed[*index] && service.demand <= capacity_left
                        })
                        .map(|(index, service)| (efficiency(service), index)),
                );
                if candidates.is_empty() {
                    break;
                }

                candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
                let threshold = candidates[0].0 * (1.0 + alpha);
                let rcl_size = candidates
                    .iter()
                    .take_while(|(score, _)| *score <= threshold)
                    .count()
                    .clamp(1, MAX_RCL_SIZE);

                let (_, chosen) = candidates[rng.gen_range(0..rcl_size)];
                let service = &services[chosen];
                placed[chosen] = true;
                remaining -= 1;
                capacity_left -= service.demand;
                route.push(Stop::serve(service));
            }

            if route.is_empty() {
                // Problem::new rejects demands above capacity, so this means a corrupt instance.
                warn!("{} services fit in no empty route", remaining);
                break;
            }
            routes.push(route);
        }

        Solution::from_routes(routes)
    }
}

/// Service cost per unit of demand.
pub fn efficiency(service: &Service) -> f64 {
    service.cost as f64 / service.demand.max(1) as f64
}

/// Extra travel caused by inserting `stop` before `route.stops[position]`.
pub fn insertion_delta(problem: &Problem, route: &Route, position: usize, stop: &Stop) -> Cost {
    let pred = route.stops[position - 1].exit();
    let succ = route.stops[position].entry();
    problem.distance(pred, stop.entry()) + problem.distance(stop.exit(), succ)
        - problem.distance(pred, succ)
}

/// The ways a service can be traversed: edges in both directions, everything else as stored.
fn orientations(service: &Service) -> impl Iterator<Item = Stop> {
    iter::once(Stop::serve(service)).chain(
        service
            .is_reversible()
            .then(|| Stop::serve_reversed(service)),
    )
}
