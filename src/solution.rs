//! Solution representation for the CARP.

use crate::error::{CarpError, Result};
use crate::problem::{Cost, Problem, Service};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One position of a route: the depot, or a service traversed from `entry` to `exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stop {
    Depot { vertex: usize },
    Service { id: usize, entry: usize, exit: usize },
}

impl Stop {
    /// Serve `service` in its stored direction.
    pub fn serve(service: &Service) -> Self {
        Stop::Service {
            id: service.id,
            entry: service.origin,
            exit: service.destination,
        }
    }

    /// Serve `service` from its destination to its origin.
    pub fn serve_reversed(service: &Service) -> Self {
        Stop::Service {
            id: service.id,
            entry: service.destination,
            exit: service.origin,
        }
    }

    /// Vertex where the vehicle arrives for this stop.
    pub fn entry(&self) -> usize {
        match *self {
            Stop::Depot { vertex } => vertex,
            Stop::Service { entry, .. } => entry,
        }
    }

    /// Vertex the vehicle leaves from after this stop.
    pub fn exit(&self) -> usize {
        match *self {
            Stop::Depot { vertex } => vertex,
            Stop::Service { exit, .. } => exit,
        }
    }

    pub fn service_id(&self) -> Option<usize> {
        match *self {
            Stop::Depot { .. } => None,
            Stop::Service { id, .. } => Some(id),
        }
    }

    pub fn is_depot(&self) -> bool {
        matches!(self, Stop::Depot { .. })
    }
}

/// A vehicle route.
///
/// `stops` always starts and ends with a depot stop; everything in between is a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub stops: Vec<Stop>,
}

impl Route {
    /// Create a route that leaves the depot and returns immediately.
    pub fn new(depot: usize) -> Self {
        Route {
            stops: vec![Stop::Depot { vertex: depot }, Stop::Depot { vertex: depot }],
        }
    }

    /// Create a route serving `services` in order, each in its stored direction.
    pub fn with_services<'a, I>(depot: usize, services: I) -> Self
    where
        I: IntoIterator<Item = &'a Service>,
    {
        let mut route = Route::new(depot);
        for service in services {
            route.push(Stop::serve(service));
        }
        route
    }

    /// Append a stop just before the closing depot.
    pub fn push(&mut self, stop: Stop) {
        let closing = self.stops.len() - 1;
        self.stops.insert(closing, stop);
    }

    /// Total number of stops, depots included.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// True when the route serves nothing.
    pub fn is_empty(&self) -> bool {
        self.service_count() == 0
    }

    pub fn service_count(&self) -> usize {
        self.stops.len().saturating_sub(2)
    }

    pub fn service_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.stops.iter().filter_map(Stop::service_id)
    }

    /// Sum of the demands served by this route, widened so it cannot overflow.
    pub fn load(&self, problem: &Problem) -> u64 {
        self.service_ids()
            .map(|id| u64::from(problem.demand_of(id)))
            .sum()
    }

    /// Sum of the service costs of this route. Deadheading is not billed.
    pub fn cost(&self, problem: &Problem) -> Cost {
        self.service_ids().map(|id| problem.cost_of(id)).sum()
    }

    /// Shortest-path travel between consecutive stops.
    pub fn deadhead_cost(&self, problem: &Problem) -> Cost {
        self.stops
            .windows(2)
            .map(|pair| problem.distance(pair[0].exit(), pair[1].entry()))
            .sum()
    }
}

/// A set of routes covering the instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub routes: Vec<Route>,
}

impl Solution {
    pub fn new() -> Self {
        Solution { routes: Vec::new() }
    }

    pub fn from_routes(routes: Vec<Route>) -> Self {
        Solution { routes }
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn total_cost(&self, problem: &Problem) -> Cost {
        self.routes.iter().map(|route| route.cost(problem)).sum()
    }

    pub fn deadhead_cost(&self, problem: &Problem) -> Cost {
        self.routes
            .iter()
            .map(|route| route.deadhead_cost(problem))
            .sum()
    }

    /// Check coverage, framing and capacity against `problem`.
    pub fn validate(&self, problem: &Problem) -> Result<()> {
        let mut seen = vec![false; problem.service_count() + 1];

        for (index, route) in self.routes.iter().enumerate() {
            let framed = route.stops.len() >= 2
                && route.stops.first().map_or(false, Stop::is_depot)
                && route.stops.last().map_or(false, Stop::is_depot);
            if !framed {
                return Err(CarpError::InvalidSolution(format!(
                    "route {} does not start and end at the depot",
                    index + 1
                )));
            }

            let inner = &route.stops[1..route.stops.len() - 1];
            for stop in inner {
                let id = stop.service_id().ok_or_else(|| {
                    CarpError::InvalidSolution(format!(
                        "route {} visits the depot mid-route",
                        index + 1
                    ))
                })?;
                if problem.service(id).is_none() {
                    return Err(CarpError::InvalidSolution(format!(
                        "route {} serves unknown service {}",
                        index + 1,
                        id
                    )));
                }
                if seen[id] {
                    return Err(CarpError::InvalidSolution(format!(
                        "service {} is served more than once",
                        id
                    )));
                }
                seen[id] = true;
            }

            let load = route.load(problem);
            if load > u64::from(problem.capacity) {
                return Err(CarpError::InvalidSolution(format!(
                    "route {} carries {} over capacity {}",
                    index + 1,
                    load,
                    problem.capacity
                )));
            }
        }

        if let Some(missing) = (1..seen.len()).find(|&id| !seen[id]) {
            return Err(CarpError::InvalidSolution(format!(
                "service {} is not served",
                missing
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, stop) in self.stops.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            match *stop {
                Stop::Depot { vertex } => write!(f, "(D {},1,1)", vertex)?,
                Stop::Service { id, entry, exit } => write!(f, "(S {},{},{})", id, entry, exit)?,
            }
        }
        Ok(())
    }
}
