//! Problem definition and data structures for the CARP.

use crate::distance::DistanceOracle;
use crate::error::{CarpError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Travel and service costs.
pub type Cost = i64;

/// Service demand and vehicle capacity.
pub type Demand = u32;

/// Distance reported for unreachable vertices. Four of them still sum without overflow.
pub const INFINITE_DISTANCE: Cost = Cost::MAX / 4;

/// The three kinds of required elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    Node,
    Edge,
    Arc,
}

/// A required element that some vehicle has to serve exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Assigned by [`Problem::new`], sequentially from 1.
    pub id: usize,
    pub kind: ServiceKind,
    pub origin: usize,
    pub destination: usize,
    /// Cost of traversing the element, used for the graph. Zero for nodes.
    pub traversal_cost: Cost,
    /// Cost billed for serving the element.
    pub cost: Cost,
    pub demand: Demand,
}

impl Service {
    /// A required node at `vertex`.
    pub fn node(vertex: usize, demand: Demand, cost: Cost) -> Self {
        Service {
            id: 0,
            kind: ServiceKind::Node,
            origin: vertex,
            destination: vertex,
            traversal_cost: 0,
            cost,
            demand,
        }
    }

    /// A required undirected edge.
    pub fn edge(from: usize, to: usize, traversal_cost: Cost, demand: Demand, cost: Cost) -> Self {
        Service {
            id: 0,
            kind: ServiceKind::Edge,
            origin: from,
            destination: to,
            traversal_cost,
            cost,
            demand,
        }
    }

    /// A required directed arc.
    pub fn arc(from: usize, to: usize, traversal_cost: Cost, demand: Demand, cost: Cost) -> Self {
        Service {
            kind: ServiceKind::Arc,
            ..Service::edge(from, to, traversal_cost, demand, cost)
        }
    }

    /// Whether the element may be served from `destination` to `origin`.
    pub fn is_reversible(&self) -> bool {
        self.kind == ServiceKind::Edge
    }
}

/// A non-required connection of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub from: usize,
    pub to: usize,
    pub cost: Cost,
    pub directed: bool,
}

impl Link {
    pub fn edge(from: usize, to: usize, cost: Cost) -> Self {
        Link {
            from,
            to,
            cost,
            directed: false,
        }
    }

    pub fn arc(from: usize, to: usize, cost: Cost) -> Self {
        Link {
            from,
            to,
            cost,
            directed: true,
        }
    }
}

/// A loaded CARP instance. Immutable once built; shared by reference between workers.
#[derive(Debug)]
pub struct Problem {
    pub name: String,
    pub vertex_count: usize,
    pub depot: usize,
    pub capacity: Demand,
    services: Vec<Service>,
    distances: DistanceOracle,
}

impl Problem {
    /// Create a problem from its services and the optional links of the graph.
    ///
    /// Required edges and arcs are added to the graph automatically. Services get ids
    /// `1..=services.len()` in the given order.
    pub fn new(
        name: impl Into<String>,
        vertex_count: usize,
        depot: usize,
        capacity: Demand,
        services: Vec<Service>,
        links: Vec<Link>,
    ) -> Result<Self> {
        let check_vertex = |vertex: usize| -> Result<()> {
            if vertex == 0 || vertex > vertex_count {
                return Err(CarpError::malformed(
                    0,
                    format!("vertex {} outside 1..={}", vertex, vertex_count),
                ));
            }
            Ok(())
        };

        if depot == 0 || depot > vertex_count {
            return Err(CarpError::InvalidDepot {
                depot,
                vertices: vertex_count,
            });
        }

        let mut services = services;
        let mut graph_links = links;
        for (index, service) in services.iter_mut().enumerate() {
            service.id = index + 1;
            check_vertex(service.origin)?;
            check_vertex(service.destination)?;

            if service.demand > capacity {
                return Err(CarpError::InfeasibleService {
                    service: service.id,
                    demand: service.demand,
                    capacity,
                });
            }

            match service.kind {
                ServiceKind::Node => {}
                ServiceKind::Edge => graph_links.push(Link::edge(
                    service.origin,
                    service.destination,
                    service.traversal_cost,
                )),
                ServiceKind::Arc => graph_links.push(Link::arc(
                    service.origin,
                    service.destination,
                    service.traversal_cost,
                )),
            }
        }

        for link in &graph_links {
            check_vertex(link.from)?;
            check_vertex(link.to)?;
        }

        let name = name.into();
        debug!(
            "instance {}: {} vertices, {} services, {} links, capacity {}",
            name,
            vertex_count,
            services.len(),
            graph_links.len(),
            capacity
        );

        Ok(Problem {
            name,
            vertex_count,
            depot,
            capacity,
            services,
            distances: DistanceOracle::new(vertex_count, &graph_links),
        })
    }

    /// Load a problem from an instance file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let fallback_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        crate::parser::parse_instance(&fallback_name, &text)
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Look up a service by id.
    pub fn service(&self, id: usize) -> Option<&Service> {
        id.checked_sub(1).and_then(|index| self.services.get(index))
    }

    pub fn demand_of(&self, id: usize) -> Demand {
        self.service(id).map_or(0, |service| service.demand)
    }

    pub fn cost_of(&self, id: usize) -> Cost {
        self.service(id).map_or(0, |service| service.cost)
    }

    /// Shortest-path distance between two vertices.
    pub fn distance(&self, from: usize, to: usize) -> Cost {
        self.distances.distance(from, to)
    }

    pub fn distances(&self) -> &DistanceOracle {
        &self.distances
    }

    pub fn total_demand(&self) -> u64 {
        self.services.iter().map(|s| s.demand as u64).sum()
    }
}
