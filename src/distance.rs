//! Lazily computed shortest-path distances over the instance graph.

use crate::memo::MemoTable;
use crate::problem::{Cost, Link, INFINITE_DISTANCE};
use log::trace;
use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Single-source shortest-path rows, computed at most once per source vertex.
///
/// Vertices are addressed by their instance id (`1..=vertex_count`); index 0 exists
/// in the graph but has no links, so every distance to or from it is infinite.
#[derive(Debug)]
pub struct DistanceOracle {
    graph: DiGraph<(), Cost>,
    rows: MemoTable<Vec<Cost>>,
    computations: AtomicUsize,
}

impl DistanceOracle {
    /// Build the graph for `vertex_count` vertices. Undirected links are added in both directions.
    pub fn new(vertex_count: usize, links: &[Link]) -> Self {
        let size = vertex_count + 1;
        let mut graph = DiGraph::with_capacity(size, links.len() * 2);
        for _ in 0..size {
            graph.add_node(());
        }

        for link in links {
            let from = NodeIndex::new(link.from);
            let to = NodeIndex::new(link.to);
            graph.add_edge(from, to, link.cost);
            if !link.directed {
                graph.add_edge(to, from, link.cost);
            }
        }

        DistanceOracle {
            graph,
            rows: MemoTable::new(size),
            computations: AtomicUsize::new(0),
        }
    }

    /// Distances from `source` to every vertex, `INFINITE_DISTANCE` where unreachable.
    pub fn row_for(&self, source: usize) -> &[Cost] {
        self.rows
            .get_or_compute(source, |source| self.shortest_paths(source))
    }

    pub fn distance(&self, from: usize, to: usize) -> Cost {
        self.row_for(from)[to]
    }

    /// How many times a shortest-path search actually ran.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Number of source vertices whose row is cached.
    pub fn cached_rows(&self) -> usize {
        self.rows.computed()
    }

    pub fn graph(&self) -> &DiGraph<(), Cost> {
        &self.graph
    }

    fn shortest_paths(&self, source: usize) -> Vec<Cost> {
        self.computations.fetch_add(1, Ordering::Relaxed);
        trace!("computing shortest paths from vertex {}", source);

        let reached = dijkstra(&self.graph, NodeIndex::new(source), None, |edge| {
            *edge.weight()
        });

        let mut row = vec![INFINITE_DISTANCE; self.graph.node_count()];
        for (node, distance) in reached {
            row[node.index()] = distance;
        }
        row
    }
}
