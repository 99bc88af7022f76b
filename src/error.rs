//! Error types shared by the parser, the solver and the CLI.

use thiserror::Error;

use crate::problem::Demand;

/// Everything that can go wrong between reading an instance and writing its solution.
#[derive(Debug, Error)]
pub enum CarpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing header line `{0}`")]
    MissingHeader(&'static str),

    #[error("malformed instance at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("service {service} has demand {demand} which exceeds vehicle capacity {capacity}")]
    InfeasibleService {
        service: usize,
        demand: Demand,
        capacity: Demand,
    },

    #[error("depot {depot} is not a vertex of a graph with {vertices} vertices")]
    InvalidDepot { depot: usize, vertices: usize },

    #[error("worker {worker} terminated abnormally")]
    WorkerFailed { worker: usize },

    #[error("no worker produced a solution")]
    NoSolution,

    #[error("invalid solution: {0}")]
    InvalidSolution(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CarpError>;

impl CarpError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        CarpError::Malformed {
            line,
            reason: reason.into(),
        }
    }
}
