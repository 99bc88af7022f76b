//! # CARP-GRASP
//!
//! A parallel GRASP/VNS solver for the Capacitated Arc Routing Problem with
//! required nodes, edges and arcs.
//!
//! Several worker threads each alternate randomized greedy construction with a
//! fixed sequence of local search moves (2-opt, Or-opt, inter-route Or-opt),
//! share their improvements through a single best-solution record, and consult a
//! lazily filled shortest-path cache owned by the problem instance.

pub mod config;
pub mod construction;
pub mod distance;
pub mod error;
pub mod global_best;
pub mod grasp;
pub mod local_search;
pub mod memo;
pub mod parser;
pub mod problem;
pub mod solution;
pub mod utils;

use crate::config::Config;
use crate::error::{CarpError, Result};
use crate::global_best::GlobalBest;
use crate::grasp::{GraspWorker, WorkerReport};
use crate::problem::{Cost, Problem};
use crate::solution::Solution;

use log::{error, info};
use std::num::NonZeroUsize;
use std::thread;
use std::time::{Duration, Instant};

/// The result of one optimization run.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub solution: Solution,
    pub cost: Cost,
    pub elapsed: Duration,
    pub reports: Vec<WorkerReport>,
}

/// Launches the GRASP workers for a problem and keeps the cheapest solution they find.
#[derive(Debug, Clone, Default)]
pub struct GraspSolver {
    pub config: Config,
}

impl GraspSolver {
    /// Create a solver with the given configuration.
    pub fn new(config: Config) -> Self {
        GraspSolver { config }
    }

    /// Number of workers: the configured ceiling, bounded by the hardware parallelism.
    pub fn worker_count(&self) -> usize {
        let available = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        self.config.max_workers.max(1).min(available)
    }

    /// Iteration budget of `worker`: the first half of the pool runs longer.
    pub fn iteration_budget(&self, worker: usize, workers: usize) -> u32 {
        if worker < workers / 2 {
            self.config.long_run_iterations
        } else {
            self.config.short_run_iterations
        }
    }

    /// Run all workers to completion and return the best solution.
    ///
    /// Blocks until every worker has exhausted its budget. A worker that panics is
    /// reported as [`CarpError::WorkerFailed`] once all the others have been joined.
    pub fn solve(&self, problem: &Problem) -> Result<SolveOutcome> {
        let start_time = Instant::now();
        let workers = self.worker_count();
        let global_best = GlobalBest::new();

        info!(
            "solving {} ({} services) on {} workers",
            problem.name,
            problem.service_count(),
            workers
        );

        let reports = self.run_workers(workers, |worker| {
            let max_iterations = self.iteration_budget(worker, workers);
            GraspWorker::new(worker, problem, &global_best, &self.config, max_iterations).run()
        })?;

        let (solution, cost) = Self::select_best(problem, global_best, &reports)?;
        let elapsed = start_time.elapsed();
        info!(
            "solved {}: cost {}, {} routes, deadhead {}, in {:?}",
            problem.name,
            cost,
            solution.route_count(),
            solution.deadhead_cost(problem),
            elapsed
        );

        Ok(SolveOutcome {
            solution,
            cost,
            elapsed,
            reports,
        })
    }

    /// Run `work` on `workers` named scoped threads and collect their reports in worker order.
    ///
    /// Every thread is joined before returning. A thread that panics or cannot be spawned
    /// is logged, and the first such failure is returned once all the others have finished.
    pub fn run_workers<F>(&self, workers: usize, work: F) -> Result<Vec<WorkerReport>>
    where
        F: Fn(usize) -> WorkerReport + Sync,
    {
        let work = &work;
        let results: Vec<Result<WorkerReport>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let spawned = thread::Builder::new()
                        .name(format!("grasp-{}", worker))
                        .spawn_scoped(scope, move || work(worker));
                    (worker, spawned)
                })
                .collect();

            handles
                .into_iter()
                .map(|(worker, spawned)| {
                    spawned
                        .map_err(CarpError::from)
                        .and_then(|handle| {
                            handle.join().map_err(|_| CarpError::WorkerFailed { worker })
                        })
                })
                .collect()
        });

        let mut reports = Vec::with_capacity(workers);
        let mut failure = None;
        for result in results {
            match result {
                Ok(report) => reports.push(report),
                Err(err) => {
                    error!("{}", err);
                    failure.get_or_insert(err);
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(reports),
        }
    }

    /// Cheapest of the shared record and every worker's local best.
    fn select_best(
        problem: &Problem,
        global_best: GlobalBest,
        reports: &[WorkerReport],
    ) -> Result<(Solution, Cost)> {
        let mut best = global_best.into_inner();

        for report in reports {
            if let Some(solution) = &report.best {
                let cost = solution.total_cost(problem);
                if best.as_ref().map_or(true, |(_, best_cost)| cost < *best_cost) {
                    best = Some((solution.clone(), cost));
                }
            }
        }

        best.ok_or(CarpError::NoSolution)
    }
}

/// Solve `problem` with `config`.
pub fn solve(problem: &Problem, config: Config) -> Result<SolveOutcome> {
    GraspSolver::new(config).solve(problem)
}
