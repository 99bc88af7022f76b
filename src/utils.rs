//! Utility functions: solution files, batch runs and run summaries.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info, warn};

use crate::error::Result;
use crate::problem::{Cost, Problem};
use crate::solution::Solution;
use crate::{GraspSolver, SolveOutcome};

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    format!("{}h {:02}m {:02}.{:03}s", hours, minutes, seconds, millis)
}

/// Name of the solution file for an instance file: `sol-<file stem>.dat`.
///
/// The stem is used rather than the `Name:` header so the output always lands
/// directly in the output directory.
pub fn solution_file_name<P: AsRef<Path>>(instance: P) -> String {
    let stem = instance
        .as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("sol-{}.dat", stem)
}

/// Path of the solution file for `instance` inside `output_dir`.
pub fn solution_path<P: AsRef<Path>, Q: AsRef<Path>>(output_dir: P, instance: Q) -> PathBuf {
    output_dir.as_ref().join(solution_file_name(instance))
}

/// Write a solution in the text format.
///
/// Four header lines (total cost, route count, elapsed nanoseconds twice) are followed
/// by one line per route: `0 1 <index> <demand> <cost> <stops>` and the stop tokens.
pub fn write_solution<W: Write>(
    out: &mut W,
    problem: &Problem,
    solution: &Solution,
    elapsed: Duration,
) -> std::io::Result<()> {
    let nanos = elapsed.as_nanos();

    writeln!(out, "{}", solution.total_cost(problem))?;
    writeln!(out, "{}", solution.route_count())?;
    writeln!(out, "{}", nanos)?;
    writeln!(out, "{}", nanos)?;

    for (index, route) in solution.routes.iter().enumerate() {
        writeln!(
            out,
            "0 1 {} {} {} {} {}",
            index + 1,
            route.load(problem),
            route.cost(problem),
            route.len(),
            route
        )?;
    }

    Ok(())
}

/// Save a solution to a file.
pub fn save_solution<P: AsRef<Path>>(
    path: P,
    problem: &Problem,
    solution: &Solution,
    elapsed: Duration,
) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_solution(&mut out, problem, solution, elapsed)?;
    out.flush()
}

/// Instance files of `dir` with the given extension, in sorted order.
pub fn list_instances<P: AsRef<Path>>(dir: P, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load, solve and save one instance. Returns the path written.
pub fn solve_instance<P: AsRef<Path>, Q: AsRef<Path>>(
    solver: &GraspSolver,
    instance: P,
    output_dir: Q,
) -> Result<PathBuf> {
    let instance = instance.as_ref();
    let problem = Problem::from_file(instance)?;
    let outcome = solver.solve(&problem)?;
    info!("{}", SearchStatistics::from_outcome(&outcome, &problem).format());

    let target = solution_path(output_dir, instance);
    save_solution(&target, &problem, &outcome.solution, outcome.elapsed)?;
    Ok(target)
}

/// Outcome counts of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub solved: usize,
    pub failed: usize,
}

/// Solve every instance file of `input_dir` into `output_dir`.
///
/// A failing instance is logged and skipped. Only an unreadable input directory
/// fails the whole batch.
pub fn solve_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    solver: &GraspSolver,
    input_dir: P,
    extension: &str,
    output_dir: Q,
) -> Result<BatchSummary> {
    let input_dir = input_dir.as_ref();
    let instances = list_instances(input_dir, extension)?;
    if instances.is_empty() {
        warn!("no .{} files found in {}", extension, input_dir.display());
    }

    let mut summary = BatchSummary::default();
    for path in &instances {
        info!("processing {}", path.display());
        match solve_instance(solver, path, output_dir.as_ref()) {
            Ok(target) => {
                info!("wrote {}", target.display());
                summary.solved += 1;
            }
            Err(err) => {
                error!("{}: {}", path.display(), err);
                summary.failed += 1;
            }
        }
    }

    info!(
        "{} of {} instances solved",
        summary.solved,
        instances.len()
    );
    Ok(summary)
}

/// Statistics about one optimization run.
pub struct SearchStatistics {
    pub workers: usize,
    pub iterations: u32,
    pub runtime: Duration,
    pub best_solution_cost: Cost,
    pub best_solution_deadhead: Cost,
    pub best_solution_routes: usize,
    pub distance_rows: usize,
}

impl SearchStatistics {
    pub fn from_outcome(outcome: &SolveOutcome, problem: &Problem) -> Self {
        SearchStatistics {
            workers: outcome.reports.len(),
            iterations: outcome.reports.iter().map(|report| report.iterations).sum(),
            runtime: outcome.elapsed,
            best_solution_cost: outcome.cost,
            best_solution_deadhead: outcome.solution.deadhead_cost(problem),
            best_solution_routes: outcome.solution.route_count(),
            distance_rows: problem.distances().computations(),
        }
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Workers: {}
- Iterations: {}
- Runtime: {}
- Best Solution Cost: {}
- Best Solution Deadhead: {}
- Best Solution Routes: {}
- Distance Rows Computed: {}",
            self.workers,
            self.iterations,
            format_duration(self.runtime),
            self.best_solution_cost,
            self.best_solution_deadhead,
            self.best_solution_routes,
            self.distance_rows
        )
    }
}
