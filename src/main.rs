//! Batch driver: solves every instance file of a directory and writes one `sol-<stem>.dat` each.

use carp_grasp::config::Config;
use carp_grasp::error::Result;
use carp_grasp::utils::solve_directory;
use carp_grasp::GraspSolver;
use clap::Parser;
use log::error;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "carp-grasp", about = "Solve CARP instances with parallel GRASP/VNS")]
struct Args {
    /// Directory scanned for instance files
    #[arg(default_value = "dados")]
    input_dir: PathBuf,

    /// Directory receiving the `sol-<stem>.dat` files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Extension of the instance files
    #[arg(long, default_value = "dat")]
    extension: String,

    /// JSON file with solver settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of worker threads
    #[arg(long)]
    workers: Option<usize>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return;
        }
    };

    let solver = GraspSolver::new(config);
    if let Err(err) = solve_directory(&solver, &args.input_dir, &args.extension, &args.output_dir)
    {
        error!("cannot scan {}: {}", args.input_dir.display(), err);
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(workers) = args.workers {
        config = config.with_max_workers(workers);
    }
    Ok(config)
}
