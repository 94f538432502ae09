// Infrastructure: batch runner
// Solves every request file concurrently and writes one schedule file next to each.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};

use crate::application::Planner;
use crate::config::{ConfigError, PlannerConfig};
use crate::domain::{ScheduleError, SchedulingRequest};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot render schedule: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{failed} of {total} requests failed")]
    Failed { failed: usize, total: usize },
}

/// Solve shift scheduling requests and write one schedule per request
#[derive(Debug, Parser)]
#[command(name = "shiftopt", version, about)]
pub struct Cli {
    /// Planner configuration (TOML); defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Scheduling request files (JSON)
    #[arg(required = true, value_name = "REQUEST")]
    pub inputs: Vec<PathBuf>,
}

pub struct RunnerConfig {
    pub inputs: Vec<PathBuf>,
    pub planner: PlannerConfig,
}

impl RunnerConfig {
    pub fn new(inputs: Vec<PathBuf>, planner: PlannerConfig) -> Self {
        Self { inputs, planner }
    }

    /// Loads the planner configuration named on the command line.
    pub fn from_cli(cli: Cli) -> Result<Self, RunError> {
        let planner = match cli.config {
            Some(path) => PlannerConfig::load(path)?,
            None => PlannerConfig::default(),
        };
        Ok(Self::new(cli.inputs, planner))
    }
}

/// `roster.json` -> `roster.schedule.json`
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension("schedule.json")
}

pub async fn run(config: RunnerConfig) -> Result<(), RunError> {
    let planner = Arc::new(Planner::from_config(config.planner)?);
    print_banner(planner.solver_name(), config.inputs.len());

    let tasks: Vec<_> = config
        .inputs
        .into_iter()
        .map(|path| {
            let planner = Arc::clone(&planner);
            let input = path.clone();
            let task = tokio::task::spawn_blocking(move || solve_file(&planner, &input));
            (path, task)
        })
        .collect();

    let total = tasks.len();
    let mut failed = 0;
    for (path, task) in tasks {
        match task.await? {
            Ok(output) => info!(
                input = %path.display(),
                output = %output.display(),
                "schedule written"
            ),
            Err(e) => {
                error!(input = %path.display(), error = %e, "request failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(RunError::Failed { failed, total });
    }
    Ok(())
}

/// Reads, solves and writes one request; returns the output path.
pub fn solve_file(planner: &Planner, path: &Path) -> Result<PathBuf, RunError> {
    let request = SchedulingRequest::from_json_file(path)?;
    let schedule = planner.solve(&request)?;

    let output = output_path(path);
    let json = serde_json::to_string_pretty(&schedule)?;
    std::fs::write(&output, json).map_err(|source| RunError::Io {
        path: output.clone(),
        source,
    })?;
    Ok(output)
}

fn print_banner(solver: &str, requests: usize) {
    println!("\n╔═══════════════════════════════════════════════════════════╗");
    println!("║  ShiftOpt - Shift Scheduling as Integer Programming       ║");
    println!("╠═══════════════════════════════════════════════════════════╣");
    println!("║  Powered by: {:44} ║", solver);
    println!("║  Requests:   {:<44} ║", requests);
    println!("╚═══════════════════════════════════════════════════════════╝\n");
}
