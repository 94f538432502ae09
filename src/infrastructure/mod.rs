// Infrastructure: process wiring for the binary

pub mod logging;
pub mod runner;

pub use runner::{run, Cli, RunnerConfig};
