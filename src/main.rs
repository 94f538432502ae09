use clap::Parser;
use shiftopt::infrastructure::{logging, run, Cli, RunnerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = RunnerConfig::from_cli(Cli::parse())?;
    run(config).await?;

    Ok(())
}
