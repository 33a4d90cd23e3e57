mod analyzer;
mod cli;
mod config;
mod error;
mod muxer;
mod queue;
mod tracks;
mod ui;
mod utils;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use config::{FileConfig, RunConfig};
use queue::Worker;
use std::process::ExitCode;
use ui::{Console, Reporter};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let color = !args.run.no_color;
    let console = Console::new(color);
    let _guard = utils::init_logging(color);

    match run(&args, &console).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{:?}", err);
            console.error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every file was processed without error
async fn run(args: &Args, console: &Console) -> anyhow::Result<bool> {
    let file_config = FileConfig::load(args.config.as_deref())?;
    let config = RunConfig::from_args(args, file_config)?;

    if config.verbose {
        console.plain(&format!("Options: {:#?}", config.selection));
        if !config.pass_along.is_empty() {
            console.plain(&format!("Passing along: {}", config.pass_along.join(" ")));
        }
    }

    utils::check_tools(&config.tools, config.selection.wants_extraction())?;

    let state = Worker::new(&config, console)
        .run()
        .await
        .context("batch stopped")?;
    Ok(state.is_success())
}
