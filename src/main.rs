use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod services;

use cli::*;
use commands::*;
use config::{load_config, Config};
use domain::models::*;
use error::SetupError;
use services::describe::describe_archive;
use services::output::{print_error, print_one};
use services::run::{run, RunOptions};

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(err) = dispatch(&cli) {
        let code = err
            .downcast_ref::<SetupError>()
            .map(SetupError::code)
            .unwrap_or("ERROR");
        tracing::error!("{err:#}");
        print_error(cli.json, code, &format!("{err:#}"));
        std::process::exit(1);
    }
}

fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.root, cli.config.as_deref())?;

    if handle_run_commands(cli, &config)? {
        return Ok(());
    }
    if handle_describe_commands(cli, &config)? {
        return Ok(());
    }
    Ok(())
}
