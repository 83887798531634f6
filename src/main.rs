//! Spotswap entry point.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use spotswap::adapters::{LoggingReplacementEngine, LoggingTerminationHandler};
use spotswap::cli::{version_requested, version_string, Cli};
use spotswap::infrastructure::config::ConfigLoader;
use spotswap::infrastructure::instance_data::InstanceDataFetcher;
use spotswap::infrastructure::lambda::{EventLoop, InvocationMode, RuntimeApiClient};
use spotswap::infrastructure::logging::LoggerImpl;
use spotswap::{Dispatcher, InstanceDataSource};

#[tokio::main]
async fn main() -> ExitCode {
    if version_requested(std::env::args_os().skip(1)) {
        println!("{}", version_string());
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();

    let _logger = match LoggerImpl::init(&cli.log_config()) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, InvocationMode::detect()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "spotswap failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, mode: InvocationMode) -> Result<()> {
    info!(mode = %mode, build = %version_string(), "starting");

    let runtime = match mode {
        InvocationMode::Triggered => Some(RuntimeApiClient::from_env()?),
        InvocationMode::Direct => None,
    };

    let dispatcher = match build_dispatcher(cli).await {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            if let Some(ref client) = runtime {
                if let Err(report_err) = client.report_init_error(&format!("{e:#}")).await {
                    warn!(error = %report_err, "could not report init error to the runtime API");
                }
            }
            return Err(e);
        }
    };

    match runtime {
        Some(client) => EventLoop::new(&client, &dispatcher).run().await?,
        None => dispatcher.run_scheduled().await,
    }
    Ok(())
}

async fn build_dispatcher(cli: &Cli) -> Result<Dispatcher> {
    let config = ConfigLoader::load(cli.config.as_deref(), &cli.settings)
        .context("Failed to load configuration")?;

    let catalog = InstanceDataFetcher::new(&config.instance_data_url)?
        .load()
        .await
        .context("Failed to load instance type data")?;

    Ok(Dispatcher::new(
        Arc::new(config),
        Arc::new(catalog),
        Arc::new(LoggingReplacementEngine),
        Arc::new(LoggingTerminationHandler),
    ))
}
