// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use std::env;
use tokio::net::TcpListener;

use sono_triage::config::{load_and_validate_config, Config, RuntimeBuilder};
use sono_triage::observability::init_tracing;
use sono_triage::stages::Stage;
use sono_triage::transport::tcp;

const USAGE: &str = "\
Usage: sono-triage <config.yaml> coordinator
       sono-triage <config.yaml> serve <frame-source|segmenter|diagnostician|announcer>
       sono-triage <config.yaml> standalone";

/// What this process runs.
enum Mode {
    /// The coordinator loop, talking to the four services over TCP.
    Coordinator,
    /// One stage service listening on its configured address.
    Serve(Stage),
    /// All four services and the coordinator in one process.
    Standalone,
}

fn parse_args(args: &[String]) -> Result<(String, Mode)> {
    let (config_path, rest) = match args {
        [_, config_path, rest @ ..] => (config_path.clone(), rest),
        _ => bail!("{}", USAGE),
    };

    let mode = match rest {
        [mode] if mode == "coordinator" => Mode::Coordinator,
        [mode] if mode == "standalone" => Mode::Standalone,
        [mode, stage] if mode == "serve" => match Stage::from_cli_name(stage) {
            Some(stage) => Mode::Serve(stage),
            None => bail!("unknown stage '{}'\n{}", stage, USAGE),
        },
        _ => bail!("{}", USAGE),
    };
    Ok((config_path, mode))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

async fn run_coordinator(config: &Config) {
    let coordinator = RuntimeBuilder::coordinator(config, RuntimeBuilder::tcp_stages(config));
    coordinator.run(shutdown_signal()).await;
}

async fn run_service(config: &Config, stage: Stage) -> Result<()> {
    let address = config.services.address(stage);
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to listen for {} on {}", stage, address))?;
    let handle = RuntimeBuilder::start_service(config, stage)
        .with_context(|| format!("failed to register {} operations", stage))?;

    tokio::select! {
        served = tcp::serve(handle.clone(), listener, config.transport.max_frame_bytes) => {
            served.with_context(|| format!("{} listener failed", stage))?;
        }
        _ = shutdown_signal() => {}
    }

    handle.abort();
    Ok(())
}

async fn run_standalone(config: &Config) -> Result<()> {
    let (stages, services) =
        RuntimeBuilder::local_stages(config).context("failed to register stage operations")?;
    let coordinator = RuntimeBuilder::coordinator(config, stages);

    coordinator.run(shutdown_signal()).await;

    for service in services {
        service.abort();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let (config_path, mode) = parse_args(&args)?;

    let config = load_and_validate_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path))?;
    init_tracing(&config.logging.filter);

    match mode {
        Mode::Coordinator => run_coordinator(&config).await,
        Mode::Serve(stage) => run_service(&config, stage).await?,
        Mode::Standalone => run_standalone(&config).await?,
    }
    Ok(())
}
