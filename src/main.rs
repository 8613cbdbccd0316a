// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use secrets_distributor::config::Config;
use secrets_distributor::constants::OPERATOR_NAME;
use secrets_distributor::kubernetes::rbac::cluster_role_yaml;
use secrets_distributor::reconcilers::SecretReconciler;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the controller (default)
    Run,
    /// Print the ClusterRole the controller needs
    Rbac,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Rbac => {
            print!("{}", cluster_role_yaml(OPERATOR_NAME)?);
            Ok(())
        }
        Command::Run => run().await,
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting secrets distributor");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: sink_marker={}, watch_namespace={:?}",
        config.sink_marker, config.watch_namespace
    );

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    SecretReconciler::new(client, config).run().await?;

    warn!("Secret reconciler stopped");
    Ok(())
}
