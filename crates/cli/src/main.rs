//! vmup CLI - provision one Compute Engine VM with its static IP and
//! firewall rule.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vmup_cloud::{GcpCompute, ProvisionConfig, Provisioner};

/// Provision a Compute Engine VM: static IP, firewall rule, instance.
#[derive(Parser)]
#[command(name = "vmup")]
#[command(about = "Provision a single Compute Engine VM with supporting network resources")]
#[command(version)]
struct Cli {
    /// Path to the provisioning configuration (TOML)
    #[arg(long, default_value = "vmup.toml")]
    config: PathBuf,

    /// OAuth2 access token for the Compute Engine API
    #[arg(long, env = "GCP_ACCESS_TOKEN", hide_env_values = true)]
    token: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("vmup=debug,vmup_cloud=debug,info")
    } else {
        EnvFilter::new("vmup=info,vmup_cloud=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = ProvisionConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.validate().context("invalid configuration")?;

    tracing::info!(
        project = %config.project,
        region = %config.region,
        zone = %config.zone,
        instance = %config.instance_name,
        "Starting provisioning run"
    );

    let api = GcpCompute::new(&config.project, &cli.token)?;
    let provisioner = Provisioner::new(&api, &config);

    let outcome = provisioner.run().await.context("provisioning failed")?;

    println!("Instance {} is up", config.instance_name);
    println!("Reserved static IP: {}", outcome.static_ip);
    Ok(())
}
