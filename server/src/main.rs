// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use fault_injection_core::{ServerConfig, ServerRunner};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Echo server that rejects a configurable share of calls so client retry
/// policies can be exercised.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Failure probability (0-100) for calls without a failpercent header
    #[arg(long)]
    fail_percent: Option<i64>,

    /// Seconds between counter reports, 0 disables them
    #[arg(long)]
    report_interval: Option<u64>,

    /// Seed for reproducible fault decisions
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listen_address = format!("0.0.0.0:{}", port);
    }
    if let Some(fail_percent) = cli.fail_percent {
        config.default_fail_percent = fail_percent;
    }
    if let Some(interval) = cli.report_interval {
        config.counter_report_interval_secs = interval;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let default_fail_percent = config.validate()?;
    info!(
        "default failpercent {}, seed {:?}",
        default_fail_percent, config.seed
    );

    ServerRunner::new(&config)?
        .run(&config.listen_address)
        .await?;
    Ok(())
}
