// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use fault_injection_core::{
    ClientConfig, GrpcClient, RetryPolicy, ECHO_SERVICE_NAME, UNARY_ECHO_METHOD,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Issues unary echo calls under a gRPC retry policy while asking the server
/// to inject failures.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    loops: Option<u64>,

    /// Server address, e.g. http://localhost:50052
    #[arg(long)]
    addr: Option<String>,

    /// gRPC service config JSON holding the retry policy
    #[arg(long)]
    policy: Option<String>,

    /// Failure probability (0-100) stamped on every call
    #[arg(long)]
    fail_percent: Option<i64>,

    /// Single code or comma separated codes, e.g. 4,8,14
    #[arg(long, value_delimiter = ',')]
    fail_codes: Option<Vec<i64>>,

    /// Deadline per call including retries
    #[arg(long)]
    timeout_ms: Option<u64>,
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
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(loops) = cli.loops {
        config.loops = loops;
    }
    if let Some(addr) = cli.addr {
        config.server_address = addr;
    }
    if let Some(policy) = cli.policy {
        config.policy_path = policy;
    }
    if let Some(fail_percent) = cli.fail_percent {
        config.fail_percent = fail_percent;
    }
    if let Some(fail_codes) = cli.fail_codes {
        config.fail_codes = fail_codes;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.call_timeout_ms = timeout_ms;
    }

    let retry_policy =
        RetryPolicy::load(&config.policy_path, ECHO_SERVICE_NAME, UNARY_ECHO_METHOD)?;
    if retry_policy.is_none() {
        warn!(
            "{} has no retry policy for {}/{}, calls will not be retried",
            config.policy_path, ECHO_SERVICE_NAME, UNARY_ECHO_METHOD
        );
    }

    let client = GrpcClient::new(config, retry_policy);
    let cancellation_token = client.cancellation_token();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down");
            cancellation_token.cancel();
        }
    });

    client.start().await?;
    Ok(())
}
