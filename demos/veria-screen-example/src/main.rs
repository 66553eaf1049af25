//! Screens every address given on the command line and prints the verdict.
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `VERIA_CONFIG` optional TOML file with `api_key`, `base_url`, `timeout_ms`
//! - `VERIA_API_KEY`, `VERIA_BASE_URL`, `VERIA_TIMEOUT_MS` override the file
//! - `RUST_LOG` controls log output, e.g. `RUST_LOG=veria_rs=debug`
//!
//! Exits with status 2 if any address should be blocked, 1 on errors.

use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;
use veria_rs::{ClientConfig, ScreeningDecision, VeriaClient};

fn load_config() -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match std::env::var("VERIA_CONFIG") {
        Ok(path) => ClientConfig::from_file(path)?,
        Err(_) => ClientConfig::new(""),
    };

    if let Ok(api_key) = std::env::var("VERIA_API_KEY") {
        config.api_key = api_key;
    }
    if let Ok(base_url) = std::env::var("VERIA_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    if let Some(timeout_ms) = std::env::var("VERIA_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
    {
        config = config.with_timeout_ms(timeout_ms);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        eprintln!("usage: veria-screen-example <address> [<address>...]");
        std::process::exit(1);
    }

    let config = load_config()?;
    tracing::debug!(?config, "Loaded screening configuration");

    let client = match VeriaClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(code = %e.code(), "Failed to create screening client: {}", e);
            std::process::exit(1);
        }
    };

    let mut any_blocked = false;
    let mut any_failed = false;

    for input in &inputs {
        match client.screen(input).await {
            Ok(result) => {
                println!("{}", serde_json::to_string_pretty(&result)?);
                match result.decision() {
                    ScreeningDecision::Block { reason } => {
                        any_blocked = true;
                        tracing::warn!(input = %input, "BLOCK: {}", reason);
                    }
                    ScreeningDecision::Review { reason } => {
                        tracing::info!(input = %input, "REVIEW: {}", reason);
                    }
                    ScreeningDecision::Clear => {
                        tracing::info!(input = %input, risk = %result.risk_level, "CLEAR");
                    }
                }
            }
            Err(e) => {
                any_failed = true;
                tracing::error!(
                    input = %input,
                    code = %e.code(),
                    status = ?e.status_code(),
                    retryable = e.is_retryable(),
                    "Screening failed: {}",
                    e
                );
            }
        }
    }

    if any_blocked {
        std::process::exit(2);
    }
    if any_failed {
        std::process::exit(1);
    }
    Ok(())
}
