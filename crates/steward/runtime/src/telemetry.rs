//! Tracing setup for hosts.
//!
//! The ledger crates only emit `tracing` events. Installing a subscriber is
//! left to the host, which calls [`init_tracing`] once at startup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TelemetryConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// Install a global subscriber. `RUST_LOG` wins over `config.level`.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> RuntimeResult<()> {
    let env_filter = env_filter(config)?;
    let result = if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };
    result.map_err(|e| RuntimeError::Telemetry(e.to_string()))
}

fn env_filter(config: &TelemetryConfig) -> RuntimeResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| RuntimeError::Telemetry(format!("invalid level {:?}: {e}", config.level))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_parses() {
        let config = TelemetryConfig {
            level: "steward_governance=debug,warn".into(),
            json: false,
        };
        assert!(env_filter(&config).is_ok());
    }
}
