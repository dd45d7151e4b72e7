use std::env;
use std::time::Duration;

use padding_oracle::AttackConfig;

#[derive(Debug, Clone)]
pub struct LabConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Simulated latency added to every oracle query.
    pub oracle_delay: Duration,

    pub attack: AttackConfig,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            oracle_delay: Duration::ZERO,
            attack: AttackConfig::default(),
        }
    }
}

impl LabConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ORACLE_LAB_LOG`: log level (default: info)
    /// - `ORACLE_LAB_DELAY_MS`: per-query oracle delay in milliseconds (default: 0)
    /// - plus everything read by [`AttackConfig::from_env`]
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("ORACLE_LAB_LOG").unwrap_or_else(|_| "info".to_string()),

            oracle_delay: env::var("ORACLE_LAB_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::ZERO),

            attack: AttackConfig::from_env(),
        }
    }
}
