//! Settlement engine configuration
//!
//! Loaded from TOML. Every field has a default so a partial file is valid.

use crate::settlement::fees::DpmFeeSchedule;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "PAYOUT_CONFIG_PATH";

/// Default config file name.
pub const DEFAULT_CONFIG_PATH: &str = "payout_config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Terminal pool values below this are not distributed to liquidity providers.
    #[serde(default = "default_dust_threshold")]
    pub dust_threshold: f64,

    /// Fees taken from DPM winners' profit at settlement.
    #[serde(default)]
    pub dpm_fees: DpmFeeSchedule,

    /// Log a warning when multi-outcome weights do not sum to 1.
    #[serde(default = "default_true")]
    pub warn_on_weight_drift: bool,
}

fn default_dust_threshold() -> f64 {
    1e-3
}

fn default_true() -> bool {
    true
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            dust_threshold: default_dust_threshold(),
            dpm_fees: DpmFeeSchedule::default(),
            warn_on_weight_drift: true,
        }
    }
}

impl SettlementConfig {
    /// Load from TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment or default path
    pub fn from_env() -> Self {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Self::load(&path).unwrap_or_else(|e| {
            tracing::debug!("Using default settlement config ({}): {}", path, e);
            Self::default()
        })
    }

    /// Save to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.dust_threshold.is_finite() && self.dust_threshold >= 0.0,
            "dust_threshold must be a non-negative number, got {}",
            self.dust_threshold
        );
        let rate = self.dpm_fees.total_rate();
        anyhow::ensure!(
            self.dpm_fees.platform_fee_rate >= 0.0
                && self.dpm_fees.creator_fee_rate >= 0.0
                && rate <= 1.0,
            "dpm fee rates must be non-negative and sum to at most 1, got {}",
            rate
        );
        Ok(())
    }
}
