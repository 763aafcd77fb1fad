use std::path::Path;

use rust_decimal::Decimal;
use triarb_core::Asset;
use triarb_optimizer::Grid;

use crate::error::{ConfigError, Result};
use crate::raw::RawConfig;

pub const DEFAULT_SOCKET_WORKERS: usize = 8;
pub const DEFAULT_DEPTH_WORKERS: usize = 2;
pub const DEFAULT_COMPUTE_WORKERS: usize = 6;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub user_id: String,
}

/// Validated, immutable configuration for a single engine run. Built once at
/// startup by [`EngineConfig::load`]; nothing downstream mutates it.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_asset: Asset,
    pub investment_grid: Grid,
    /// Fraction, not percent: `0.001` for a 0.1% taker fee.
    pub taker_fee: Decimal,
    pub age_threshold_ms: u64,
    /// Fraction, not percent: `0.003` for a 0.3% threshold.
    pub profit_threshold: Decimal,
    pub trading_enabled: bool,
    /// `None` means unlimited (a configured `EXECUTION_CAP <= 0`).
    pub execution_cap: Option<u64>,
    pub depth_size: usize,
    pub socket_workers: usize,
    pub depth_workers: usize,
    pub compute_workers: usize,
    pub telegram: Option<TelegramConfig>,
}

impl EngineConfig {
    /// Load and validate a JSON configuration file from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.display().to_string();
        let text = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;
        Self::from_json(&text, &path_str)
    }

    /// Parse and validate a JSON document already read into memory
    /// (`path` is only used to label errors).
    pub fn from_json(text: &str, path: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        if raw.INVESTMENT.MIN > raw.INVESTMENT.MAX {
            return Err(ConfigError::InvalidGrid {
                min: raw.INVESTMENT.MIN.to_string(),
                max: raw.INVESTMENT.MAX.to_string(),
            });
        }
        if raw.INVESTMENT.STEP <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveStep(raw.INVESTMENT.STEP.to_string()));
        }
        if raw.DEPTH.SIZE <= 0 {
            return Err(ConfigError::NonPositiveDepth(raw.DEPTH.SIZE));
        }

        let workers = raw.WORKERS;
        let socket_workers = workers
            .as_ref()
            .and_then(|w| w.SOCKET_WORKERS)
            .unwrap_or(DEFAULT_SOCKET_WORKERS);
        let depth_workers = workers
            .as_ref()
            .and_then(|w| w.DEPTH_WORKERS)
            .unwrap_or(DEFAULT_DEPTH_WORKERS);
        let compute_workers = workers
            .as_ref()
            .and_then(|w| w.COMPUTE_WORKERS)
            .unwrap_or(DEFAULT_COMPUTE_WORKERS);

        Ok(Self {
            api_key: raw.KEYS.API,
            api_secret: raw.KEYS.SECRET,
            base_asset: Asset::from(raw.INVESTMENT.BASE),
            investment_grid: Grid::new(raw.INVESTMENT.MIN, raw.INVESTMENT.STEP, raw.INVESTMENT.MAX),
            taker_fee: raw.TRADING.TAKER_FEE / Decimal::ONE_HUNDRED,
            age_threshold_ms: raw.TRADING.AGE_THRESHOLD,
            profit_threshold: raw.TRADING.PROFIT_THRESHOLD / Decimal::ONE_HUNDRED,
            trading_enabled: raw.TRADING.ENABLED,
            execution_cap: if raw.TRADING.EXECUTION_CAP > 0 {
                Some(raw.TRADING.EXECUTION_CAP as u64)
            } else {
                None
            },
            depth_size: raw.DEPTH.SIZE as usize,
            socket_workers,
            depth_workers,
            compute_workers,
            telegram: raw.TELEGRAM.map(|t| TelegramConfig {
                token: t.TOKEN,
                user_id: t.USER_ID,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_json() -> &'static str {
        r#"{
            "KEYS": {"API": "key", "SECRET": "secret"},
            "INVESTMENT": {"BASE": "USDT", "MIN": 100, "MAX": 500, "STEP": 100},
            "TRADING": {
                "TAKER_FEE": 0.1,
                "AGE_THRESHOLD": 500,
                "PROFIT_THRESHOLD": 0.3,
                "ENABLED": false,
                "EXECUTION_CAP": 0
            },
            "DEPTH": {"SIZE": 10}
        }"#
    }

    #[test]
    fn parses_and_converts_percents_to_fractions() {
        let cfg = EngineConfig::from_json(sample_json(), "test.json").unwrap();
        assert_eq!(cfg.taker_fee, dec!(0.001));
        assert_eq!(cfg.profit_threshold, dec!(0.003));
        assert_eq!(cfg.execution_cap, None);
        assert_eq!(cfg.socket_workers, DEFAULT_SOCKET_WORKERS);
        assert!(cfg.telegram.is_none());
    }

    #[test]
    fn execution_cap_positive_value_is_some() {
        let json = sample_json().replace("\"EXECUTION_CAP\": 0", "\"EXECUTION_CAP\": 5");
        let cfg = EngineConfig::from_json(&json, "test.json").unwrap();
        assert_eq!(cfg.execution_cap, Some(5));
    }

    #[test]
    fn rejects_inverted_grid() {
        let json = sample_json().replace("\"MAX\": 500", "\"MAX\": 50");
        let err = EngineConfig::from_json(&json, "test.json").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGrid { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = EngineConfig::from_json("not json", "test.json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn telegram_section_is_optional_but_parsed_when_present() {
        let json = sample_json().replace(
            "\"DEPTH\": {\"SIZE\": 10}",
            "\"DEPTH\": {\"SIZE\": 10}, \"TELEGRAM\": {\"TOKEN\": \"t\", \"USER_ID\": \"u\"}",
        );
        let cfg = EngineConfig::from_json(&json, "test.json").unwrap();
        assert_eq!(cfg.telegram.unwrap().token, "t");
    }
}
