use rust_decimal::Decimal;
use serde::Deserialize;

/// Mirrors the JSON configuration file layout verbatim: nested objects by
/// dotted-key group, all keys upper snake case as served by the source
/// config file. Deserialized first, then validated into
/// [`crate::EngineConfig`].
#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct RawConfig {
    pub KEYS: RawKeys,
    pub INVESTMENT: RawInvestment,
    pub TRADING: RawTrading,
    pub DEPTH: RawDepth,
    #[serde(default)]
    pub TELEGRAM: Option<RawTelegram>,
    #[serde(default)]
    pub WORKERS: Option<RawWorkers>,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct RawKeys {
    pub API: String,
    pub SECRET: String,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct RawInvestment {
    pub BASE: String,
    pub MIN: Decimal,
    pub MAX: Decimal,
    pub STEP: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct RawTrading {
    /// Percent fee per leg, e.g. `0.1` = 0.1%.
    pub TAKER_FEE: Decimal,
    /// Milliseconds.
    pub AGE_THRESHOLD: u64,
    /// Percent, e.g. `0.3` = 0.3%.
    pub PROFIT_THRESHOLD: Decimal,
    pub ENABLED: bool,
    /// `<= 0` means unlimited.
    #[serde(default)]
    pub EXECUTION_CAP: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct RawDepth {
    pub SIZE: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct RawTelegram {
    pub TOKEN: String,
    pub USER_ID: String,
}

/// Optional worker pool size overrides; a config file can tune these
/// without touching the binary.
#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct RawWorkers {
    #[serde(default)]
    pub SOCKET_WORKERS: Option<usize>,
    #[serde(default)]
    pub DEPTH_WORKERS: Option<usize>,
    #[serde(default)]
    pub COMPUTE_WORKERS: Option<usize>,
}
