// =============================================================================
// Runtime Configuration — engine thresholds with atomic save
// =============================================================================
//
// Every threshold the screening and signal engines consume lives here so that
// backtest sweeps can inject alternative values without code changes.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_hurst_threshold() -> f64 {
    0.5
}

fn default_vr_threshold() -> f64 {
    1.0
}

fn default_p_value_threshold() -> f64 {
    0.10
}

fn default_min_observations() -> usize {
    30
}

fn default_history_length() -> usize {
    252
}

fn default_max_watchlist() -> usize {
    50
}

fn default_adx_period() -> usize {
    14
}

fn default_bb_window() -> usize {
    20
}

fn default_bb_k() -> f64 {
    2.0
}

fn default_adx_threshold() -> f64 {
    25.0
}

fn default_strategy() -> String {
    "mr_v1".to_string()
}

fn default_window_capacity() -> usize {
    120
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_daily_reset_utc() -> Option<String> {
    // US equity open, 09:30 New York during daylight saving time.
    Some("13:30".to_string())
}

// =============================================================================
// ScreeningPolicy
// =============================================================================

/// Admission policy for the screening engine.
///
/// A symbol is admitted when `hurst < hurst_threshold`,
/// `variance_ratio < vr_threshold` and `p_value <= p_value_threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningPolicy {
    #[serde(default = "default_hurst_threshold")]
    pub hurst_threshold: f64,

    #[serde(default = "default_vr_threshold")]
    pub vr_threshold: f64,

    #[serde(default = "default_p_value_threshold")]
    pub p_value_threshold: f64,

    /// Shorter histories yield the neutral reject result.
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,

    /// Number of most recent daily closes screened per symbol.
    #[serde(default = "default_history_length")]
    pub history_length: usize,

    /// Cap on admitted symbols per cycle (best p-values first).
    #[serde(default = "default_max_watchlist")]
    pub max_watchlist: usize,
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self {
            hurst_threshold: default_hurst_threshold(),
            vr_threshold: default_vr_threshold(),
            p_value_threshold: default_p_value_threshold(),
            min_observations: default_min_observations(),
            history_length: default_history_length(),
            max_watchlist: default_max_watchlist(),
        }
    }
}

// =============================================================================
// IndicatorParams / SignalParams
// =============================================================================

/// Look-back settings for the streaming indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Wilder smoothing period for ADX.
    #[serde(default = "default_adx_period")]
    pub adx_period: usize,

    /// Bollinger window length.
    #[serde(default = "default_bb_window")]
    pub bb_window: usize,

    /// Bollinger band width in standard deviations.
    #[serde(default = "default_bb_k")]
    pub bb_k: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            adx_period: default_adx_period(),
            bb_window: default_bb_window(),
            bb_k: default_bb_k(),
        }
    }
}

/// Parameters of the signal state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalParams {
    /// Signals fire only while ADX is strictly below this value.
    #[serde(default = "default_adx_threshold")]
    pub adx_threshold: f64,

    /// Strategy tag stamped on every emitted event.
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            adx_threshold: default_adx_threshold(),
            strategy: default_strategy(),
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration record consumed by the engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub screening: ScreeningPolicy,

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub signal: SignalParams,

    /// Bars retained per symbol in the rolling window.
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,

    /// Bound of each per-symbol worker queue.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Static watchlist used when no screening history is supplied.
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Wall-clock time (UTC, `HH:MM`) of the daily cold reset. `None` disables it.
    #[serde(default = "default_daily_reset_utc")]
    pub daily_reset_utc: Option<String>,

    /// JSON file `{ "SYMBOL": [close, ...] }` screened at start-up.
    #[serde(default)]
    pub history_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screening: ScreeningPolicy::default(),
            indicators: IndicatorParams::default(),
            signal: SignalParams::default(),
            window_capacity: default_window_capacity(),
            channel_capacity: default_channel_capacity(),
            symbols: Vec::new(),
            daily_reset_utc: default_daily_reset_utc(),
            history_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path` and validate it.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid engine config in {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            adx_period = config.indicators.adx_period,
            bb_window = config.indicators.bb_window,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Reject settings under which the engines cannot produce defined values.
    pub fn validate(&self) -> Result<()> {
        let ind = &self.indicators;
        if ind.adx_period < 2 {
            anyhow::bail!("indicators.adx_period must be >= 2, got {}", ind.adx_period);
        }
        if ind.bb_window < 2 {
            anyhow::bail!("indicators.bb_window must be >= 2, got {}", ind.bb_window);
        }
        if !(ind.bb_k.is_finite() && ind.bb_k > 0.0) {
            anyhow::bail!("indicators.bb_k must be a positive number, got {}", ind.bb_k);
        }
        if self.screening.min_observations < 2 {
            anyhow::bail!(
                "screening.min_observations must be >= 2, got {}",
                self.screening.min_observations
            );
        }
        if self.window_capacity == 0 {
            anyhow::bail!("window_capacity must be > 0");
        }
        if self.channel_capacity == 0 {
            anyhow::bail!("channel_capacity must be > 0");
        }
        for (name, value) in [
            ("screening.hurst_threshold", self.screening.hurst_threshold),
            ("screening.vr_threshold", self.screening.vr_threshold),
            ("screening.p_value_threshold", self.screening.p_value_threshold),
            ("signal.adx_threshold", self.signal.adx_threshold),
        ] {
            if !value.is_finite() {
                anyhow::bail!("{name} must be finite, got {value}");
            }
        }
        self.daily_reset_time()?;
        Ok(())
    }

    /// Parsed [`EngineConfig::daily_reset_utc`].
    pub fn daily_reset_time(&self) -> Result<Option<NaiveTime>> {
        self.daily_reset_utc
            .as_deref()
            .map(|s| {
                NaiveTime::parse_from_str(s, "%H:%M")
                    .with_context(|| format!("daily_reset_utc must be HH:MM, got {s:?}"))
            })
            .transpose()
    }

    /// Bars a symbol needs after a cold reset before signals can fire.
    pub fn warmup_bars(&self) -> usize {
        self.indicators.adx_period.max(self.indicators.bb_window)
    }
}

/// First instant strictly after `now` whose UTC wall-clock time is `at`.
pub fn next_daily_occurrence(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = EngineConfig::default();
        assert!((cfg.screening.hurst_threshold - 0.5).abs() < f64::EPSILON);
        assert!((cfg.screening.vr_threshold - 1.0).abs() < f64::EPSILON);
        assert!((cfg.screening.p_value_threshold - 0.10).abs() < f64::EPSILON);
        assert_eq!(cfg.indicators.adx_period, 14);
        assert_eq!(cfg.indicators.bb_window, 20);
        assert!((cfg.indicators.bb_k - 2.0).abs() < f64::EPSILON);
        assert!((cfg.signal.adx_threshold - 25.0).abs() < f64::EPSILON);
        assert_eq!(cfg.signal.strategy, "mr_v1");
        assert_eq!(cfg.window_capacity, 120);
        assert_eq!(cfg.warmup_bars(), 20);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.indicators.adx_period, 14);
        assert_eq!(cfg.screening.max_watchlist, 50);
        assert_eq!(cfg.daily_reset_utc.as_deref(), Some("13:30"));
        assert!(cfg.symbols.is_empty());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "indicators": { "adx_period": 10 }, "symbols": ["AAPL"] }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.indicators.adx_period, 10);
        assert_eq!(cfg.indicators.bb_window, 20);
        assert_eq!(cfg.symbols, vec!["AAPL"]);
        assert!((cfg.signal.adx_threshold - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validation_rejects_degenerate_periods() {
        let mut cfg = EngineConfig::default();
        cfg.indicators.adx_period = 1;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.indicators.bb_window = 1;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.indicators.bb_k = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.screening.p_value_threshold = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn daily_reset_parsing() {
        let mut cfg = EngineConfig::default();
        assert_eq!(
            cfg.daily_reset_time().unwrap(),
            NaiveTime::from_hms_opt(13, 30, 0)
        );
        cfg.daily_reset_utc = None;
        assert_eq!(cfg.daily_reset_time().unwrap(), None);
        cfg.daily_reset_utc = Some("25:99".into());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("reversion-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine_config.json");

        let mut cfg = EngineConfig::default();
        cfg.signal.adx_threshold = 20.0;
        cfg.symbols = vec!["KO".into(), "PEP".into()];
        cfg.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert!((loaded.signal.adx_threshold - 20.0).abs() < f64::EPSILON);
        assert_eq!(loaded.symbols, vec!["KO", "PEP"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn next_reset_rolls_over_midnight() {
        let at = NaiveTime::from_hms_opt(13, 30, 0).unwrap();
        let morning = DateTime::from_timestamp(1_700_000_000, 0).unwrap(); // 22:13 UTC
        let next = next_daily_occurrence(morning, at);
        assert_eq!(next.time(), at);
        assert_eq!(next.date_naive(), morning.date_naive().succ_opt().unwrap());

        let exactly = next;
        assert_eq!(next_daily_occurrence(exactly, at), exactly + Duration::days(1));

        let before = exactly - Duration::minutes(5);
        assert_eq!(next_daily_occurrence(before, at), exactly);
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(EngineConfig::load("/definitely/not/here.json").is_err());
    }
}
