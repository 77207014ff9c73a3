use crate::Result;
use anyhow::anyhow;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

// TOML configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendConfig {
    #[serde(default = "default_trend_indicator")]
    pub indicator: String,
    #[serde(default = "default_trend_window_size")]
    pub window_size: u32,
}

#[derive(Debug, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_risk_temperature_threshold")]
    pub temperature_threshold: f64,
    #[serde(default = "default_risk_humidity_threshold")]
    pub humidity_threshold: f64,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_rust_log_format")]
    pub rust_log_format: String,
}

// Default values
fn default_dataset_path() -> String {
    "data/dataset.json".to_string()
}
fn default_trend_indicator() -> String {
    "ndvi".to_string()
}
fn default_trend_window_size() -> u32 {
    7
}
fn default_risk_temperature_threshold() -> f64 {
    25.0
}
fn default_risk_humidity_threshold() -> f64 {
    80.0
}
fn default_rust_log_format() -> String {
    "term".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            indicator: default_trend_indicator(),
            window_size: default_trend_window_size(),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            temperature_threshold: default_risk_temperature_threshold(),
            humidity_threshold: default_risk_humidity_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log_format: default_rust_log_format(),
        }
    }
}

static CONFIG: Lazy<Config> = Lazy::new(|| {
    load_config().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config files: {}. Using defaults.",
            e
        );
        Config::default()
    })
});

static CONFIG_STORE: Lazy<Arc<Mutex<HashMap<String, String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(HashMap::new())));

pub fn get(name: &str) -> Result<String> {
    // Priority 1: CONFIG_STORE (runtime overrides)
    if let Some(value) = get_from_store(name) {
        if value.is_empty() {
            return Err(anyhow!("{} is empty", name));
        }
        return Ok(value);
    }

    // Priority 2: Environment variables
    if let Ok(val) = std::env::var(name)
        && !val.is_empty()
    {
        return Ok(val);
    }

    // Priority 3: TOML config
    let toml_value = match name {
        "DATASET_PATH" => Some(CONFIG.data.dataset_path.clone()),
        "TREND_INDICATOR" => Some(CONFIG.trend.indicator.clone()),
        "TREND_WINDOW_SIZE" => Some(CONFIG.trend.window_size.to_string()),
        "RISK_TEMPERATURE_THRESHOLD" => Some(CONFIG.risk.temperature_threshold.to_string()),
        "RISK_HUMIDITY_THRESHOLD" => Some(CONFIG.risk.humidity_threshold.to_string()),
        "RUST_LOG_FORMAT" => Some(CONFIG.logging.rust_log_format.clone()),
        _ => None,
    };

    if let Some(value) = toml_value
        && !value.is_empty()
    {
        return Ok(value);
    }

    Err(anyhow!("Configuration key not found: {}", name))
}

/// 設定値を取得してパースする。未設定・パース失敗時は `default` を返す。
pub fn get_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    get(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// テスト用: 設定値を上書きする
///
/// 注: `#[cfg(test)]` にすると他クレート(analytics, cli)のテストから参照できないため
/// `#[doc(hidden)]` で公開している
#[doc(hidden)]
pub fn set(name: &str, value: &str) {
    if let Ok(mut store) = CONFIG_STORE.lock() {
        store.insert(name.to_string(), value.to_string());
    }
}

/// テスト用: 設定値を CONFIG_STORE から削除する
#[doc(hidden)]
pub fn remove(name: &str) {
    if let Ok(mut store) = CONFIG_STORE.lock() {
        store.remove(name);
    }
}

/// テスト用: CONFIG_STORE に値をセットし、Drop 時に自動で元に戻す RAII ガード。
///
/// テストが途中で panic しても確実にクリーンアップされる。
#[doc(hidden)]
pub struct ConfigGuard {
    key: String,
    previous: Option<String>,
}

impl ConfigGuard {
    pub fn new(key: &str, value: &str) -> Self {
        let previous = get_from_store(key);
        set(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for ConfigGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(prev) => set(&self.key, prev),
            None => remove(&self.key),
        }
    }
}

fn get_from_store(name: &str) -> Option<String> {
    if let Ok(store) = CONFIG_STORE.lock() {
        store.get(name).cloned()
    } else {
        None
    }
}

/// Load configuration from TOML files with priority:
/// 1. config/config.local.toml (git-ignored, for local overrides)
/// 2. config/config.toml (git-managed template)
/// 3. Default values
fn load_config() -> Result<Config> {
    let mut config = Config::default();

    let base_path = "config/config.toml";
    if Path::new(base_path).exists() {
        let content = fs::read_to_string(base_path)?;
        config = toml::from_str(&content)?;
    }

    let local_path = "config/config.local.toml";
    if Path::new(local_path).exists() {
        let content = fs::read_to_string(local_path)?;
        let local_config: Config = toml::from_str(&content)?;
        merge_config(&mut config, local_config);
    }

    Ok(config)
}

/// Merge local config into base config (local values override base values)
fn merge_config(base: &mut Config, local: Config) {
    // Data
    if local.data.dataset_path != default_dataset_path() {
        base.data.dataset_path = local.data.dataset_path;
    }

    // Trend
    if local.trend.indicator != default_trend_indicator() {
        base.trend.indicator = local.trend.indicator;
    }
    if local.trend.window_size != default_trend_window_size() {
        base.trend.window_size = local.trend.window_size;
    }

    // Risk
    if local.risk.temperature_threshold != default_risk_temperature_threshold() {
        base.risk.temperature_threshold = local.risk.temperature_threshold;
    }
    if local.risk.humidity_threshold != default_risk_humidity_threshold() {
        base.risk.humidity_threshold = local.risk.humidity_threshold;
    }

    // Logging
    if local.logging.rust_log_format != default_rust_log_format() {
        base.logging.rust_log_format = local.logging.rust_log_format;
    }
}

/// Get TOML-based configuration
pub fn config() -> &'static Config {
    &CONFIG
}
