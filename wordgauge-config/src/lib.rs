//! Loader for harness configuration with YAML + environment overlays.
//!
//! A `wordgauge.yaml` file carries the target description, browser and gate
//! tuning, per-round click counts, and the pre-captured cookie set.
//! `WORDGAUGE__`-prefixed environment variables override any field, and
//! `${VAR}` placeholders inside string values are expanded recursively so
//! that session cookies never have to live in the file itself.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const MAX_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level harness configuration.
#[derive(Debug, Deserialize)]
pub struct GaugeConfig {
    pub target: TargetConfig,
    #[serde(default)]
    pub browser: BrowserSection,
    #[serde(default)]
    pub gate: GateSection,
    #[serde(default)]
    pub rounds: RoundsSection,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    /// Pre-captured cookie name/value pairs injected before navigation.
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
}

impl GaugeConfig {
    /// Cookie pairs in a stable order for injection.
    pub fn cookie_pairs(&self) -> Vec<(String, String)> {
        self.cookies
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// The one fixed site this harness drives.
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    pub url: String,
    /// Substring of the URL path that identifies the real test page.
    #[serde(default = "default_path_marker")]
    pub path_marker: String,
    /// Parent domain the cookie set belongs to.
    #[serde(default = "default_cookie_domain")]
    pub cookie_domain: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
    pub headless: bool,
    pub page_timeout_secs: u64,
    pub webdriver_url: String,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            headless: false,
            page_timeout_secs: 30,
            webdriver_url: "http://localhost:9515".to_string(),
        }
    }
}

/// Verification-gate tuning. The confirmation threshold (how many of the
/// four independent signals must pass) is deliberately configurable; the
/// default of 2 is an empirical choice, not a law.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GateSection {
    pub verify_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub confirm_threshold: usize,
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            verify_timeout_secs: 300,
            poll_interval_secs: 3,
            confirm_threshold: 2,
        }
    }
}

/// Requested "known word" click counts, one per round.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RoundsSection {
    pub first_clicks: usize,
    pub second_clicks: usize,
}

impl Default for RoundsSection {
    fn default() -> Self {
        Self {
            first_clicks: 5,
            second_clicks: 5,
        }
    }
}

impl RoundsSection {
    /// The fixed two-round plan.
    pub fn click_counts(&self) -> Vec<usize> {
        vec![self.first_clicks, self.second_clicks]
    }
}

fn default_results_dir() -> String {
    "results".to_string()
}

fn default_path_marker() -> String {
    "test-your-vocab".to_string()
}

fn default_cookie_domain() -> String {
    ".preply.com".to_string()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAX_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct GaugeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GaugeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GaugeConfigLoader {
    /// Start with sensible defaults: YAML file + `WORDGAUGE_` env overrides.
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("WORDGAUGE").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use wordgauge_config::GaugeConfigLoader;
    ///
    /// let cfg = GaugeConfigLoader::new()
    ///     .with_yaml_str("target:\n  url: https://example.com/test-your-vocab")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.rounds.click_counts(), vec![5, 5]);
    /// assert_eq!(cfg.gate.confirm_threshold, 2);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// Environment placeholders inside string values are expanded before
    /// materialising the strongly typed struct, so cookie values like
    /// `${PREPLY_CF_CLEARANCE}` resolve at load time.
    pub fn load(self) -> Result<GaugeConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Expand ${VAR} placeholders on the untyped tree first.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: GaugeConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
