//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Every field is optional: a run configured purely through prompts needs no
//! file at all, and `FORMPROBE_`-prefixed environment variables can override
//! any value (`FORMPROBE_WEBDRIVER__ENDPOINT`, `FORMPROBE_TIMING__POLL_INTERVAL_MS`,
//! ...). `${VAR}` placeholders inside string values are expanded before
//! deserialization.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level configuration for a probe run.
#[derive(Debug, Default, Deserialize)]
pub struct ProbeConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Where to find the WebDriver service and how to launch the browser.
#[derive(Debug, Deserialize)]
pub struct WebDriverConfig {
    #[serde(default = "default_webdriver_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub headless: bool,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_webdriver_endpoint(),
            headless: false,
        }
    }
}

fn default_webdriver_endpoint() -> String {
    "http://localhost:9515".into()
}

/// Optional overrides for the engine's resolve timeouts and settle delays.
///
/// Values are `None` when unset so the engine's built-in defaults apply;
/// the file only needs to name the knobs it wants to move.
#[derive(Debug, Default, Deserialize)]
pub struct TimingConfig {
    /// Bounded-wait ceiling for the credential field, in seconds.
    #[serde(default)]
    pub credential_timeout_secs: Option<u64>,
    /// Bounded-wait ceiling for the candidate field, in seconds.
    #[serde(default)]
    pub candidate_timeout_secs: Option<u64>,
    /// Shorter ceiling used for the retry after a page refresh, in seconds.
    #[serde(default)]
    pub retry_timeout_secs: Option<u64>,
    /// Interval between presence polls inside a bounded wait, in milliseconds.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    /// Settle delay after navigation, in milliseconds.
    #[serde(default)]
    pub navigation_settle_ms: Option<u64>,
    /// Settle delay after a recovery refresh, in milliseconds.
    #[serde(default)]
    pub refresh_settle_ms: Option<u64>,
    /// Settle delay between typing a candidate and submitting it, in milliseconds.
    #[serde(default)]
    pub injection_settle_ms: Option<u64>,
    /// Settle delay after each candidate before the next resolve, in milliseconds.
    #[serde(default)]
    pub candidate_settle_ms: Option<u64>,
}

fn expand_env_str(s: &mut String) {
    if !s.contains('$') {
        return;
    }
    let mut cur = std::mem::take(s);
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
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

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => expand_env_str(s),
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ProbeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ProbeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeConfigLoader {
    /// Start with sensible defaults: `FORMPROBE_` env overrides only.
    ///
    /// ```
    /// use formprobe_config::ProbeConfigLoader;
    ///
    /// let config = ProbeConfigLoader::new().load().expect("valid config");
    /// assert_eq!(config.webdriver.endpoint, "http://localhost:9515");
    /// assert!(config.timing.candidate_timeout_secs.is_none());
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("FORMPROBE").separator("__"));
        Self { builder }
    }

    /// Attach a config file; missing files are tolerated so a bare checkout
    /// runs on defaults.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use formprobe_config::ProbeConfigLoader;
    ///
    /// let cfg = ProbeConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// webdriver:
    ///   endpoint: "http://localhost:4444"
    ///   headless: true
    /// timing:
    ///   candidate_timeout_secs: 5
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(cfg.webdriver.headless);
    /// assert_eq!(cfg.timing.candidate_timeout_secs, Some(5));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config, expanding `${VAR}` placeholders first.
    pub fn load(self) -> Result<ProbeConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: ProbeConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
