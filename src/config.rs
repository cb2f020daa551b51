//! # Configuration
//!
//! Deployment settings, read from `LCA_*` environment variables. Anything unset
//! falls back to the values the tomato model was built against.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LCA_IPC_HOST` | `localhost` |
//! | `LCA_IPC_PORT` | `8080` |
//! | `LCA_BIND_ADDR` | `0.0.0.0:8000` |
//! | `LCA_IMPACT_METHOD_ID` | `2f995579-06bd-4681-b07c-cee3b1805b0d` |
//! | `LCA_CALCULATION_AMOUNT` | `0.001` |
//! | `LCA_PRODUCT_SYSTEM` | `TOMATE` |
//! | `LCA_CALL_TIMEOUT_SECS` | `30` |
//! | `LCA_CALCULATION_TIMEOUT_SECS` | `120` |
//! | `LCA_POLL_INTERVAL_MS` | `250` |

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::assessment::AssessmentSettings;

pub const DEFAULT_IMPACT_METHOD_ID: &str = "2f995579-06bd-4681-b07c-cee3b1805b0d";
pub const DEFAULT_CALCULATION_AMOUNT: f64 = 0.001;
pub const DEFAULT_PRODUCT_SYSTEM: &str = "TOMATE";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {variable}: {reason}")]
    Invalid {
        variable: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LcaConfig {
    pub ipc_host: String,
    pub ipc_port: u16,
    pub bind_addr: String,
    pub impact_method_id: String,
    pub calculation_amount: f64,
    pub product_system: String,
    /// Upper bound for any single engine call.
    pub call_timeout: Duration,
    /// Upper bound for a calculation to become ready.
    pub calculation_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for LcaConfig {
    fn default() -> Self {
        Self {
            ipc_host: "localhost".to_string(),
            ipc_port: 8080,
            bind_addr: "0.0.0.0:8000".to_string(),
            impact_method_id: DEFAULT_IMPACT_METHOD_ID.to_string(),
            calculation_amount: DEFAULT_CALCULATION_AMOUNT,
            product_system: DEFAULT_PRODUCT_SYSTEM.to_string(),
            call_timeout: Duration::from_secs(30),
            calculation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl LcaConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|variable| env::var(variable).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            ipc_host: lookup("LCA_IPC_HOST").unwrap_or(defaults.ipc_host),
            ipc_port: parsed(&lookup, "LCA_IPC_PORT")?.unwrap_or(defaults.ipc_port),
            bind_addr: lookup("LCA_BIND_ADDR").unwrap_or(defaults.bind_addr),
            impact_method_id: lookup("LCA_IMPACT_METHOD_ID").unwrap_or(defaults.impact_method_id),
            calculation_amount: parsed(&lookup, "LCA_CALCULATION_AMOUNT")?
                .unwrap_or(defaults.calculation_amount),
            product_system: lookup("LCA_PRODUCT_SYSTEM").unwrap_or(defaults.product_system),
            call_timeout: parsed(&lookup, "LCA_CALL_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.call_timeout),
            calculation_timeout: parsed(&lookup, "LCA_CALCULATION_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.calculation_timeout),
            poll_interval: parsed(&lookup, "LCA_POLL_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        })
    }

    /// JSON-RPC endpoint of the engine.
    pub fn ipc_endpoint(&self) -> String {
        format!("http://{}:{}/", self.ipc_host, self.ipc_port)
    }

    pub fn assessment_settings(&self) -> AssessmentSettings {
        AssessmentSettings {
            impact_method_id: self.impact_method_id.clone(),
            calculation_amount: self.calculation_amount,
            product_system: self.product_system.clone(),
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, variable: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(variable) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                variable,
                reason: e.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| vars.get(k).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = LcaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, LcaConfig::default());
        assert_eq!(config.ipc_endpoint(), "http://localhost:8080/");
        assert_eq!(config.assessment_settings(), AssessmentSettings::default());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = LcaConfig::from_lookup(lookup(&[
            ("LCA_IPC_HOST", "olca"),
            ("LCA_IPC_PORT", "3000"),
            ("LCA_CALCULATION_AMOUNT", "1"),
            ("LCA_POLL_INTERVAL_MS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.ipc_endpoint(), "http://olca:3000/");
        assert_eq!(config.calculation_amount, 1.0);
        assert_eq!(config.poll_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_bad_value_names_the_variable() {
        let err = LcaConfig::from_lookup(lookup(&[("LCA_IPC_PORT", "eighty")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { variable: "LCA_IPC_PORT", ref value, .. } if value == "eighty"
        ));
    }
}
