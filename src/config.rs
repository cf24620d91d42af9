//! Engine Configuration
//!
//! Timeout windows are per-deployment constants. They are read once at
//! startup and never change while games are live.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::warn;

/// Default reveal window (5 minutes).
pub const DEFAULT_REVEAL_TIMEOUT_SECS: u64 = 300;

/// Default lobby window (24 hours).
pub const DEFAULT_LOBBY_TIMEOUT_SECS: u64 = 86_400;

/// A timeout variable that is set but unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{key}={value:?} is not a whole number of seconds")]
pub struct ConfigError {
    /// Variable name.
    pub key: String,
    /// Raw value found.
    pub value: String,
}

/// Timeout windows, in seconds after a game's last action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window for the second reveal in the reveal flow.
    pub reveal_timeout_secs: u64,

    /// Window for someone to join before the creator can reclaim the stake.
    pub lobby_timeout_secs: u64,

    /// Window for a winner proof. `None` disables proof-flow timeouts.
    pub proof_timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reveal_timeout_secs: DEFAULT_REVEAL_TIMEOUT_SECS,
            lobby_timeout_secs: DEFAULT_LOBBY_TIMEOUT_SECS,
            proof_timeout_secs: None,
        }
    }
}

impl EngineConfig {
    /// Load from environment variables, falling back to defaults for unset ones.
    ///
    /// A variable that is set but not a number is an error, never a silent
    /// default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secs = |key: &str| -> Result<Option<u64>, ConfigError> {
            let Some(value) = lookup(key) else {
                return Ok(None);
            };
            value.trim().parse().map(Some).map_err(|_| {
                warn!(key, value = %value, "Invalid timeout setting");
                ConfigError { key: key.to_string(), value }
            })
        };

        let defaults = Self::default();
        Ok(Self {
            reveal_timeout_secs: secs("RPS_REVEAL_TIMEOUT_SECS")?
                .unwrap_or(defaults.reveal_timeout_secs),
            lobby_timeout_secs: secs("RPS_LOBBY_TIMEOUT_SECS")?
                .unwrap_or(defaults.lobby_timeout_secs),
            proof_timeout_secs: secs("RPS_PROOF_TIMEOUT_SECS")?
                .or(defaults.proof_timeout_secs),
        })
    }

    /// Set the reveal window.
    pub fn with_reveal_timeout(mut self, secs: u64) -> Self {
        self.reveal_timeout_secs = secs;
        self
    }

    /// Set the lobby window.
    pub fn with_lobby_timeout(mut self, secs: u64) -> Self {
        self.lobby_timeout_secs = secs;
        self
    }

    /// Enable proof-flow timeouts.
    pub fn with_proof_timeout(mut self, secs: u64) -> Self {
        self.proof_timeout_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.reveal_timeout_secs, 300);
        assert_eq!(config.lobby_timeout_secs, 86_400);
        assert_eq!(config.proof_timeout_secs, None);
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_from_env() {
        // Only this test touches this variable.
        std::env::set_var("RPS_REVEAL_TIMEOUT_SECS", "60");
        let config = EngineConfig::from_env().unwrap();
        std::env::remove_var("RPS_REVEAL_TIMEOUT_SECS");
        assert_eq!(config.reveal_timeout_secs, 60);
    }

    #[test]
    fn test_lookup_overrides_and_defaults() {
        let config = EngineConfig::from_lookup(vars(&[
            ("RPS_LOBBY_TIMEOUT_SECS", " 120 "),
            ("RPS_PROOF_TIMEOUT_SECS", "600"),
        ]))
        .unwrap();
        assert_eq!(config.reveal_timeout_secs, DEFAULT_REVEAL_TIMEOUT_SECS);
        assert_eq!(config.lobby_timeout_secs, 120);
        assert_eq!(config.proof_timeout_secs, Some(600));
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let err = EngineConfig::from_lookup(vars(&[
            ("RPS_REVEAL_TIMEOUT_SECS", "60"),
            ("RPS_LOBBY_TIMEOUT_SECS", "not-a-number"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError { key: "RPS_LOBBY_TIMEOUT_SECS".to_string(), value: "not-a-number".to_string() }
        );
        assert!(err.to_string().contains("RPS_LOBBY_TIMEOUT_SECS"));

        assert!(EngineConfig::from_lookup(vars(&[("RPS_PROOF_TIMEOUT_SECS", "-1")])).is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: EngineConfig = serde_json::from_str(r#"{"reveal_timeout_secs": 30}"#).unwrap();
        assert_eq!(config.reveal_timeout_secs, 30);
        assert_eq!(config.lobby_timeout_secs, DEFAULT_LOBBY_TIMEOUT_SECS);
    }
}
