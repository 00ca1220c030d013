//! # Central Configuration Module
//!
//! Defines the configuration structure for the operator console. It uses
//! `serde` to deserialize a `config.toml` file into a strongly-typed
//! `Config` struct, falling back to sensible defaults for every
//! parameter so the console can start with a minimal or even missing
//! config file.
//!
//! The EIP-712 signing domain is deliberately *not* configurable: it is
//! a fixed contract shared with the verifying backend (see `wallet`).

use serde::Deserialize;
use std::fs;
use tracing::warn;

/// The main configuration structure for the console.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the airdrop backend. All endpoints are relative to it
    /// and share one cookie-carrying HTTP client.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path to the hex-encoded private key the wallet unlocks on
    /// `connect`.
    #[serde(default = "default_private_key_path")]
    pub private_key_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            private_key_path: default_private_key_path(),
        }
    }
}

impl Config {
    /// Loads configuration from `config.toml`.
    /// If the file doesn't exist or fails to parse, it returns a default
    /// configuration.
    pub fn load() -> Self {
        match fs::read_to_string("config.toml") {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse config.toml: {}. Using default values.", e);
                    Config::default()
                }
            },
            Err(_) => {
                warn!("config.toml not found. Using default values.");
                Config::default()
            }
        }
    }
}

// --- Default value functions for serde ---

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_private_key_path() -> String {
    "wallet.key".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: Config = toml::from_str("api_base_url = \"https://airdrop.example\"")
            .expect("partial config should parse");
        assert_eq!(config.api_base_url, "https://airdrop.example");
        assert_eq!(config.private_key_path, default_private_key_path());
    }

    #[test]
    fn empty_config_parses_to_defaults() {
        let config: Config = toml::from_str("").expect("empty config should parse");
        assert_eq!(config.api_base_url, default_api_base_url());
    }
}
