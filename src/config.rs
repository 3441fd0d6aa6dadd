//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section falls back to built-in defaults, so an empty file yields
//! a playable setup with the standard six-runner roster.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;

use crate::engine::RoundTimings;
use crate::types::{Competitor, Roster};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub engine: RoundTimings,
    /// Race card. Empty means the built-in roster.
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: String,
    pub initial_balance: Decimal,
    pub default_stake: Decimal,
    pub currency: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "Guest".to_string(),
            initial_balance: dec!(10000),
            default_stake: dec!(50),
            currency: "credits".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Validated roster for this configuration.
    pub fn roster(&self) -> Result<Roster> {
        if self.competitors.is_empty() {
            return Ok(Roster::standard());
        }
        Roster::new(self.competitors.clone()).context("Invalid competitor roster")
    }
}
