//! Shared types for the PADDOCK engine.
//!
//! These types form the data model used across the engine, config and
//! binary. The roster is an immutable arena keyed by competitor id; every
//! other module refers to competitors only through `CompetitorId`.

use anyhow::{bail, Result};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Competitor identifier as it appears on the race card.
pub type CompetitorId = u32;

// ---------------------------------------------------------------------------
// Competitor & roster
// ---------------------------------------------------------------------------

/// A runner in the race. Created once at start-up and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
    /// Fixed decimal payout multiple (5.0 pays 5x the stake).
    pub odds: Decimal,
    /// Short display tag shown in the recent-results strip.
    pub tag: String,
}

impl fmt::Display for Competitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} {} ({}x)", self.tag, self.id, self.name, self.odds)
    }
}

impl Competitor {
    pub fn new(id: CompetitorId, name: &str, odds: Decimal, tag: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            odds,
            tag: tag.to_string(),
        }
    }

    /// Odds as a float, for weight computations.
    pub fn odds_f64(&self) -> f64 {
        self.odds.to_f64().unwrap_or(f64::NAN)
    }
}

/// The fixed field of competitors, in race-card order.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    competitors: Vec<Competitor>,
}

impl Roster {
    /// Build a roster, rejecting empty fields, duplicate ids and
    /// non-positive odds.
    pub fn new(competitors: Vec<Competitor>) -> Result<Self> {
        if competitors.is_empty() {
            bail!("Roster must contain at least one competitor");
        }

        let mut seen = HashSet::new();
        for c in &competitors {
            if !seen.insert(c.id) {
                bail!("Duplicate competitor id: {}", c.id);
            }
            let odds = c.odds_f64();
            if c.odds <= Decimal::ZERO || !odds.is_finite() {
                bail!("Competitor {} has invalid odds: {}", c.id, c.odds);
            }
        }

        Ok(Self { competitors })
    }

    /// The built-in six-runner field used when no roster is configured.
    pub fn standard() -> Self {
        Self {
            competitors: vec![
                Competitor::new(1, "Thunder Road", Decimal::new(20, 1), "🔴"),
                Competitor::new(2, "Silver Comet", Decimal::new(35, 1), "🔵"),
                Competitor::new(3, "Midnight Rye", Decimal::new(50, 1), "🟢"),
                Competitor::new(4, "Lucky Clover", Decimal::new(80, 1), "🟡"),
                Competitor::new(5, "Dusty Boots", Decimal::new(120, 1), "🟣"),
                Competitor::new(6, "Long Shot Larry", Decimal::new(200, 1), "⚫"),
            ],
        }
    }

    pub fn get(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CompetitorId) -> bool {
        self.get(id).is_some()
    }

    /// Competitor at a race-card position.
    pub fn at(&self, index: usize) -> Option<&Competitor> {
        self.competitors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.iter()
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    pub fn last(&self) -> &Competitor {
        // Non-empty by construction.
        &self.competitors[self.competitors.len() - 1]
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Round phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Betting,
    Drawing,
    Resolved,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Betting => write!(f, "Betting"),
            Phase::Drawing => write!(f, "Drawing"),
            Phase::Resolved => write!(f, "Resolved"),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Recoverable command rejections. None of these interrupt the round clock.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Cannot {action} during the {phase} phase")]
    InvalidPhaseForAction { action: &'static str, phase: Phase },

    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown competitor: {0}")]
    UnknownCompetitor(CompetitorId),
}

/// Convert a caller-supplied float into a strictly positive amount.
///
/// NaN and infinities have no `Decimal` representation and are rejected
/// along with zero and negative values; finite values beyond `Decimal`
/// are rejected as out of range.
pub fn amount_from_f64(value: f64) -> Result<Decimal, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::InvalidAmount(format!(
            "{value} is not a finite number"
        )));
    }
    let amount = Decimal::from_f64(value)
        .ok_or_else(|| EngineError::InvalidAmount(format!("{value} is out of range")))?;
    ensure_positive(amount)?;
    Ok(amount)
}

/// Reject zero and negative amounts.
pub fn ensure_positive(amount: Decimal) -> Result<(), EngineError> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::InvalidAmount(format!(
            "{amount} must be greater than zero"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Everything the engine reports to its consumer, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    PhaseChanged {
        phase: Phase,
        countdown_secs: u32,
    },
    CountdownTick {
        phase: Phase,
        remaining_secs: u32,
    },
    WagerUpdated {
        competitor_id: CompetitorId,
        new_total: Decimal,
    },
    /// Presentation only; has no bearing on the outcome.
    HighlightTick {
        competitor_id: CompetitorId,
    },
    WinnerSettled {
        winner_id: CompetitorId,
    },
    RoundResolved {
        winner_id: CompetitorId,
        multiplier: u32,
        winnings: Decimal,
        new_balance: Decimal,
    },
    BalanceChanged {
        new_balance: Decimal,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
