//! Payout calculator and round reporting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use super::betbook::BetBook;
use super::ledger::Ledger;
use super::selector::Outcome;
use crate::types::{Competitor, EngineError};

pub struct PayoutCalculator;

impl PayoutCalculator {
    /// `bet_on_winner * odds * multiplier`, credited to the ledger when
    /// non-zero. Returns the winnings, which may be zero.
    pub fn settle(
        bets: &BetBook,
        winner: &Competitor,
        multiplier: u32,
        ledger: &mut Ledger,
    ) -> Result<Decimal, EngineError> {
        let bet_on_winner = bets.bet_on(winner.id);
        if bet_on_winner.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let winnings = Self::winnings(bet_on_winner, winner.odds, multiplier)?;
        ledger.credit(winnings)?;

        info!(
            winner_id = winner.id,
            stake = %bet_on_winner,
            odds = %winner.odds,
            multiplier,
            winnings = %winnings,
            balance = %ledger.balance(),
            "Payout credited"
        );

        Ok(winnings)
    }

    /// Fails instead of overflowing when the product leaves `Decimal` range.
    pub fn winnings(
        stake: Decimal,
        odds: Decimal,
        multiplier: u32,
    ) -> Result<Decimal, EngineError> {
        stake
            .checked_mul(odds)
            .and_then(|w| w.checked_mul(Decimal::from(multiplier)))
            .ok_or_else(|| {
                EngineError::InvalidAmount(format!(
                    "payout of {stake} at {odds} x{multiplier} is out of range"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Round report
// ---------------------------------------------------------------------------

/// How the round went from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    NoBets,
    Lost { wagered: Decimal },
    Won { winnings: Decimal, multiplier: u32 },
}

/// Everything a consumer needs to present a finished round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    pub round_number: u64,
    pub winner_id: u32,
    pub winner_name: String,
    pub winner_tag: String,
    pub multiplier: u32,
    pub total_wagered: Decimal,
    pub bet_on_winner: Decimal,
    pub winnings: Decimal,
    pub balance_after: Decimal,
    pub outcome: RoundOutcome,
    pub resolved_at: DateTime<Utc>,
}

impl RoundReport {
    pub fn new(
        round_number: u64,
        winner: &Competitor,
        outcome: Outcome,
        bets: &BetBook,
        winnings: Decimal,
        balance_after: Decimal,
    ) -> Self {
        let total_wagered = bets.total_wagered();
        let round_outcome = if total_wagered.is_zero() {
            RoundOutcome::NoBets
        } else if winnings.is_zero() {
            RoundOutcome::Lost {
                wagered: total_wagered,
            }
        } else {
            RoundOutcome::Won {
                winnings,
                multiplier: outcome.multiplier,
            }
        };

        Self {
            round_number,
            winner_id: winner.id,
            winner_name: winner.name.clone(),
            winner_tag: winner.tag.clone(),
            multiplier: outcome.multiplier,
            total_wagered,
            bet_on_winner: bets.bet_on(winner.id),
            winnings,
            balance_after,
            outcome: round_outcome,
            resolved_at: Utc::now(),
        }
    }

    /// Short player-facing summary.
    pub fn message(&self) -> String {
        let winner = format!("{} {}", self.winner_tag, self.winner_name);
        match self.outcome {
            RoundOutcome::NoBets => {
                format!("{winner} wins! You didn't bet this round.")
            }
            RoundOutcome::Lost { wagered } => {
                format!("{winner} wins. You lost {wagered}.")
            }
            RoundOutcome::Won {
                winnings,
                multiplier,
            } if multiplier > 1 => {
                format!("{winner} wins! BONUS x{multiplier}! You won {winnings}!")
            }
            RoundOutcome::Won { winnings, .. } => {
                format!("{winner} wins! You won {winnings}!")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
