//! The active round.

use rust_decimal::Decimal;

use super::betbook::BetBook;
use super::selector::Outcome;
use crate::types::{CompetitorId, Phase};

/// Mutable per-round state. Exactly one exists at a time; it is recycled in
/// place at the start of every betting phase.
#[derive(Debug, Clone)]
pub struct Round {
    number: u64,
    phase: Phase,
    bets: BetBook,
    luck_factor: Option<f64>,
    outcome: Option<Outcome>,
    betting_countdown: u32,
    next_round_countdown: u32,
}

impl Round {
    pub fn new(number: u64, betting_secs: u32) -> Self {
        Self {
            number,
            phase: Phase::Betting,
            bets: BetBook::new(),
            luck_factor: None,
            outcome: None,
            betting_countdown: betting_secs,
            next_round_countdown: 0,
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bets(&self) -> &BetBook {
        &self.bets
    }

    pub fn total_wagered(&self) -> Decimal {
        self.bets.total_wagered()
    }

    /// Winner, once the draw has settled. Consumers read it from the
    /// snapshot, which withholds it until `Resolved`.
    pub(crate) fn winner_id(&self) -> Option<CompetitorId> {
        self.outcome.map(|o| o.winner_id)
    }

    pub(crate) fn multiplier(&self) -> Option<u32> {
        self.outcome.map(|o| o.multiplier)
    }

    pub(crate) fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn betting_countdown(&self) -> u32 {
        self.betting_countdown
    }

    pub fn next_round_countdown(&self) -> u32 {
        self.next_round_countdown
    }

    /// Seconds left in whichever countdown the current phase runs.
    pub fn countdown(&self) -> u32 {
        match self.phase {
            Phase::Betting => self.betting_countdown,
            Phase::Drawing => 0,
            Phase::Resolved => self.next_round_countdown,
        }
    }

    /// Hidden from the player; only the engine reads it.
    pub(crate) fn luck_factor(&self) -> Option<f64> {
        self.luck_factor
    }

    pub(crate) fn bets_mut(&mut self) -> &mut BetBook {
        &mut self.bets
    }

    pub(crate) fn begin_drawing(&mut self, luck_factor: f64) {
        self.phase = Phase::Drawing;
        self.luck_factor = Some(luck_factor);
    }

    pub(crate) fn settle(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }

    pub(crate) fn begin_resolved(&mut self, countdown_secs: u32) {
        self.phase = Phase::Resolved;
        self.next_round_countdown = countdown_secs;
    }

    /// Count one second off the active countdown, returning what is left.
    pub(crate) fn tick(&mut self) -> u32 {
        let counter = match self.phase {
            Phase::Betting => &mut self.betting_countdown,
            Phase::Resolved => &mut self.next_round_countdown,
            Phase::Drawing => return 0,
        };
        *counter = counter.saturating_sub(1);
        *counter
    }

    /// Recycle for the next round: bets cleared without refund, draw state
    /// dropped, phase back to betting.
    pub(crate) fn begin_next(&mut self, betting_secs: u32) {
        self.bets.reset();
        self.number += 1;
        self.phase = Phase::Betting;
        self.luck_factor = None;
        self.outcome = None;
        self.betting_countdown = betting_secs;
        self.next_round_countdown = 0;
    }
}
