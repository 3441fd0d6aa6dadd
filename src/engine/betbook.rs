//! BetBook — per-round wagers keyed by competitor.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use super::ledger::Ledger;
use crate::types::{ensure_positive, CompetitorId, EngineError, Phase, Roster};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BetBook {
    entries: BTreeMap<CompetitorId, Decimal>,
}

impl BetBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a wager for the current round.
    ///
    /// Checks run in order: phase, amount, competitor, affordability. The
    /// ledger is debited before the entry is touched, so a rejected wager
    /// leaves both unchanged. Repeat wagers on one competitor accumulate.
    /// Returns the new total staked on that competitor.
    pub fn place_wager(
        &mut self,
        phase: Phase,
        roster: &Roster,
        ledger: &mut Ledger,
        competitor_id: CompetitorId,
        amount: Decimal,
    ) -> Result<Decimal, EngineError> {
        if phase != Phase::Betting {
            return Err(EngineError::InvalidPhaseForAction {
                action: "place a wager",
                phase,
            });
        }
        ensure_positive(amount)?;
        if !roster.contains(competitor_id) {
            return Err(EngineError::UnknownCompetitor(competitor_id));
        }

        ledger.debit(amount)?;

        let total = self.entries.entry(competitor_id).or_insert(Decimal::ZERO);
        *total += amount;

        debug!(
            competitor_id,
            amount = %amount,
            total = %total,
            "Wager recorded"
        );

        Ok(*total)
    }

    /// Amount staked on a competitor (zero when none).
    pub fn bet_on(&self, competitor_id: CompetitorId) -> Decimal {
        self.entries
            .get(&competitor_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_wagered(&self) -> Decimal {
        self.entries.values().copied().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Non-zero entries in competitor-id order.
    pub fn entries(&self) -> impl Iterator<Item = (CompetitorId, Decimal)> + '_ {
        self.entries.iter().map(|(id, amount)| (*id, *amount))
    }

    /// Clear all entries. Stakes are consumed, not refunded.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
