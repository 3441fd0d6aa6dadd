//! Round state machine — Betting → Drawing → Resolved → Betting.
//!
//! The engine owns a virtual-time [`Scheduler`] and is advanced by its
//! driver through [`RaceEngine::advance`]. Every phase entry cancels all
//! pending timers before arming its own, so no timer from a previous phase
//! can fire into the next one. Commands are plain method calls on the same
//! timeline; rejections come back as [`EngineError`] and never disturb the
//! clock.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::history::RecentResultsLog;
use super::ledger::Ledger;
use super::payout::{PayoutCalculator, RoundReport};
use super::random::RandomSource;
use super::round::Round;
use super::scheduler::{Scheduler, TimerId};
use super::selector::{Outcome, OutcomeSelector};
use crate::types::{ensure_positive, CompetitorId, EngineError, EngineEvent, Phase, Roster};

/// Stake used for quick bets until the player picks another.
pub const DEFAULT_STAKE: Decimal = dec!(50);

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

/// Phase durations. Countdowns are in ticks of `tick_ms`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoundTimings {
    pub betting_secs: u32,
    pub resolved_secs: u32,
    pub tick_ms: u64,
    pub draw_duration_ms: u64,
    pub settle_delay_ms: u64,
    pub highlight_interval_ms: u64,
}

impl Default for RoundTimings {
    fn default() -> Self {
        Self {
            betting_secs: 30,
            resolved_secs: 5,
            tick_ms: 1000,
            draw_duration_ms: 2500,
            settle_delay_ms: 300,
            highlight_interval_ms: 100,
        }
    }
}

impl RoundTimings {
    fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    fn draw_duration(&self) -> Duration {
        Duration::from_millis(self.draw_duration_ms)
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    fn highlight_interval(&self) -> Duration {
        Duration::from_millis(self.highlight_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    BettingTick,
    Highlight,
    Settle,
    Resolve,
    ResolvedTick,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct BetEntry {
    pub competitor_id: CompetitorId,
    pub amount: Decimal,
}

/// Read-only view of the engine for consumers.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub round_number: u64,
    pub phase: Phase,
    pub countdown_secs: u32,
    pub balance: Decimal,
    pub stake: Decimal,
    pub total_wagered: Decimal,
    pub bets: Vec<BetEntry>,
    pub winner_id: Option<CompetitorId>,
    pub multiplier: Option<u32>,
    pub recent_results: Vec<String>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct RaceEngine<R> {
    timings: RoundTimings,
    roster: Roster,
    ledger: Ledger,
    round: Round,
    history: RecentResultsLog,
    scheduler: Scheduler<TimerKind>,
    rng: R,
    stake: Decimal,
    highlight_index: usize,
    highlight_timer: Option<TimerId>,
    last_report: Option<RoundReport>,
    events: Vec<EngineEvent>,
}

impl<R: RandomSource> RaceEngine<R> {
    /// Create an engine and open betting on round 1.
    pub fn new(timings: RoundTimings, roster: Roster, opening_balance: Decimal, rng: R) -> Self {
        let round = Round::new(1, timings.betting_secs);
        let mut engine = Self {
            timings,
            roster,
            ledger: Ledger::new(opening_balance),
            round,
            history: RecentResultsLog::new(),
            scheduler: Scheduler::new(),
            rng,
            stake: DEFAULT_STAKE,
            highlight_index: 0,
            highlight_timer: None,
            last_report: None,
            events: Vec::new(),
        };
        engine.open_betting();
        engine
    }

    // -- Clock ------------------------------------------------------------

    /// Move virtual time forward, firing every timer that falls due.
    pub fn advance(&mut self, elapsed: Duration) {
        let deadline = self.scheduler.now().saturating_add(elapsed);
        while let Some(kind) = self.scheduler.pop_due(deadline) {
            self.on_timer(kind);
        }
        self.scheduler.advance_clock(deadline);
    }

    fn on_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::BettingTick => {
                let remaining = self.round.tick();
                self.emit(EngineEvent::CountdownTick {
                    phase: Phase::Betting,
                    remaining_secs: remaining,
                });
                if remaining == 0 {
                    self.enter_drawing();
                }
            }
            TimerKind::Highlight => {
                if let Some(c) = self.roster.at(self.highlight_index) {
                    let competitor_id = c.id;
                    debug!(competitor_id, "Highlight");
                    self.emit(EngineEvent::HighlightTick { competitor_id });
                }
                self.highlight_index = (self.highlight_index + 1) % self.roster.len();
            }
            TimerKind::Settle => self.settle(),
            TimerKind::Resolve => self.enter_resolved(),
            TimerKind::ResolvedTick => {
                let remaining = self.round.tick();
                self.emit(EngineEvent::CountdownTick {
                    phase: Phase::Resolved,
                    remaining_secs: remaining,
                });
                if remaining == 0 {
                    self.start_next_round();
                }
            }
        }
    }

    // -- Phase transitions -----------------------------------------------

    fn open_betting(&mut self) {
        self.scheduler.cancel_all();
        self.highlight_timer = None;
        self.last_report = None;

        info!(
            round = self.round.number(),
            countdown_secs = self.timings.betting_secs,
            balance = %self.ledger.balance(),
            "Betting open"
        );
        self.emit(EngineEvent::PhaseChanged {
            phase: Phase::Betting,
            countdown_secs: self.round.betting_countdown(),
        });
        self.scheduler.every(self.timings.tick(), TimerKind::BettingTick);
    }

    fn start_next_round(&mut self) {
        self.round.begin_next(self.timings.betting_secs);
        self.open_betting();
    }

    fn enter_drawing(&mut self) {
        self.scheduler.cancel_all();

        let luck = self.rng.next_unit() * 2.0 - 1.0;
        self.round.begin_drawing(luck);
        self.highlight_index = 0;

        info!(
            round = self.round.number(),
            wagered = %self.round.total_wagered(),
            "Betting closed, drawing"
        );
        self.emit(EngineEvent::PhaseChanged {
            phase: Phase::Drawing,
            countdown_secs: 0,
        });

        self.highlight_timer = Some(
            self.scheduler
                .every(self.timings.highlight_interval(), TimerKind::Highlight),
        );
        self.scheduler
            .once(self.timings.draw_duration(), TimerKind::Settle);
    }

    fn draw_outcome(&mut self) -> Outcome {
        let luck = self.round.luck_factor().unwrap_or(0.0);
        let outcome = OutcomeSelector::select(&self.roster, luck, &mut self.rng);
        self.round.settle(outcome);
        outcome
    }

    fn settle(&mut self) {
        let outcome = self.draw_outcome();
        if let Some(id) = self.highlight_timer.take() {
            self.scheduler.cancel(id);
        }

        debug!(round = self.round.number(), winner_id = outcome.winner_id, "Winner settled");
        self.emit(EngineEvent::WinnerSettled {
            winner_id: outcome.winner_id,
        });
        self.scheduler
            .once(self.timings.settle_delay(), TimerKind::Resolve);
    }

    fn enter_resolved(&mut self) {
        self.scheduler.cancel_all();
        self.highlight_timer = None;

        let outcome = match self.round.outcome() {
            Some(o) => o,
            None => self.draw_outcome(),
        };
        let winner = self
            .roster
            .get(outcome.winner_id)
            .unwrap_or_else(|| self.roster.last())
            .clone();

        let winnings = match PayoutCalculator::settle(
            self.round.bets(),
            &winner,
            outcome.multiplier,
            &mut self.ledger,
        ) {
            Ok(w) => w,
            Err(e) => {
                warn!(error = %e, winner_id = winner.id, "Payout failed");
                Decimal::ZERO
            }
        };

        self.round.begin_resolved(self.timings.resolved_secs);
        self.history.record(&winner.tag);

        let report = RoundReport::new(
            self.round.number(),
            &winner,
            outcome,
            self.round.bets(),
            winnings,
            self.ledger.balance(),
        );
        info!(
            round = report.round_number,
            winner = %winner,
            multiplier = outcome.multiplier,
            wagered = %report.total_wagered,
            winnings = %winnings,
            balance = %report.balance_after,
            "{}",
            report.message()
        );

        self.emit(EngineEvent::PhaseChanged {
            phase: Phase::Resolved,
            countdown_secs: self.round.next_round_countdown(),
        });
        self.emit(EngineEvent::RoundResolved {
            winner_id: winner.id,
            multiplier: outcome.multiplier,
            winnings,
            new_balance: self.ledger.balance(),
        });
        if !winnings.is_zero() {
            self.emit(EngineEvent::BalanceChanged {
                new_balance: self.ledger.balance(),
            });
        }

        self.last_report = Some(report);
        self.scheduler.every(self.timings.tick(), TimerKind::ResolvedTick);
    }

    // -- Commands ---------------------------------------------------------

    /// Wager `amount` on a competitor. Returns the new total on it.
    pub fn place_wager(
        &mut self,
        competitor_id: CompetitorId,
        amount: Decimal,
    ) -> Result<Decimal, EngineError> {
        let phase = self.round.phase();
        let result = self.round.bets_mut().place_wager(
            phase,
            &self.roster,
            &mut self.ledger,
            competitor_id,
            amount,
        );

        match result {
            Ok(new_total) => {
                info!(
                    competitor_id,
                    amount = %amount,
                    total = %new_total,
                    balance = %self.ledger.balance(),
                    "Wager placed"
                );
                self.emit(EngineEvent::WagerUpdated {
                    competitor_id,
                    new_total,
                });
                self.emit(EngineEvent::BalanceChanged {
                    new_balance: self.ledger.balance(),
                });
                Ok(new_total)
            }
            Err(e) => {
                warn!(competitor_id, amount = %amount, error = %e, "Wager rejected");
                Err(e)
            }
        }
    }

    /// Wager the current stake on a competitor.
    pub fn place_stake(&mut self, competitor_id: CompetitorId) -> Result<Decimal, EngineError> {
        self.place_wager(competitor_id, self.stake)
    }

    /// Choose the stake used by [`RaceEngine::place_stake`].
    pub fn select_stake(&mut self, amount: Decimal) -> Result<(), EngineError> {
        if let Err(e) = self
            .ensure_not_drawing("change the stake")
            .and_then(|_| ensure_positive(amount))
        {
            warn!(amount = %amount, error = %e, "Stake rejected");
            return Err(e);
        }
        self.stake = amount;
        debug!(stake = %amount, "Stake selected");
        Ok(())
    }

    /// Credit funds to the ledger. Rejected while the draw is running.
    pub fn request_top_up(&mut self, amount: Decimal) -> Result<Decimal, EngineError> {
        let credited = self
            .ensure_not_drawing("top up")
            .and_then(|_| ensure_positive(amount))
            .and_then(|_| self.ledger.credit(amount));
        match credited {
            Ok(balance) => {
                info!(amount = %amount, balance = %balance, "Top-up credited");
                self.emit(EngineEvent::BalanceChanged {
                    new_balance: balance,
                });
                Ok(balance)
            }
            Err(e) => {
                warn!(amount = %amount, error = %e, "Top-up rejected");
                Err(e)
            }
        }
    }

    fn ensure_not_drawing(&self, action: &'static str) -> Result<(), EngineError> {
        match self.round.phase() {
            Phase::Drawing => Err(EngineError::InvalidPhaseForAction {
                action,
                phase: Phase::Drawing,
            }),
            _ => Ok(()),
        }
    }

    /// Skip the rest of the resolved countdown.
    pub fn force_play_again(&mut self) -> Result<(), EngineError> {
        let phase = self.round.phase();
        if phase != Phase::Resolved {
            let e = EngineError::InvalidPhaseForAction {
                action: "start the next round",
                phase,
            };
            warn!(error = %e, "Play again rejected");
            return Err(e);
        }
        info!(round = self.round.number(), "Play again requested");
        self.start_next_round();
        Ok(())
    }

    // -- Queries ----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.round.phase()
    }

    pub fn countdown(&self) -> u32 {
        self.round.countdown()
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn balance(&self) -> Decimal {
        self.ledger.balance()
    }

    pub fn stake(&self) -> Decimal {
        self.stake
    }

    pub fn recent_results(&self) -> &RecentResultsLog {
        &self.history
    }

    /// Report for the round just resolved; `None` outside `Resolved`.
    pub fn last_report(&self) -> Option<&RoundReport> {
        self.last_report.as_ref()
    }

    /// Virtual time since the engine started.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let resolved = self.round.phase() == Phase::Resolved;
        EngineSnapshot {
            round_number: self.round.number(),
            phase: self.round.phase(),
            countdown_secs: self.round.countdown(),
            balance: self.ledger.balance(),
            stake: self.stake,
            total_wagered: self.round.total_wagered(),
            bets: self
                .round
                .bets()
                .entries()
                .map(|(competitor_id, amount)| BetEntry {
                    competitor_id,
                    amount,
                })
                .collect(),
            winner_id: self.round.winner_id().filter(|_| resolved),
            multiplier: self.round.multiplier().filter(|_| resolved),
            recent_results: self.history.to_vec(),
        }
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
