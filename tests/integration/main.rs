//! Integration tests: full rounds driven through virtual time with a
//! deterministic random source.

mod round_flow;
mod scenarios;

use paddock::engine::{RaceEngine, RoundTimings, SequenceRandom};
use paddock::types::{Competitor, Roster};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

// Phase lengths at default timings.
pub const BETTING: Duration = Duration::from_secs(30);
pub const DRAW_AND_SETTLE: Duration = Duration::from_millis(2800);
pub const RESOLVED: Duration = Duration::from_secs(5);

/// Favourite at 2.0 and outsider at 5.0.
///
/// With zero luck the weights are 0.5 and 0.2 (total 0.7), so a winner
/// sample of 0.1 lands on the favourite and 0.9 on the outsider.
pub fn two_runner_roster() -> Roster {
    Roster::new(vec![
        Competitor::new(1, "Favourite", dec!(2.0), "F"),
        Competitor::new(2, "Outsider", dec!(5.0), "O"),
    ])
    .unwrap()
}

pub fn engine_with(
    roster: Roster,
    balance: Decimal,
    samples: Vec<f64>,
) -> RaceEngine<SequenceRandom> {
    RaceEngine::new(
        RoundTimings::default(),
        roster,
        balance,
        SequenceRandom::new(samples),
    )
}

/// Run from betting open to the resolved phase.
pub fn play_round(engine: &mut RaceEngine<SequenceRandom>) {
    engine.advance(BETTING);
    engine.advance(DRAW_AND_SETTLE);
}
