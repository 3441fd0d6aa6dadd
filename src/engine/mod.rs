//! Round engine — ledger, bets, draw, payout and the phase state machine.

pub mod betbook;
pub mod history;
pub mod ledger;
pub mod machine;
pub mod payout;
pub mod random;
pub mod round;
pub mod scheduler;
pub mod selector;

pub use machine::{EngineSnapshot, RaceEngine, RoundTimings};
pub use random::{EntropyRandom, RandomSource, SequenceRandom};
