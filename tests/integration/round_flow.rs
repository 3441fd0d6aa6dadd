//! Phase sequencing and timer behaviour over whole rounds.

use paddock::engine::history::RECENT_RESULTS_CAPACITY;
use paddock::types::{EngineError, EngineEvent, Phase, Roster};
use rust_decimal_macros::dec;
use std::time::Duration;

use super::*;

fn phase_changes(events: &[EngineEvent]) -> Vec<(Phase, u32)> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::PhaseChanged {
                phase,
                countdown_secs,
            } => Some((*phase, *countdown_secs)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_event_sequence_for_one_round() {
    let mut engine = engine_with(two_runner_roster(), dec!(100), vec![0.5, 0.9, 0.99]);
    engine.place_wager(2, dec!(10)).unwrap();

    play_round(&mut engine);
    engine.advance(RESOLVED);

    let events = engine.drain_events();
    assert_eq!(
        phase_changes(&events),
        vec![
            (Phase::Betting, 30),
            (Phase::Drawing, 0),
            (Phase::Resolved, 5),
            (Phase::Betting, 30),
        ]
    );

    let settled = events
        .iter()
        .position(|e| matches!(e, EngineEvent::WinnerSettled { winner_id: 2 }))
        .unwrap();
    let resolved = events
        .iter()
        .position(|e| {
            matches!(
                e,
                EngineEvent::RoundResolved {
                    winner_id: 2,
                    multiplier: 1,
                    ..
                }
            )
        })
        .unwrap();
    assert!(settled < resolved);

    // No highlight after the winner has settled.
    assert!(events[settled..]
        .iter()
        .all(|e| !matches!(e, EngineEvent::HighlightTick { .. })));

    match &events[resolved] {
        EngineEvent::RoundResolved {
            winnings,
            new_balance,
            ..
        } => {
            assert_eq!(*winnings, dec!(50));
            assert_eq!(*new_balance, dec!(140));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_many_rounds_run_back_to_back() {
    let samples = vec![0.12, 0.57, 0.33, 0.91, 0.05];
    let mut engine = engine_with(Roster::standard(), dec!(100), samples);
    let round_length = BETTING + DRAW_AND_SETTLE + RESOLVED;

    for _ in 0..12 {
        engine.advance(round_length);
    }

    assert_eq!(engine.round().number(), 13);
    assert_eq!(engine.phase(), Phase::Betting);
    assert_eq!(engine.recent_results().len(), RECENT_RESULTS_CAPACITY);
    assert_eq!(engine.balance(), dec!(100));
    assert_eq!(engine.pending_timers(), 1);
}

#[test]
fn test_one_large_advance_equals_many_small_ones() {
    let samples = vec![0.21, 0.68, 0.4, 0.77, 0.02, 0.95];
    let mut coarse = engine_with(Roster::standard(), dec!(500), samples.clone());
    let mut fine = engine_with(Roster::standard(), dec!(500), samples);
    coarse.place_wager(3, dec!(20)).unwrap();
    fine.place_wager(3, dec!(20)).unwrap();

    coarse.advance(Duration::from_secs(80));
    for _ in 0..1600 {
        fine.advance(Duration::from_millis(50));
    }

    assert_eq!(coarse.drain_events(), fine.drain_events());
    assert_eq!(coarse.round().number(), fine.round().number());
    assert_eq!(coarse.balance(), fine.balance());
    assert_eq!(coarse.now(), fine.now());
}

#[test]
fn test_play_again_mid_countdown_no_duplicate_transition() {
    let mut engine = engine_with(Roster::standard(), dec!(100), vec![0.5]);
    play_round(&mut engine);
    engine.advance(Duration::from_secs(2));
    assert_eq!(engine.countdown(), 3);

    engine.force_play_again().unwrap();
    engine.drain_events();

    // Well past when the abandoned countdown would have expired.
    engine.advance(Duration::from_secs(29));
    let events = engine.drain_events();
    assert!(phase_changes(&events).is_empty());
    assert_eq!(engine.round().number(), 2);
    assert_eq!(engine.countdown(), 1);
    assert_eq!(engine.recent_results().len(), 1);

    engine.advance(Duration::from_secs(1));
    assert_eq!(phase_changes(&engine.drain_events()), vec![(Phase::Drawing, 0)]);
}

#[test]
fn test_play_again_twice_is_rejected() {
    let mut engine = engine_with(Roster::standard(), dec!(100), vec![0.5]);
    play_round(&mut engine);
    engine.force_play_again().unwrap();
    assert!(matches!(
        engine.force_play_again(),
        Err(EngineError::InvalidPhaseForAction {
            phase: Phase::Betting,
            ..
        })
    ));
    assert_eq!(engine.round().number(), 2);
}

#[test]
fn test_wagers_only_during_betting() {
    let mut engine = engine_with(Roster::standard(), dec!(100), vec![0.5]);
    engine.advance(Duration::from_secs(29));
    assert!(engine.place_wager(1, dec!(10)).is_ok());

    engine.advance(Duration::from_secs(1));
    assert_eq!(engine.phase(), Phase::Drawing);
    assert!(engine.place_wager(1, dec!(10)).is_err());

    engine.advance(DRAW_AND_SETTLE);
    assert_eq!(engine.phase(), Phase::Resolved);
    assert!(engine.place_wager(1, dec!(10)).is_err());

    engine.advance(RESOLVED);
    assert!(engine.place_wager(1, dec!(10)).is_ok());
    assert_eq!(engine.balance(), dec!(80));
}
