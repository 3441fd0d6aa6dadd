//! Money scenarios: wagers, payouts and the ledger across rounds.

use paddock::engine::payout::RoundOutcome;
use paddock::types::{EngineError, EngineEvent, Phase, Roster};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

// luck sample 0.5 -> luck 0.0; winner sample; multiplier sample 0.99 -> x1
const OUTSIDER_WINS: [f64; 3] = [0.5, 0.9, 0.99];
const FAVOURITE_WINS: [f64; 3] = [0.5, 0.1, 0.99];

#[test]
fn test_win_at_five_to_one() {
    let mut engine = engine_with(two_runner_roster(), dec!(10000), OUTSIDER_WINS.to_vec());
    engine.select_stake(dec!(50)).unwrap();
    engine.place_stake(2).unwrap();
    assert_eq!(engine.balance(), dec!(9950));

    play_round(&mut engine);

    assert_eq!(engine.phase(), Phase::Resolved);
    let report = engine.last_report().unwrap();
    assert_eq!(report.winner_id, 2);
    assert_eq!(report.multiplier, 1);
    assert_eq!(report.winnings, dec!(250));
    assert_eq!(engine.balance(), dec!(10200));
}

#[test]
fn test_loss_at_five_to_one() {
    let mut engine = engine_with(two_runner_roster(), dec!(10000), FAVOURITE_WINS.to_vec());
    engine.place_wager(2, dec!(50)).unwrap();

    play_round(&mut engine);

    let report = engine.last_report().unwrap();
    assert_eq!(report.winner_id, 1);
    assert_eq!(report.winnings, Decimal::ZERO);
    assert_eq!(report.outcome, RoundOutcome::Lost { wagered: dec!(50) });
    assert_eq!(engine.balance(), dec!(9950));
}

#[test]
fn test_bonus_multiplier_quadruples_payout() {
    // multiplier sample 0.01 is under the 10% chance at zero luck
    let mut engine = engine_with(two_runner_roster(), dec!(1000), vec![0.5, 0.9, 0.01]);
    engine.place_wager(2, dec!(10)).unwrap();

    play_round(&mut engine);

    let report = engine.last_report().unwrap();
    assert_eq!(report.multiplier, 4);
    assert_eq!(report.winnings, dec!(200));
    assert_eq!(engine.balance(), dec!(1190));
    assert!(report.message().contains("BONUS"));
}

#[test]
fn test_unbet_round_still_resolves() {
    let mut engine = engine_with(Roster::standard(), dec!(10000), vec![0.3, 0.6, 0.5]);
    engine.drain_events();

    play_round(&mut engine);

    assert_eq!(engine.phase(), Phase::Resolved);
    assert_eq!(engine.balance(), dec!(10000));
    let report = engine.last_report().unwrap();
    assert_eq!(report.outcome, RoundOutcome::NoBets);
    assert!(report.message().contains("didn't bet"));
    assert_eq!(engine.recent_results().len(), 1);

    let events = engine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::RoundResolved { winnings, .. } if winnings.is_zero()
    )));
    assert!(!events
        .iter()
        .any(|e| matches!(e, EngineEvent::BalanceChanged { .. })));
}

#[test]
fn test_debits_equal_accepted_wagers() {
    let mut engine = engine_with(Roster::standard(), dec!(300), vec![0.5]);

    let attempts = [
        (1, dec!(100)),
        (2, dec!(150)),
        (3, dec!(100)), // only 50 left
        (99, dec!(10)),
        (4, dec!(-1)),
        (1, dec!(50)),
    ];
    let mut accepted = Decimal::ZERO;
    for (id, amount) in attempts {
        if engine.place_wager(id, amount).is_ok() {
            accepted += amount;
        }
    }

    assert_eq!(accepted, dec!(300));
    assert_eq!(engine.round().total_wagered(), accepted);
    assert_eq!(engine.round().bets().bet_on(1), dec!(150));
    assert_eq!(engine.balance(), Decimal::ZERO);
}

#[test]
fn test_rejections_report_reason() {
    let mut engine = engine_with(Roster::standard(), dec!(20), vec![0.5]);

    assert_eq!(
        engine.place_wager(1, dec!(50)),
        Err(EngineError::InsufficientFunds {
            needed: dec!(50),
            available: dec!(20)
        })
    );
    assert_eq!(
        engine.place_wager(7, dec!(5)),
        Err(EngineError::UnknownCompetitor(7))
    );
    assert!(matches!(
        engine.place_wager(1, Decimal::ZERO),
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine.request_top_up(Decimal::ZERO),
        Err(EngineError::InvalidAmount(_))
    ));
    assert_eq!(engine.balance(), dec!(20));
    assert!(engine.round().bets().is_empty());
}

#[test]
fn test_next_round_clears_bets_without_refund() {
    let mut engine = engine_with(two_runner_roster(), dec!(1000), FAVOURITE_WINS.to_vec());
    engine.place_wager(2, dec!(100)).unwrap();

    play_round(&mut engine);
    engine.force_play_again().unwrap();

    assert_eq!(engine.phase(), Phase::Betting);
    assert!(engine.round().bets().is_empty());
    assert_eq!(engine.round().bets().bet_on(2), Decimal::ZERO);
    assert_eq!(engine.balance(), dec!(900));
}

#[test]
fn test_top_up_funds_further_wagers() {
    let mut engine = engine_with(Roster::standard(), dec!(10), vec![0.5]);
    assert!(engine.place_wager(1, dec!(100)).is_err());
    engine.request_top_up(dec!(90)).unwrap();
    assert_eq!(engine.place_wager(1, dec!(100)).unwrap(), dec!(100));
    assert_eq!(engine.balance(), Decimal::ZERO);
}

#[test]
fn test_balance_carries_across_rounds() {
    // Round 1: outsider wins; round 2: favourite wins.
    let mut engine = engine_with(
        two_runner_roster(),
        dec!(1000),
        vec![0.5, 0.9, 0.99, 0.5, 0.1, 0.99],
    );

    engine.place_wager(2, dec!(100)).unwrap();
    play_round(&mut engine);
    assert_eq!(engine.balance(), dec!(1400));

    engine.advance(RESOLVED);
    assert_eq!(engine.round().number(), 2);

    engine.place_wager(2, dec!(100)).unwrap();
    engine.place_wager(1, dec!(50)).unwrap();
    play_round(&mut engine);
    // 1400 - 150 + 50 * 2.0
    assert_eq!(engine.balance(), dec!(1350));
    assert_eq!(engine.recent_results().to_vec(), vec!["F", "O"]);
}
