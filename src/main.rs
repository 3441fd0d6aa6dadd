//! PADDOCK — timed betting-round engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the round engine and drives it in real time while reading
//! player commands from stdin, with graceful shutdown on Ctrl+C.

use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use paddock::command::Command;
use paddock::config;
use paddock::engine::{EntropyRandom, RaceEngine};
use paddock::types::{EngineEvent, Phase};

const BANNER: &str = r#"
 ____   _    ____  ____   ___   ____ _  __
|  _ \ / \  |  _ \|  _ \ / _ \ / ___| |/ /
| |_) / _ \ | | | | | | | | | | |   | ' /
|  __/ ___ \| |_| | |_| | |_| | |___| . \
|_| /_/   \_\____/|____/ \___/ \____|_|\_\

  Place your bets. Luck decides the rest.
"#;

/// Real-time granularity of the driver loop.
const DRIVE_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    let roster = cfg.roster()?;
    info!(
        player = %cfg.player.name,
        balance = %cfg.player.initial_balance,
        currency = %cfg.player.currency,
        runners = roster.len(),
        betting_secs = cfg.engine.betting_secs,
        "PADDOCK starting up"
    );
    for competitor in roster.iter() {
        info!("  {competitor}");
    }

    let mut engine = RaceEngine::new(
        cfg.engine.clone(),
        roster,
        cfg.player.initial_balance,
        EntropyRandom::new(),
    );
    engine.select_stake(cfg.player.default_stake)?;
    log_events(&mut engine);

    let mut ticker = tokio::time::interval(DRIVE_INTERVAL);
    let mut last = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("{}", Command::USAGE);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                engine.advance(now - last);
                last = now;
                log_events(&mut engine);
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => {
                        if !handle_line(&mut engine, &line) {
                            break;
                        }
                        log_events(&mut engine);
                    }
                    Ok(None) => {
                        info!("stdin closed; running unattended. Press Ctrl+C to stop.");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read command");
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(
        balance = %engine.balance(),
        rounds = engine.round().number(),
        "PADDOCK shut down cleanly."
    );
    Ok(())
}

/// Apply one line of input. Returns `false` when the player quits.
fn handle_line(engine: &mut RaceEngine<EntropyRandom>, line: &str) -> bool {
    let command = match line.parse::<Command>() {
        Ok(c) => c,
        Err(e) => {
            warn!(input = line.trim(), "{e}");
            info!("{}", Command::USAGE);
            return true;
        }
    };

    // Engine rejections are already logged by the engine itself.
    let _ = match command {
        Command::Bet {
            competitor_id,
            amount: Some(amount),
        } => engine.place_wager(competitor_id, amount).map(|_| ()),
        Command::Bet {
            competitor_id,
            amount: None,
        } => engine.place_stake(competitor_id).map(|_| ()),
        Command::Stake(amount) => engine.select_stake(amount),
        Command::TopUp(amount) => engine.request_top_up(amount).map(|_| ()),
        Command::PlayAgain => engine.force_play_again(),
        Command::Status => {
            match serde_json::to_string_pretty(&engine.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!(error = %e, "Failed to serialise snapshot"),
            }
            Ok(())
        }
        Command::History => {
            let tags: Vec<&str> = engine.recent_results().iter().collect();
            info!(recent = %tags.join(" "), "Recent winners (newest first)");
            Ok(())
        }
        Command::Help => {
            info!("{}", Command::USAGE);
            Ok(())
        }
        Command::Quit => return false,
    };
    true
}

/// Log everything the engine emitted since the last call.
fn log_events(engine: &mut RaceEngine<EntropyRandom>) {
    for event in engine.drain_events() {
        match event {
            EngineEvent::PhaseChanged {
                phase: Phase::Betting,
                countdown_secs,
            } => info!(round = engine.round().number(), countdown_secs, "🏁 Betting open"),
            EngineEvent::PhaseChanged {
                phase: Phase::Drawing,
                ..
            } => info!("🏇 And they're off!"),
            EngineEvent::PhaseChanged { .. } => {}
            EngineEvent::CountdownTick {
                phase,
                remaining_secs,
            } if remaining_secs > 0 && (remaining_secs <= 5 || remaining_secs % 10 == 0) => {
                info!(%phase, remaining_secs, "⏱");
            }
            EngineEvent::CountdownTick { .. } | EngineEvent::HighlightTick { .. } => {}
            EngineEvent::WagerUpdated {
                competitor_id,
                new_total,
            } => info!(competitor_id, total = %new_total, "Bet on the board"),
            EngineEvent::WinnerSettled { winner_id } => {
                if let Some(c) = engine.roster().get(winner_id) {
                    info!(winner = %c, "Photo finish!");
                }
            }
            EngineEvent::RoundResolved { .. } => {
                if let Some(report) = engine.last_report() {
                    info!(
                        winnings = %report.winnings,
                        balance = %report.balance_after,
                        "{}",
                        report.message()
                    );
                }
            }
            EngineEvent::BalanceChanged { new_balance } => {
                info!(balance = %new_balance, "Balance");
            }
        }
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("paddock=info"));

    let json_logging = std::env::var("PADDOCK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
