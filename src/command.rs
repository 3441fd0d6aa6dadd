//! Text commands accepted by the interactive binary.

use anyhow::{anyhow, bail, Context};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::types::CompetitorId;

/// One line of player input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Wager on a competitor; `None` uses the current stake.
    Bet {
        competitor_id: CompetitorId,
        amount: Option<Decimal>,
    },
    Stake(Decimal),
    TopUp(Decimal),
    PlayAgain,
    Status,
    History,
    Help,
    Quit,
}

impl Command {
    pub const USAGE: &'static str = "commands: bet <id> [amount] | stake <amount> | topup <amount> | again | status | history | help | quit";
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Bet {
                competitor_id,
                amount: Some(a),
            } => write!(f, "bet {competitor_id} {a}"),
            Command::Bet {
                competitor_id,
                amount: None,
            } => write!(f, "bet {competitor_id}"),
            Command::Stake(a) => write!(f, "stake {a}"),
            Command::TopUp(a) => write!(f, "topup {a}"),
            Command::PlayAgain => write!(f, "again"),
            Command::Status => write!(f, "status"),
            Command::History => write!(f, "history"),
            Command::Help => write!(f, "help"),
            Command::Quit => write!(f, "quit"),
        }
    }
}

fn parse_amount(raw: Option<&str>) -> anyhow::Result<Decimal> {
    let raw = raw.ok_or_else(|| anyhow!("missing amount"))?;
    Decimal::from_str(raw).with_context(|| format!("not a number: {raw}"))
}

/// Parse a command line (case-insensitive keyword, whitespace separated).
impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let keyword = parts
            .next()
            .ok_or_else(|| anyhow!("empty command"))?
            .to_lowercase();

        let command = match keyword.as_str() {
            "bet" | "b" => {
                let raw_id = parts.next().ok_or_else(|| anyhow!("missing competitor id"))?;
                let competitor_id = raw_id
                    .parse::<CompetitorId>()
                    .with_context(|| format!("not a competitor id: {raw_id}"))?;
                let amount = match parts.next() {
                    Some(raw) => Some(parse_amount(Some(raw))?),
                    None => None,
                };
                Command::Bet {
                    competitor_id,
                    amount,
                }
            }
            "stake" | "s" => Command::Stake(parse_amount(parts.next())?),
            "topup" | "top-up" | "t" => Command::TopUp(parse_amount(parts.next())?),
            "again" | "next" => Command::PlayAgain,
            "status" => Command::Status,
            "history" | "h" => Command::History,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command: {other}"),
        };

        if let Some(extra) = parts.next() {
            bail!("unexpected argument: {extra}");
        }
        Ok(command)
    }
}
