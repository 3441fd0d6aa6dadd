//! Outcome selector — luck-weighted winner draw and bonus multiplier.
//!
//! Each runner's base weight is `1 / odds`, so short-priced runners win more
//! often. The hidden per-round luck factor applies a linear tilt of
//! `1 + luck * 0.5` to every weight (no renormalization). The bonus
//! multiplier is decided by a second, independent sample.

use serde::Serialize;
use tracing::debug;

use super::random::RandomSource;
use crate::types::{CompetitorId, Roster};

/// Multiplier applied when the bonus hits.
pub const BONUS_MULTIPLIER: u32 = 4;
/// Multiplier on an ordinary win.
pub const BASE_MULTIPLIER: u32 = 1;

const LUCK_WEIGHT_TILT: f64 = 0.5;
const BASE_BONUS_CHANCE: f64 = 0.10;
const LUCKY_BONUS_SLOPE: f64 = 0.10;
const UNLUCKY_BONUS_SLOPE: f64 = 0.05;
const MIN_BONUS_CHANCE: f64 = 0.05;
const MAX_BONUS_CHANCE: f64 = 0.25;

/// Result of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outcome {
    pub winner_id: CompetitorId,
    pub multiplier: u32,
}

impl Outcome {
    pub fn is_bonus(&self) -> bool {
        self.multiplier == BONUS_MULTIPLIER
    }
}

pub struct OutcomeSelector;

impl OutcomeSelector {
    /// Draw a winner, then the multiplier, from two separate samples.
    pub fn select(roster: &Roster, luck: f64, rng: &mut dyn RandomSource) -> Outcome {
        let luck = luck.clamp(-1.0, 1.0);
        let weights = Self::weights(roster, luck);
        let total: f64 = weights.iter().sum();

        let sample = rng.next_unit() * total;
        let winner_index = pick_by_weight(&weights, sample);
        let winner_id = roster
            .at(winner_index)
            .map(|c| c.id)
            .unwrap_or_else(|| roster.last().id);

        let chance = Self::bonus_chance(luck);
        let multiplier = if rng.next_unit() < chance {
            BONUS_MULTIPLIER
        } else {
            BASE_MULTIPLIER
        };

        debug!(
            luck = format!("{luck:.3}"),
            total_weight = format!("{total:.4}"),
            sample = format!("{sample:.4}"),
            winner_id,
            bonus_chance = format!("{:.1}%", chance * 100.0),
            multiplier,
            "Outcome drawn"
        );

        Outcome {
            winner_id,
            multiplier,
        }
    }

    /// Tilted weights in roster order.
    pub fn weights(roster: &Roster, luck: f64) -> Vec<f64> {
        let tilt = 1.0 + luck * LUCK_WEIGHT_TILT;
        roster.iter().map(|c| (1.0 / c.odds_f64()) * tilt).collect()
    }

    /// Probability that the bonus multiplier applies, always within
    /// `[0.05, 0.25]`.
    pub fn bonus_chance(luck: f64) -> f64 {
        let mut chance = BASE_BONUS_CHANCE;
        if luck > 0.0 {
            chance += luck * LUCKY_BONUS_SLOPE;
        } else if luck < 0.0 {
            chance += luck * UNLUCKY_BONUS_SLOPE;
        }
        chance.clamp(MIN_BONUS_CHANCE, MAX_BONUS_CHANCE)
    }
}

/// Walk the weights in order, subtracting each from `sample`; the first
/// index that brings the remainder to zero or below wins. When rounding
/// leaves the remainder positive after the last weight, the last index is
/// returned.
pub fn pick_by_weight(weights: &[f64], sample: f64) -> usize {
    let mut remainder = sample;
    for (i, w) in weights.iter().enumerate() {
        remainder -= w;
        if remainder <= 0.0 {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
