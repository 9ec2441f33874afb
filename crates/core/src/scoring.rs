//! Scoring module - score, multiplier, level and turn delay rules
//!
//! All functions are pure. A turn that clears lines scores
//! `lines * cells * 10 * multiplier` and bumps the multiplier; a turn that
//! clears nothing resets the multiplier to 1.

use crate::types::{
    BASE_TURN_DELAY_MS, MIN_TURN_DELAY_MS, POINTS_PER_CELL, POINTS_PER_LEVEL, TURN_DELAY_STEP_MS,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Points earned this turn
    pub score_delta: u32,
    /// Multiplier for the following turn
    pub multiplier: u32,
}

/// Points for a clear. Zero when no lines were cleared.
pub fn score_delta(lines: u32, cells: u32, multiplier: u32) -> u32 {
    if lines == 0 {
        return 0;
    }
    lines
        .saturating_mul(cells)
        .saturating_mul(POINTS_PER_CELL)
        .saturating_mul(multiplier)
}

/// Multiplier after a turn: +1 on any clear (regardless of line count), else back to 1
pub fn next_multiplier(lines: u32, multiplier: u32) -> u32 {
    if lines > 0 {
        multiplier.saturating_add(1)
    } else {
        1
    }
}

/// Apply one turn's clear to the running multiplier
pub fn apply_clear(lines: u32, cells: u32, multiplier: u32) -> ScoreResult {
    ScoreResult {
        score_delta: score_delta(lines, cells, multiplier),
        multiplier: next_multiplier(lines, multiplier),
    }
}

/// Level for a cumulative score: one level per 1000 points
pub fn level_for_score(score: u32) -> u32 {
    score / POINTS_PER_LEVEL
}

/// Turn deadline for a level, in milliseconds
pub fn turn_delay_ms(level: u32) -> u32 {
    BASE_TURN_DELAY_MS
        .saturating_sub(TURN_DELAY_STEP_MS.saturating_mul(level))
        .max(MIN_TURN_DELAY_MS)
}
