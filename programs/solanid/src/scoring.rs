use anchor_lang::prelude::*;

use crate::errors::SolanIdError;

/// Apply the per-source weight to a submitted base score.
/// `weight` is a percentage; division truncates.
pub fn weighted_score(base_score: u64, weight: u64) -> Result<u64> {
    base_score
        .checked_mul(weight)
        .and_then(|s| s.checked_div(100))
        .ok_or_else(|| error!(SolanIdError::Overflow))
}

/// Apply the diversity bonus to the pre-bonus sum of active weighted
/// scores. The bonus only kicks in once a second source is active and
/// is applied to the sum, not per source.
pub fn apply_diversity_bonus(
    base_total: u64,
    active_source_count: u8,
    diversity_bonus_pct: u8,
) -> Result<u64> {
    if active_source_count <= 1 || diversity_bonus_pct == 0 {
        return Ok(base_total);
    }

    let bonus = base_total
        .checked_mul(diversity_bonus_pct as u64)
        .and_then(|s| s.checked_div(100))
        .ok_or(SolanIdError::Overflow)?;

    base_total
        .checked_add(bonus)
        .ok_or_else(|| error!(SolanIdError::Overflow))
}

/// Swap one slot's contribution inside the pre-bonus sum. `previous`
/// is 0 for a slot that was not active.
pub fn replace_in_total(base_total: u64, previous: u64, next: u64) -> Result<u64> {
    base_total
        .checked_sub(previous)
        .and_then(|t| t.checked_add(next))
        .ok_or_else(|| error!(SolanIdError::Overflow))
}
