use anchor_lang::prelude::*;

use crate::state::source::SOURCE_COUNT;

/// Per-source scoring weights, percentages of the submitted base
/// score. Every slot defaults to 100 (weight-neutral).
/// Seeds: [b"scoring_config"]
#[account]
pub struct ScoringConfig {
    /// Admin who can adjust weights
    pub admin: Pubkey,
    /// Weight per source, indexed by ProofSource discriminant
    pub weights: [u64; SOURCE_COUNT],
    /// PDA bump seed
    pub bump: u8,
}

impl ScoringConfig {
    pub const SIZE: usize = 8 +  // discriminator
        32 + // admin
        8 * SOURCE_COUNT + // weights
        1;   // bump
    // Total: 105 bytes

    pub const SEED_PREFIX: &'static [u8] = b"scoring_config";

    pub const DEFAULT_WEIGHT: u64 = 100;
}
