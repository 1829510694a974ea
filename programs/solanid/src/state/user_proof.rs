use anchor_lang::prelude::*;

use crate::state::source::SOURCE_COUNT;

/// Per-user aggregate over all of the user's individual proofs.
/// Created on the first accepted submission and never destroyed.
/// Seeds: [b"user_proof", user.key()]
#[account]
pub struct UserProof {
    /// Wallet this aggregate belongs to
    pub user: Pubkey,
    /// Sum of active weighted scores with the diversity bonus applied
    pub aggregated_score: u64,
    /// Sum of active weighted scores before the diversity bonus.
    /// Kept so the aggregate is recomputed exactly instead of
    /// dividing the bonus back out.
    pub base_score_total: u64,
    /// Number of sources with a non-revoked individual proof
    pub active_source_count: u8,
    /// Unix timestamp of the last accepted submission
    pub last_update_ts: i64,
    /// Timestamp until which the verification status holds
    pub valid_until_ts: i64,
    /// Last refresh time per source, 0 when the slot is inactive
    pub source_last_refreshed: [i64; SOURCE_COUNT],
    /// PDA bump seed
    pub bump: u8,
}

impl UserProof {
    pub const SIZE: usize = 8 +  // discriminator
        32 + // user
        8 +  // aggregated_score
        8 +  // base_score_total
        1 +  // active_source_count
        8 +  // last_update_ts
        8 +  // valid_until_ts
        8 * SOURCE_COUNT + // source_last_refreshed
        1;   // bump
    // Total: 138 bytes

    pub const SEED_PREFIX: &'static [u8] = b"user_proof";

    /// Whether the account has been bound to a user yet.
    /// A freshly created (init_if_needed) account is all zeroes.
    pub fn is_initialized(&self) -> bool {
        self.user != Pubkey::default()
    }
}
