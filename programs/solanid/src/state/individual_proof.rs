use anchor_lang::prelude::*;

use crate::state::source::ProofSource;

/// One proof slot per (user, source). Revocation zeroes the slot in
/// place so a fresh identity can re-occupy it later.
/// Seeds: [b"individual_proof", user.key(), [source as u8]]
#[account]
pub struct IndividualProof {
    /// Wallet that submitted this proof
    pub user: Pubkey,
    /// Opaque digest committing to the underlying provider proof
    pub proof_hash: [u8; 32],
    /// Payload-derived identity nullifier, retained so revocation can
    /// locate the nullifier record to tombstone
    pub identity_nullifier: [u8; 32],
    /// Provider this proof came from
    pub source: ProofSource,
    /// Score as submitted, before weighting
    pub base_score: u64,
    /// Base score after the per-source weight was applied
    pub weighted_score: u64,
    /// Provider-side proof timestamp
    pub submitted_at: i64,
    /// Whether this slot has been revoked
    pub is_revoked: bool,
    /// PDA bump seed
    pub bump: u8,
}

impl IndividualProof {
    pub const SIZE: usize = 8 +  // discriminator
        32 + // user
        32 + // proof_hash
        32 + // identity_nullifier
        1 +  // source
        8 +  // base_score
        8 +  // weighted_score
        8 +  // submitted_at
        1 +  // is_revoked
        1;   // bump
    // Total: 131 bytes

    pub const SEED_PREFIX: &'static [u8] = b"individual_proof";

    /// Whether this slot currently contributes to the user's aggregate.
    pub fn is_active(&self) -> bool {
        self.user != Pubkey::default() && !self.is_revoked
    }

    /// Clear the slot on revocation. The account is retained, and the
    /// nullifier value survives so a repeated revocation can still
    /// derive the nullifier record and fail with the typed error.
    pub fn clear(&mut self) {
        self.proof_hash = [0u8; 32];
        self.base_score = 0;
        self.weighted_score = 0;
        self.submitted_at = 0;
        self.is_revoked = true;
    }
}
