use anchor_lang::prelude::*;

/// Binding of a real-world identity (its 32-byte nullifier) to the
/// first wallet that claimed it. Never deleted: revocation sets the
/// permanent tombstone instead, so the identity can never be reused.
/// Seeds: [b"identity_nullifier", nullifier]
#[account]
pub struct IdentityNullifier {
    /// The nullifier value this record is keyed by
    pub nullifier: [u8; 32],
    /// Wallet the identity is bound to
    pub bound_user: Pubkey,
    /// One-way tombstone flag set when the identity is revoked
    pub is_permanently_revoked: bool,
    /// Timestamp of the first binding
    pub first_bound_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl IdentityNullifier {
    pub const SIZE: usize = 8 +  // discriminator
        32 + // nullifier
        32 + // bound_user
        1 +  // is_permanently_revoked
        8 +  // first_bound_at
        1;   // bump
    // Total: 82 bytes

    pub const SEED_PREFIX: &'static [u8] = b"identity_nullifier";

    /// Whether this record has been bound yet.
    pub fn is_initialized(&self) -> bool {
        self.bound_user != Pubkey::default()
    }
}
