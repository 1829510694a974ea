use anchor_lang::prelude::*;

/// Record that an attestation nonce has been consumed, preventing
/// replay of a signed attestation. Once `is_used` is set the record
/// exists permanently.
/// Seeds: [b"attestation_nonce", registry.key(), nonce.to_le_bytes()]
#[account]
pub struct AttestationNonce {
    /// The nonce value this record is keyed by
    pub nonce: u64,
    /// Wallet whose submission consumed the nonce
    pub used_by: Pubkey,
    /// Timestamp when the nonce was consumed
    pub used_at: i64,
    /// Whether the nonce has been consumed
    pub is_used: bool,
    /// PDA bump seed
    pub bump: u8,
}

impl AttestationNonce {
    pub const SIZE: usize = 8 +  // discriminator
        8 +  // nonce
        32 + // used_by
        8 +  // used_at
        1 +  // is_used
        1;   // bump
    // Total: 58 bytes

    pub const SEED_PREFIX: &'static [u8] = b"attestation_nonce";
}
