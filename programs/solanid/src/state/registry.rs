use anchor_lang::prelude::*;

/// Global registry singleton holding the admin key, the attestation
/// verifier key and the policy knobs applied to every submission.
/// Seeds: [b"registry"]
#[account]
pub struct Registry {
    /// Admin who can update policy and rotate the verifier
    pub admin: Pubkey,
    /// Key whose Ed25519 attestations are accepted for submissions
    pub verifier_key: Pubkey,
    /// Minimum aggregated score for a user to count as verified
    pub min_score: u64,
    /// Minimum seconds between submissions by the same user
    pub cooldown_secs: i64,
    /// Percentage bonus applied to the aggregate when >= 2 sources are active
    pub diversity_bonus_pct: u8,
    /// Maximum proof age on submit and validity window after it
    pub proof_ttl_secs: i64,
    /// Number of users currently holding at least one active source
    pub total_verified_users: u64,
    /// In-flight verifier rotation, if any
    pub pending_rotation: Option<PendingRotation>,
    /// PDA bump seed
    pub bump: u8,
}

/// A verifier rotation that has been initiated but not finalized.
/// The old key stays authoritative until `ready_at` has passed and
/// the rotation is finalized.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct PendingRotation {
    /// Verifier key that takes over on finalization
    pub new_key: Pubkey,
    /// Earliest unix timestamp at which finalization is allowed
    pub ready_at: i64,
}

impl PendingRotation {
    pub const SIZE: usize = 32 + // new_key
        8; // ready_at
}

impl Registry {
    pub const SIZE: usize = 8 +  // discriminator
        32 + // admin
        32 + // verifier_key
        8 +  // min_score
        8 +  // cooldown_secs
        1 +  // diversity_bonus_pct
        8 +  // proof_ttl_secs
        8 +  // total_verified_users
        1 + PendingRotation::SIZE + // pending_rotation (Option tag + payload)
        1;   // bump
    // Total: 147 bytes

    pub const SEED_PREFIX: &'static [u8] = b"registry";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_covers_serialized_layout_with_pending_rotation() {
        let registry = Registry {
            admin: Pubkey::new_unique(),
            verifier_key: Pubkey::new_unique(),
            min_score: 100,
            cooldown_secs: 60,
            diversity_bonus_pct: 20,
            proof_ttl_secs: 3600,
            total_verified_users: 1,
            pending_rotation: Some(PendingRotation {
                new_key: Pubkey::new_unique(),
                ready_at: 42,
            }),
            bump: 255,
        };

        let mut bytes = Vec::new();
        registry.serialize(&mut bytes).unwrap();
        assert_eq!(bytes.len() + 8, Registry::SIZE);
    }

    #[test]
    fn absent_rotation_serializes_to_a_single_tag_byte() {
        let mut bytes = Vec::new();
        Option::<PendingRotation>::None.serialize(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 1);

        let pending = PendingRotation {
            new_key: Pubkey::new_unique(),
            ready_at: 42,
        };
        let mut bytes = Vec::new();
        Some(pending).serialize(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 1 + PendingRotation::SIZE);
    }
}
