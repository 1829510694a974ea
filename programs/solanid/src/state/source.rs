use anchor_lang::prelude::*;

/// Number of provider slots. Weights, per-source timestamps and the
/// individual-proof seed space are all sized by this.
pub const SOURCE_COUNT: usize = 8;

/// Identity providers. Discriminants are stable and index into
/// `ScoringConfig::weights`; BrightId through Discord are reserved
/// slots with no payload variant wired up yet.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ProofSource {
    Reclaim = 0,
    GitcoinPassport = 1,
    WorldId = 2,
    BrightId = 3,
    Lens = 4,
    Twitter = 5,
    Google = 6,
    Discord = 7,
}

impl ProofSource {
    pub fn index(self) -> usize {
        self as u8 as usize
    }
}

/// Provider-specific proof payload. The active variant must match the
/// declared `ProofSource`; reserved sources have no variant here, so
/// submissions naming them always fail the payload check.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub enum SourceProofData {
    Reclaim {
        identity_hash: [u8; 32],
        provider_hash: [u8; 32],
        issued_at: i64,
    },
    GitcoinPassport {
        did_hash: [u8; 32],
        stamp_count: u16,
        passport_score: u16,
    },
    WorldId {
        nullifier_hash: [u8; 32],
        merkle_root: [u8; 32],
        verification_level: u8,
    },
}

impl SourceProofData {
    /// The source this payload variant belongs to.
    pub fn source(&self) -> ProofSource {
        match self {
            SourceProofData::Reclaim { .. } => ProofSource::Reclaim,
            SourceProofData::GitcoinPassport { .. } => ProofSource::GitcoinPassport,
            SourceProofData::WorldId { .. } => ProofSource::WorldId,
        }
    }

    /// The identity nullifier carried by the payload: the digest that
    /// uniquely identifies the real-world identity behind the proof.
    pub fn nullifier(&self) -> [u8; 32] {
        match self {
            SourceProofData::Reclaim { identity_hash, .. } => *identity_hash,
            SourceProofData::GitcoinPassport { did_hash, .. } => *did_hash,
            SourceProofData::WorldId { nullifier_hash, .. } => *nullifier_hash,
        }
    }
}
