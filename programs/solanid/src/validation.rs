use anchor_lang::prelude::*;

use crate::errors::SolanIdError;
use crate::state::{ProofSource, SourceProofData};

fn is_non_zero_hash(hash: &[u8; 32]) -> bool {
    hash.iter().any(|b| *b != 0)
}

/// Check that the payload variant matches the declared source, that
/// the caller-supplied nullifier equals the payload-derived one, and
/// that the payload passes its provider-specific integrity checks.
///
/// Reserved sources (BrightId, Lens, Twitter, Google, Discord) have
/// no payload variant and always fail the first check.
pub fn validate_source_payload(
    source: ProofSource,
    proof_data: &SourceProofData,
    identity_nullifier: &[u8; 32],
) -> Result<()> {
    match (source, proof_data) {
        (
            ProofSource::Reclaim,
            SourceProofData::Reclaim {
                identity_hash,
                provider_hash,
                issued_at,
            },
        ) => {
            require!(
                identity_nullifier == identity_hash,
                SolanIdError::InvalidIdentityNullifier
            );
            require!(
                is_non_zero_hash(identity_hash),
                SolanIdError::InvalidSourceProofData
            );
            require!(
                is_non_zero_hash(provider_hash),
                SolanIdError::InvalidSourceProofData
            );
            require!(*issued_at > 0, SolanIdError::InvalidSourceProofData);
        }
        (
            ProofSource::GitcoinPassport,
            SourceProofData::GitcoinPassport {
                did_hash,
                stamp_count,
                passport_score,
            },
        ) => {
            require!(
                identity_nullifier == did_hash,
                SolanIdError::InvalidIdentityNullifier
            );
            require!(
                is_non_zero_hash(did_hash),
                SolanIdError::InvalidSourceProofData
            );
            require!(*stamp_count > 0, SolanIdError::InvalidSourceProofData);
            require!(*passport_score > 0, SolanIdError::InvalidSourceProofData);
        }
        (
            ProofSource::WorldId,
            SourceProofData::WorldId {
                nullifier_hash,
                merkle_root,
                verification_level,
            },
        ) => {
            require!(
                identity_nullifier == nullifier_hash,
                SolanIdError::InvalidIdentityNullifier
            );
            require!(
                is_non_zero_hash(nullifier_hash),
                SolanIdError::InvalidSourceProofData
            );
            require!(
                is_non_zero_hash(merkle_root),
                SolanIdError::InvalidSourceProofData
            );
            require!(
                (1..=2).contains(verification_level),
                SolanIdError::InvalidSourceProofData
            );
        }
        _ => return err!(SolanIdError::SourcePayloadMismatch),
    }

    Ok(())
}
