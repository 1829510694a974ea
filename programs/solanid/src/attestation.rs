use anchor_lang::prelude::*;
use anchor_lang::solana_program::ed25519_program;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};

use crate::errors::SolanIdError;
use crate::state::ProofSource;

/// Domain tag leading every attestation message.
pub const ATTESTATION_DOMAIN_TAG: &[u8; 4] = b"sid1";

/// Length of the canonical attestation message:
/// tag(4) + program_id(32) + registry(32) + user(32) + source(1) +
/// nullifier(32) + nonce(8) + base_score(8) + timestamp(8) + proof_hash(32)
pub const ATTESTATION_MESSAGE_LEN: usize = 189;

/// Build the canonical byte string the verifier signs. Integers are
/// little-endian; field order is fixed and part of the wire contract
/// with the off-chain attestation service.
#[allow(clippy::too_many_arguments)]
pub fn build_attestation_message(
    program_id: &Pubkey,
    registry: &Pubkey,
    user: &Pubkey,
    source: ProofSource,
    identity_nullifier: &[u8; 32],
    nonce: u64,
    base_score: u64,
    timestamp: i64,
    proof_hash: &[u8; 32],
) -> Vec<u8> {
    let mut message = Vec::with_capacity(ATTESTATION_MESSAGE_LEN);
    message.extend_from_slice(ATTESTATION_DOMAIN_TAG);
    message.extend_from_slice(program_id.as_ref());
    message.extend_from_slice(registry.as_ref());
    message.extend_from_slice(user.as_ref());
    message.push(source as u8);
    message.extend_from_slice(identity_nullifier);
    message.extend_from_slice(&nonce.to_le_bytes());
    message.extend_from_slice(&base_score.to_le_bytes());
    message.extend_from_slice(&timestamp.to_le_bytes());
    message.extend_from_slice(proof_hash);
    message
}

/// Signer and message extracted from an Ed25519-program instruction.
pub struct Ed25519Payload<'a> {
    pub public_key: &'a [u8],
    pub message: &'a [u8],
}

// Ed25519 program data layout (solana SDK):
// - 1 byte: number of signatures
// - 1 byte: padding
// - Ed25519SignatureOffsets (7 x u16, starting at byte 2):
//     signature_offset, signature_instruction_index,
//     public_key_offset, public_key_instruction_index,
//     message_data_offset, message_data_size, message_instruction_index
// - inline signature / public key / message bytes per the offsets
const OFFSETS_START: usize = 2;
const DATA_START: usize = OFFSETS_START + 14;

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

/// Parse a single-signature Ed25519-program payload with inline data.
/// Returns None for anything malformed: wrong signature count,
/// offsets referencing another instruction, or out-of-bounds slices.
pub fn parse_ed25519_payload(data: &[u8]) -> Option<Ed25519Payload<'_>> {
    if data.len() < DATA_START {
        return None;
    }
    if data[0] != 1 {
        return None;
    }

    let sig_offset = read_u16(data, 2) as usize;
    let sig_ix_idx = read_u16(data, 4);
    let pk_offset = read_u16(data, 6) as usize;
    let pk_ix_idx = read_u16(data, 8);
    let msg_offset = read_u16(data, 10) as usize;
    let msg_size = read_u16(data, 12) as usize;
    let msg_ix_idx = read_u16(data, 14);

    // All three index fields must point at the instruction itself
    // (u16::MAX), otherwise the precompile would be verifying bytes
    // taken from a different instruction than the ones read here.
    if sig_ix_idx != u16::MAX || pk_ix_idx != u16::MAX || msg_ix_idx != u16::MAX {
        return None;
    }

    if data.len() < sig_offset.checked_add(64)? {
        return None;
    }
    if data.len() < pk_offset.checked_add(32)? {
        return None;
    }
    if data.len() < msg_offset.checked_add(msg_size)? {
        return None;
    }

    Some(Ed25519Payload {
        public_key: &data[pk_offset..pk_offset + 32],
        message: &data[msg_offset..msg_offset + msg_size],
    })
}

/// Check that the instruction immediately preceding the current one
/// is an Ed25519-program verification of `expected_message` signed by
/// `verifier_key`. The precompile has already checked the signature
/// itself by the time this instruction runs.
pub fn verify_attestation(
    instructions_sysvar: &AccountInfo,
    verifier_key: &Pubkey,
    expected_message: &[u8],
) -> Result<()> {
    let current_index = load_current_index_checked(instructions_sysvar)
        .map_err(|_| error!(SolanIdError::InvalidAttestationInstruction))?;
    require!(
        current_index > 0,
        SolanIdError::InvalidAttestationInstruction
    );

    let attestation_ix =
        load_instruction_at_checked((current_index - 1) as usize, instructions_sysvar)
            .map_err(|_| error!(SolanIdError::InvalidAttestationInstruction))?;
    require!(
        attestation_ix.program_id == ed25519_program::ID,
        SolanIdError::InvalidAttestationInstruction
    );

    let payload = parse_ed25519_payload(&attestation_ix.data)
        .ok_or(SolanIdError::InvalidAttestationInstruction)?;

    require!(
        payload.public_key == verifier_key.as_ref(),
        SolanIdError::InvalidAttestationMessage
    );
    require!(
        payload.message == expected_message,
        SolanIdError::InvalidAttestationMessage
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> Vec<u8> {
        build_attestation_message(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            ProofSource::WorldId,
            &[7u8; 32],
            42,
            150,
            1_700_000_000,
            &[9u8; 32],
        )
    }

    /// Assemble ed25519-program instruction data the way the SDK's
    /// single-signature constructor lays it out.
    fn ed25519_ix_data(pubkey: &[u8; 32], signature: &[u8; 64], message: &[u8]) -> Vec<u8> {
        let pk_offset = DATA_START as u16;
        let sig_offset = pk_offset + 32;
        let msg_offset = sig_offset + 64;

        let mut data = vec![1u8, 0u8];
        for val in [
            sig_offset,
            u16::MAX,
            pk_offset,
            u16::MAX,
            msg_offset,
            message.len() as u16,
            u16::MAX,
        ] {
            data.extend_from_slice(&val.to_le_bytes());
        }
        data.extend_from_slice(pubkey);
        data.extend_from_slice(signature);
        data.extend_from_slice(message);
        data
    }

    #[test]
    fn message_has_canonical_length_and_layout() {
        let program_id = Pubkey::new_unique();
        let registry = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let nullifier = [3u8; 32];
        let proof_hash = [5u8; 32];

        let message = build_attestation_message(
            &program_id,
            &registry,
            &user,
            ProofSource::GitcoinPassport,
            &nullifier,
            0xABCD,
            150,
            1_700_000_000,
            &proof_hash,
        );

        assert_eq!(message.len(), ATTESTATION_MESSAGE_LEN);
        assert_eq!(&message[0..4], b"sid1");
        assert_eq!(&message[4..36], program_id.as_ref());
        assert_eq!(&message[36..68], registry.as_ref());
        assert_eq!(&message[68..100], user.as_ref());
        assert_eq!(message[100], 1);
        assert_eq!(&message[101..133], &nullifier);
        assert_eq!(&message[133..141], &0xABCDu64.to_le_bytes());
        assert_eq!(&message[141..149], &150u64.to_le_bytes());
        assert_eq!(&message[149..157], &1_700_000_000i64.to_le_bytes());
        assert_eq!(&message[157..189], &proof_hash);
    }

    #[test]
    fn message_differs_per_nonce() {
        let program_id = Pubkey::new_unique();
        let registry = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let a = build_attestation_message(
            &program_id,
            &registry,
            &user,
            ProofSource::Reclaim,
            &[1u8; 32],
            1,
            100,
            10,
            &[2u8; 32],
        );
        let b = build_attestation_message(
            &program_id,
            &registry,
            &user,
            ProofSource::Reclaim,
            &[1u8; 32],
            2,
            100,
            10,
            &[2u8; 32],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn parses_well_formed_payload() {
        let pubkey = [11u8; 32];
        let signature = [22u8; 64];
        let message = sample_message();
        let data = ed25519_ix_data(&pubkey, &signature, &message);

        let payload = parse_ed25519_payload(&data).expect("payload parses");
        assert_eq!(payload.public_key, &pubkey);
        assert_eq!(payload.message, message.as_slice());
    }

    #[test]
    fn rejects_truncated_data() {
        assert!(parse_ed25519_payload(&[]).is_none());
        assert!(parse_ed25519_payload(&[1u8, 0]).is_none());

        let data = ed25519_ix_data(&[11u8; 32], &[22u8; 64], &sample_message());
        assert!(parse_ed25519_payload(&data[..data.len() - 1]).is_none());
    }

    #[test]
    fn rejects_multi_signature_payload() {
        let mut data = ed25519_ix_data(&[11u8; 32], &[22u8; 64], &sample_message());
        data[0] = 2;
        assert!(parse_ed25519_payload(&data).is_none());
    }

    #[test]
    fn rejects_cross_instruction_references() {
        // Flip each instruction-index field away from u16::MAX in turn.
        for field_pos in [4usize, 8, 14] {
            let mut data = ed25519_ix_data(&[11u8; 32], &[22u8; 64], &sample_message());
            data[field_pos] = 0;
            data[field_pos + 1] = 0;
            assert!(parse_ed25519_payload(&data).is_none());
        }
    }
}
