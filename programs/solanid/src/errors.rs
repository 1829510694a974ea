use anchor_lang::prelude::*;

#[error_code]
pub enum SolanIdError {
    #[msg("Proof timestamp is in the future")]
    InvalidTimestamp,

    #[msg("Proof timestamp is older than the registry TTL")]
    ProofExpired,

    #[msg("Unauthorized action")]
    Unauthorized,

    #[msg("Arithmetic overflow")]
    Overflow,

    #[msg("Proof is already revoked")]
    ProofAlreadyRevoked,

    #[msg("Cooldown period is still active")]
    CooldownPeriodActive,

    #[msg("Invalid registry configuration")]
    InvalidConfig,

    #[msg("Proof payload does not match the declared source")]
    SourcePayloadMismatch,

    #[msg("Invalid proof payload for the declared source")]
    InvalidSourceProofData,

    #[msg("Missing or malformed attestation instruction")]
    InvalidAttestationInstruction,

    #[msg("Attestation signer or message does not match")]
    InvalidAttestationMessage,

    #[msg("Identity nullifier does not match the proof payload")]
    InvalidIdentityNullifier,

    #[msg("Identity is already claimed by another wallet")]
    DuplicateIdentityClaim,

    #[msg("Identity has been permanently revoked")]
    IdentityRevokedPermanent,

    #[msg("Attestation nonce has already been used")]
    AttestationNonceAlreadyUsed,

    #[msg("No verifier rotation is pending")]
    NoVerifierRotationPending,

    #[msg("Verifier rotation delay has not elapsed")]
    VerifierRotationNotReady,
}
