use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as instructions_sysvar;

pub mod attestation;
pub mod errors;
pub mod scoring;
pub mod state;
pub mod validation;

use attestation::{build_attestation_message, verify_attestation};
use errors::SolanIdError;
use scoring::{apply_diversity_bonus, replace_in_total, weighted_score};
use state::{
    AttestationNonce, IdentityNullifier, IndividualProof, PendingRotation, ProofSource, Registry,
    ScoringConfig, SourceProofData, UserProof,
};
use validation::validate_source_payload;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod solanid {
    use super::*;

    // ============================================================
    // Initialization
    // ============================================================

    pub fn initialize_registry(
        ctx: Context<InitializeRegistry>,
        min_score: u64,
        cooldown_secs: i64,
        diversity_bonus_pct: u8,
        proof_ttl_secs: i64,
        verifier_key: Pubkey,
    ) -> Result<()> {
        require!(cooldown_secs >= 0, SolanIdError::InvalidConfig);
        require!(diversity_bonus_pct <= 100, SolanIdError::InvalidConfig);
        require!(proof_ttl_secs > 0, SolanIdError::InvalidConfig);
        require!(verifier_key != Pubkey::default(), SolanIdError::InvalidConfig);

        let registry = &mut ctx.accounts.registry;
        registry.admin = ctx.accounts.admin.key();
        registry.verifier_key = verifier_key;
        registry.min_score = min_score;
        registry.cooldown_secs = cooldown_secs;
        registry.diversity_bonus_pct = diversity_bonus_pct;
        registry.proof_ttl_secs = proof_ttl_secs;
        registry.total_verified_users = 0;
        registry.pending_rotation = None;
        registry.bump = ctx.bumps.registry;

        emit!(RegistryInitialized {
            admin: registry.admin,
            verifier_key,
            min_score,
        });

        Ok(())
    }

    pub fn initialize_scoring_config(ctx: Context<InitializeScoringConfig>) -> Result<()> {
        let scoring_config = &mut ctx.accounts.scoring_config;
        scoring_config.admin = ctx.accounts.admin.key();
        scoring_config.weights = [ScoringConfig::DEFAULT_WEIGHT; state::SOURCE_COUNT];
        scoring_config.bump = ctx.bumps.scoring_config;
        Ok(())
    }

    // ============================================================
    // Proof state machine
    // ============================================================

    pub fn submit_proof(
        ctx: Context<SubmitProof>,
        proof_hash: [u8; 32],
        source: ProofSource,
        nullifier: [u8; 32],
        nonce: u64,
        proof_data: SourceProofData,
        base_score: u64,
        timestamp: i64,
    ) -> Result<()> {
        let registry = &mut ctx.accounts.registry;
        let user_proof = &mut ctx.accounts.user_proof;
        let individual_proof = &mut ctx.accounts.individual_proof;
        let identity = &mut ctx.accounts.identity_nullifier;
        let nonce_record = &mut ctx.accounts.attestation_nonce;
        let scoring_config = &ctx.accounts.scoring_config;
        let user_key = ctx.accounts.user.key();
        let now = Clock::get()?.unix_timestamp;

        // The transaction must carry an Ed25519 verification of the
        // canonical attestation message immediately before this
        // instruction, signed by the current verifier key.
        let expected_message = build_attestation_message(
            &crate::ID,
            &registry.key(),
            &user_key,
            source,
            &nullifier,
            nonce,
            base_score,
            timestamp,
            &proof_hash,
        );
        verify_attestation(
            &ctx.accounts.instructions_sysvar,
            &registry.verifier_key,
            &expected_message,
        )?;

        validate_source_payload(source, &proof_data, &nullifier)?;

        require!(timestamp <= now, SolanIdError::InvalidTimestamp);
        let age = now
            .checked_sub(timestamp)
            .ok_or(SolanIdError::Overflow)?;
        require!(age <= registry.proof_ttl_secs, SolanIdError::ProofExpired);

        if identity.is_initialized() {
            require!(
                !identity.is_permanently_revoked,
                SolanIdError::IdentityRevokedPermanent
            );
            require!(
                identity.bound_user == user_key,
                SolanIdError::DuplicateIdentityClaim
            );
        }

        require!(
            !nonce_record.is_used,
            SolanIdError::AttestationNonceAlreadyUsed
        );

        if user_proof.is_initialized() && registry.cooldown_secs > 0 {
            let elapsed = now
                .checked_sub(user_proof.last_update_ts)
                .ok_or(SolanIdError::Overflow)?;
            require!(
                elapsed >= registry.cooldown_secs,
                SolanIdError::CooldownPeriodActive
            );
        }

        if !user_proof.is_initialized() {
            user_proof.user = user_key;
            user_proof.bump = ctx.bumps.user_proof;
        }

        if !identity.is_initialized() {
            identity.nullifier = nullifier;
            identity.bound_user = user_key;
            identity.first_bound_at = now;
            identity.bump = ctx.bumps.identity_nullifier;
        }

        nonce_record.nonce = nonce;
        nonce_record.used_by = user_key;
        nonce_record.used_at = now;
        nonce_record.is_used = true;
        nonce_record.bump = ctx.bumps.attestation_nonce;

        let weight = scoring_config.weights[source.index()];
        let new_weighted = weighted_score(base_score, weight)?;

        // A still-active slot is refreshed: its previous contribution
        // leaves the sum before the new one enters.
        let was_active = individual_proof.is_active();
        let previous_weighted = if was_active {
            individual_proof.weighted_score
        } else {
            0
        };

        let active_before = user_proof.active_source_count;
        let active_after = if was_active {
            active_before
        } else {
            active_before
                .checked_add(1)
                .ok_or(SolanIdError::Overflow)?
        };

        let base_total =
            replace_in_total(user_proof.base_score_total, previous_weighted, new_weighted)?;
        user_proof.base_score_total = base_total;
        user_proof.active_source_count = active_after;
        user_proof.aggregated_score =
            apply_diversity_bonus(base_total, active_after, registry.diversity_bonus_pct)?;
        user_proof.last_update_ts = now;
        user_proof.valid_until_ts = now
            .checked_add(registry.proof_ttl_secs)
            .ok_or(SolanIdError::Overflow)?;
        user_proof.source_last_refreshed[source.index()] = now;

        individual_proof.user = user_key;
        individual_proof.proof_hash = proof_hash;
        individual_proof.identity_nullifier = nullifier;
        individual_proof.source = source;
        individual_proof.base_score = base_score;
        individual_proof.weighted_score = new_weighted;
        individual_proof.submitted_at = timestamp;
        individual_proof.is_revoked = false;
        individual_proof.bump = ctx.bumps.individual_proof;

        if active_before == 0 {
            registry.total_verified_users = registry
                .total_verified_users
                .checked_add(1)
                .ok_or(SolanIdError::Overflow)?;
        }

        emit!(ProofSubmitted {
            user: user_key,
            source,
            proof_hash,
            base_score,
            weighted_score: new_weighted,
            aggregated_score: user_proof.aggregated_score,
            active_source_count: active_after,
            timestamp,
        });

        Ok(())
    }

    pub fn revoke_proof(ctx: Context<RevokeProof>, source: ProofSource) -> Result<()> {
        let registry = &mut ctx.accounts.registry;
        let user_proof = &mut ctx.accounts.user_proof;
        let individual_proof = &mut ctx.accounts.individual_proof;
        let identity = &mut ctx.accounts.identity_nullifier;
        let user_key = ctx.accounts.user.key();

        require!(
            !individual_proof.is_revoked,
            SolanIdError::ProofAlreadyRevoked
        );

        let removed = individual_proof.weighted_score;
        let base_total = user_proof
            .base_score_total
            .checked_sub(removed)
            .ok_or(SolanIdError::Overflow)?;
        let active_after = user_proof
            .active_source_count
            .checked_sub(1)
            .ok_or(SolanIdError::Overflow)?;

        user_proof.base_score_total = base_total;
        user_proof.active_source_count = active_after;
        user_proof.aggregated_score =
            apply_diversity_bonus(base_total, active_after, registry.diversity_bonus_pct)?;
        user_proof.source_last_refreshed[source.index()] = 0;

        if active_after == 0 {
            registry.total_verified_users = registry
                .total_verified_users
                .checked_sub(1)
                .ok_or(SolanIdError::Overflow)?;
        }

        // Tombstone the identity for good. Nothing ever clears this
        // flag, so the nullifier can never be submitted again by any
        // wallet.
        identity.is_permanently_revoked = true;

        let proof_hash = individual_proof.proof_hash;
        individual_proof.clear();

        emit!(ProofRevoked {
            user: user_key,
            source,
            proof_hash,
            nullifier: identity.nullifier,
            aggregated_score: user_proof.aggregated_score,
            active_source_count: active_after,
        });

        Ok(())
    }

    pub fn verify_proof(ctx: Context<VerifyProof>) -> Result<ProofStatus> {
        let user_proof = &ctx.accounts.user_proof;
        let registry = &ctx.accounts.registry;
        let now = Clock::get()?.unix_timestamp;

        let is_verified =
            user_proof.aggregated_score >= registry.min_score && user_proof.valid_until_ts > now;

        Ok(ProofStatus {
            is_verified,
            aggregated_score: user_proof.aggregated_score,
            verified_at: if is_verified {
                user_proof.last_update_ts
            } else {
                0
            },
        })
    }

    // ============================================================
    // Administration
    // ============================================================

    pub fn update_min_score(ctx: Context<UpdateMinScore>, new_min_score: u64) -> Result<()> {
        let registry = &mut ctx.accounts.registry;
        let old_score = registry.min_score;
        registry.min_score = new_min_score;
        emit!(MinScoreUpdated {
            old_score,
            new_score: new_min_score,
        });
        Ok(())
    }

    pub fn update_scoring_config(
        ctx: Context<UpdateScoringConfig>,
        source: ProofSource,
        weight: u64,
    ) -> Result<()> {
        let scoring_config = &mut ctx.accounts.scoring_config;
        scoring_config.weights[source.index()] = weight;
        emit!(ScoringConfigUpdated { source, weight });
        Ok(())
    }

    pub fn update_registry_config(
        ctx: Context<UpdateRegistryConfig>,
        cooldown_secs: i64,
        diversity_bonus_pct: u8,
        proof_ttl_secs: i64,
    ) -> Result<()> {
        require!(cooldown_secs >= 0, SolanIdError::InvalidConfig);
        require!(diversity_bonus_pct <= 100, SolanIdError::InvalidConfig);
        require!(proof_ttl_secs > 0, SolanIdError::InvalidConfig);

        let registry = &mut ctx.accounts.registry;
        registry.cooldown_secs = cooldown_secs;
        registry.diversity_bonus_pct = diversity_bonus_pct;
        registry.proof_ttl_secs = proof_ttl_secs;

        emit!(RegistryConfigUpdated {
            cooldown_secs,
            diversity_bonus_pct,
            proof_ttl_secs,
        });

        Ok(())
    }

    // ============================================================
    // Verifier rotation
    // ============================================================

    pub fn initiate_verifier_rotation(
        ctx: Context<InitiateVerifierRotation>,
        new_key: Pubkey,
        delay_secs: i64,
    ) -> Result<()> {
        require!(new_key != Pubkey::default(), SolanIdError::InvalidConfig);
        require!(delay_secs > 0, SolanIdError::InvalidConfig);

        let now = Clock::get()?.unix_timestamp;
        let ready_at = now
            .checked_add(delay_secs)
            .ok_or(SolanIdError::Overflow)?;

        // Re-initiating replaces any rotation already in flight; the
        // old verifier key stays authoritative either way until a
        // finalization succeeds.
        let registry = &mut ctx.accounts.registry;
        registry.pending_rotation = Some(PendingRotation { new_key, ready_at });

        emit!(VerifierRotationInitiated { new_key, ready_at });

        Ok(())
    }

    pub fn finalize_verifier_rotation(ctx: Context<FinalizeVerifierRotation>) -> Result<()> {
        let registry = &mut ctx.accounts.registry;
        let now = Clock::get()?.unix_timestamp;

        let pending = registry
            .pending_rotation
            .ok_or(SolanIdError::NoVerifierRotationPending)?;
        require!(
            now >= pending.ready_at,
            SolanIdError::VerifierRotationNotReady
        );

        let old_key = registry.verifier_key;
        registry.verifier_key = pending.new_key;
        registry.pending_rotation = None;

        emit!(VerifierRotationFinalized {
            old_key,
            new_key: registry.verifier_key,
        });

        Ok(())
    }
}

// ============================================================
// Account contexts
// ============================================================

#[derive(Accounts)]
pub struct InitializeRegistry<'info> {
    #[account(
        init,
        payer = admin,
        space = Registry::SIZE,
        seeds = [Registry::SEED_PREFIX],
        bump
    )]
    pub registry: Account<'info, Registry>,
    #[account(mut)]
    pub admin: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct InitializeScoringConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = ScoringConfig::SIZE,
        seeds = [ScoringConfig::SEED_PREFIX],
        bump
    )]
    pub scoring_config: Account<'info, ScoringConfig>,
    #[account(mut)]
    pub admin: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(proof_hash: [u8; 32], source: ProofSource, nullifier: [u8; 32], nonce: u64)]
pub struct SubmitProof<'info> {
    #[account(
        mut,
        seeds = [Registry::SEED_PREFIX],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,
    #[account(
        init_if_needed,
        payer = user,
        space = UserProof::SIZE,
        seeds = [UserProof::SEED_PREFIX, user.key().as_ref()],
        bump
    )]
    pub user_proof: Account<'info, UserProof>,
    #[account(
        init_if_needed,
        payer = user,
        space = IndividualProof::SIZE,
        seeds = [IndividualProof::SEED_PREFIX, user.key().as_ref(), &[source as u8]],
        bump
    )]
    pub individual_proof: Account<'info, IndividualProof>,
    #[account(
        init_if_needed,
        payer = user,
        space = IdentityNullifier::SIZE,
        seeds = [IdentityNullifier::SEED_PREFIX, nullifier.as_ref()],
        bump
    )]
    pub identity_nullifier: Account<'info, IdentityNullifier>,
    #[account(
        init_if_needed,
        payer = user,
        space = AttestationNonce::SIZE,
        seeds = [
            AttestationNonce::SEED_PREFIX,
            registry.key().as_ref(),
            nonce.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub attestation_nonce: Account<'info, AttestationNonce>,
    #[account(
        seeds = [ScoringConfig::SEED_PREFIX],
        bump = scoring_config.bump
    )]
    pub scoring_config: Account<'info, ScoringConfig>,
    /// CHECK: instructions sysvar, address-constrained; read via the
    /// instruction-introspection API in the attestation verifier.
    #[account(address = instructions_sysvar::ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,
    #[account(mut)]
    pub user: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(source: ProofSource)]
pub struct RevokeProof<'info> {
    #[account(
        mut,
        seeds = [Registry::SEED_PREFIX],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,
    #[account(
        mut,
        seeds = [UserProof::SEED_PREFIX, user.key().as_ref()],
        bump = user_proof.bump
    )]
    pub user_proof: Account<'info, UserProof>,
    #[account(
        mut,
        seeds = [IndividualProof::SEED_PREFIX, user.key().as_ref(), &[source as u8]],
        bump = individual_proof.bump
    )]
    pub individual_proof: Account<'info, IndividualProof>,
    #[account(
        mut,
        seeds = [IdentityNullifier::SEED_PREFIX, individual_proof.identity_nullifier.as_ref()],
        bump = identity_nullifier.bump
    )]
    pub identity_nullifier: Account<'info, IdentityNullifier>,
    pub user: Signer<'info>,
}

#[derive(Accounts)]
pub struct VerifyProof<'info> {
    #[account(
        seeds = [UserProof::SEED_PREFIX, user.key().as_ref()],
        bump = user_proof.bump
    )]
    pub user_proof: Account<'info, UserProof>,
    #[account(
        seeds = [Registry::SEED_PREFIX],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,
    /// CHECK: only used to derive the user_proof PDA; the seed
    /// constraint above ties the two together.
    pub user: UncheckedAccount<'info>,
}

#[derive(Accounts)]
pub struct UpdateMinScore<'info> {
    #[account(
        mut,
        seeds = [Registry::SEED_PREFIX],
        bump = registry.bump,
        has_one = admin @ SolanIdError::Unauthorized
    )]
    pub registry: Account<'info, Registry>,
    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct UpdateScoringConfig<'info> {
    #[account(
        mut,
        seeds = [ScoringConfig::SEED_PREFIX],
        bump = scoring_config.bump,
        has_one = admin @ SolanIdError::Unauthorized
    )]
    pub scoring_config: Account<'info, ScoringConfig>,
    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct UpdateRegistryConfig<'info> {
    #[account(
        mut,
        seeds = [Registry::SEED_PREFIX],
        bump = registry.bump,
        has_one = admin @ SolanIdError::Unauthorized
    )]
    pub registry: Account<'info, Registry>,
    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct InitiateVerifierRotation<'info> {
    #[account(
        mut,
        seeds = [Registry::SEED_PREFIX],
        bump = registry.bump,
        has_one = admin @ SolanIdError::Unauthorized
    )]
    pub registry: Account<'info, Registry>,
    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct FinalizeVerifierRotation<'info> {
    #[account(
        mut,
        seeds = [Registry::SEED_PREFIX],
        bump = registry.bump,
        has_one = admin @ SolanIdError::Unauthorized
    )]
    pub registry: Account<'info, Registry>,
    pub admin: Signer<'info>,
}

// ============================================================
// View types
// ============================================================

/// Aggregated verification status returned by `verify_proof`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct ProofStatus {
    pub is_verified: bool,
    pub aggregated_score: u64,
    pub verified_at: i64,
}

// ============================================================
// Events
// ============================================================

#[event]
pub struct RegistryInitialized {
    pub admin: Pubkey,
    pub verifier_key: Pubkey,
    pub min_score: u64,
}

#[event]
pub struct ProofSubmitted {
    pub user: Pubkey,
    pub source: ProofSource,
    pub proof_hash: [u8; 32],
    pub base_score: u64,
    pub weighted_score: u64,
    pub aggregated_score: u64,
    pub active_source_count: u8,
    pub timestamp: i64,
}

#[event]
pub struct ProofRevoked {
    pub user: Pubkey,
    pub source: ProofSource,
    pub proof_hash: [u8; 32],
    pub nullifier: [u8; 32],
    pub aggregated_score: u64,
    pub active_source_count: u8,
}

#[event]
pub struct MinScoreUpdated {
    pub old_score: u64,
    pub new_score: u64,
}

#[event]
pub struct ScoringConfigUpdated {
    pub source: ProofSource,
    pub weight: u64,
}

#[event]
pub struct RegistryConfigUpdated {
    pub cooldown_secs: i64,
    pub diversity_bonus_pct: u8,
    pub proof_ttl_secs: i64,
}

#[event]
pub struct VerifierRotationInitiated {
    pub new_key: Pubkey,
    pub ready_at: i64,
}

#[event]
pub struct VerifierRotationFinalized {
    pub old_key: Pubkey,
    pub new_key: Pubkey,
}
