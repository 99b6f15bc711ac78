use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;

use crate::constants::{HANDLE_SEED, HUB_CONFIG_SEED, PROFILE_SEED, SIG_NONCE_SEED};
use crate::events::ProfileBurned;
use crate::signature::{self, encode, SignedAction, TypedDataSignature};
use crate::state::{handle_seed, HandleRecord, HubAction, HubConfig, Profile, SigNonce};

#[derive(Accounts)]
#[instruction(profile_id: u64)]
pub struct BurnProfile<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    /// CHECK: Authorized by `signature::authorize`
    pub principal: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = caller,
        space = SigNonce::SIZE,
        seeds = [SIG_NONCE_SEED, principal.key().as_ref()],
        bump,
    )]
    pub sig_nonce: Account<'info, SigNonce>,

    /// CHECK: Instructions sysvar
    #[account(address = sysvar_instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    #[account(seeds = [HUB_CONFIG_SEED], bump = hub_config.bump)]
    pub hub_config: Account<'info, HubConfig>,

    #[account(
        mut,
        seeds = [PROFILE_SEED, &profile_id.to_le_bytes()],
        bump = profile.bump,
    )]
    pub profile: Account<'info, Profile>,

    /// Closed so the handle can be registered again
    #[account(
        mut,
        close = caller,
        seeds = [HANDLE_SEED, &handle_seed(&profile.handle)],
        bump = handle_record.bump,
    )]
    pub handle_record: Account<'info, HandleRecord>,

    pub system_program: Program<'info, System>,
}

/// Owner or approved. Publications of the profile stay in place.
pub fn handler(
    ctx: Context<BurnProfile>,
    profile_id: u64,
    sig: Option<TypedDataSignature>,
) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::BurnProfile)?;
    let accounts = &mut *ctx.accounts;
    let principal = signature::authorize(
        &accounts.hub_config,
        &accounts.caller.key(),
        &accounts.principal,
        &mut accounts.sig_nonce,
        ctx.bumps.sig_nonce,
        &accounts.instructions,
        SignedAction::BurnProfile,
        &encode(&profile_id)?,
        sig,
    )?;

    let profile = &mut accounts.profile;
    profile.require_owner_or_approved(&principal)?;
    let owner = profile.owner;
    profile.burn();

    emit!(ProfileBurned {
        profile_id,
        owner,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Profile #{} (@{}) burned", profile_id, profile.handle);
    Ok(())
}
