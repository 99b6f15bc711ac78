use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;

use crate::constants::{HUB_CONFIG_SEED, PROFILE_SEED, SIG_NONCE_SEED};
use crate::events::{DispatcherSet, FollowNftUriSet, ProfileApproved, ProfileImageUriSet};
use crate::signature::{self, encode, SignedAction, TypedDataSignature};
use crate::state::{validate_uri, HubAction, HubConfig, Profile, SigNonce};

// =============================================================================
// PROFILE SETTINGS
// =============================================================================
// Dispatcher, metadata URIs and approval. Each comes in a direct and a
// `_with_sig` flavour sharing one account layout; the signature variant is
// relayed by `caller` on behalf of `principal`.
// =============================================================================

#[derive(Accounts)]
#[instruction(profile_id: u64)]
pub struct ProfileAction<'info> {
    /// Transaction signer: the principal itself, or a relayer
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

    pub system_program: Program<'info, System>,
}

impl<'info> ProfileAction<'info> {
    fn authorize<T: AnchorSerialize>(
        &mut self,
        nonce_bump: u8,
        action: SignedAction,
        params: &T,
        sig: Option<TypedDataSignature>,
    ) -> Result<Pubkey> {
        signature::authorize(
            &self.hub_config,
            &self.caller.key(),
            &self.principal,
            &mut self.sig_nonce,
            nonce_bump,
            &self.instructions,
            action,
            &encode(params)?,
            sig,
        )
    }
}

/// Owner only. `None` removes the dispatcher.
pub fn set_dispatcher(
    ctx: Context<ProfileAction>,
    profile_id: u64,
    dispatcher: Option<Pubkey>,
    sig: Option<TypedDataSignature>,
) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::SetDispatcher)?;
    let bump = ctx.bumps.sig_nonce;
    let principal = ctx.accounts.authorize(
        bump,
        SignedAction::SetDispatcher,
        &(profile_id, dispatcher),
        sig,
    )?;

    let profile = &mut ctx.accounts.profile;
    profile.require_owner(&principal)?;
    profile.dispatcher = dispatcher;

    emit!(DispatcherSet {
        profile_id,
        dispatcher,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Profile #{} dispatcher set to {:?}", profile_id, dispatcher);
    Ok(())
}

/// Owner or dispatcher.
pub fn set_profile_image_uri(
    ctx: Context<ProfileAction>,
    profile_id: u64,
    image_uri: String,
    sig: Option<TypedDataSignature>,
) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::SetProfileImageUri)?;
    validate_uri(&image_uri)?;
    let bump = ctx.bumps.sig_nonce;
    let principal = ctx.accounts.authorize(
        bump,
        SignedAction::SetProfileImageUri,
        &(profile_id, &image_uri),
        sig,
    )?;

    let profile = &mut ctx.accounts.profile;
    profile.require_owner_or_dispatcher(&principal)?;
    profile.image_uri = image_uri.clone();

    emit!(ProfileImageUriSet {
        profile_id,
        image_uri,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Profile #{} image URI updated", profile_id);
    Ok(())
}

/// Owner or dispatcher.
pub fn set_follow_nft_uri(
    ctx: Context<ProfileAction>,
    profile_id: u64,
    follow_nft_uri: String,
    sig: Option<TypedDataSignature>,
) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::SetFollowNftUri)?;
    validate_uri(&follow_nft_uri)?;
    let bump = ctx.bumps.sig_nonce;
    let principal = ctx.accounts.authorize(
        bump,
        SignedAction::SetFollowNftUri,
        &(profile_id, &follow_nft_uri),
        sig,
    )?;

    let profile = &mut ctx.accounts.profile;
    profile.require_owner_or_dispatcher(&principal)?;
    profile.follow_nft_uri = follow_nft_uri.clone();

    emit!(FollowNftUriSet {
        profile_id,
        follow_nft_uri,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Profile #{} follow NFT URI updated", profile_id);
    Ok(())
}

/// Owner only, never gated by protocol state. Approving `None` is a valid
/// zero-effect way to burn a nonce.
pub fn approve_profile(
    ctx: Context<ProfileAction>,
    profile_id: u64,
    approved: Option<Pubkey>,
    sig: Option<TypedDataSignature>,
) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::ApproveProfile)?;
    let bump = ctx.bumps.sig_nonce;
    let principal = ctx.accounts.authorize(
        bump,
        SignedAction::ApproveProfile,
        &(profile_id, approved),
        sig,
    )?;

    let profile = &mut ctx.accounts.profile;
    profile.require_owner(&principal)?;
    profile.approved = approved;

    emit!(ProfileApproved {
        profile_id,
        owner: principal,
        approved,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Profile #{} approved {:?}", profile_id, approved);
    Ok(())
}
