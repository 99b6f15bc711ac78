use anchor_lang::prelude::*;

use crate::constants::{
    CREATOR_WHITELIST_SEED, HANDLE_SEED, HUB_AUTHORITY_SEED, HUB_CONFIG_SEED, PROFILE_SEED,
};
use crate::errors::HubError;
use crate::events::{FollowModuleSet, ProfileCreated};
use crate::gateway::{self, ModuleCall};
use crate::state::{
    handle_seed, validate_handle, validate_uri, HandleRecord, HubAction, HubConfig,
    ModuleWhitelist, Profile, ProfileCreatorWhitelist,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct CreateProfileParams {
    /// Initial owner
    pub to: Pubkey,
    pub handle: String,
    pub image_uri: String,
    pub follow_module: Option<Pubkey>,
    pub follow_module_init_data: Vec<u8>,
    pub follow_nft_uri: String,
}

#[derive(Accounts)]
#[instruction(params: CreateProfileParams)]
pub struct CreateProfile<'info> {
    /// Whitelisted profile creator, pays for the new accounts
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        seeds = [CREATOR_WHITELIST_SEED, creator.key().as_ref()],
        bump = creator_whitelist.bump,
        constraint = creator_whitelist.whitelisted @ HubError::ProfileCreatorNotWhitelisted,
    )]
    pub creator_whitelist: Account<'info, ProfileCreatorWhitelist>,

    #[account(
        mut,
        seeds = [HUB_CONFIG_SEED],
        bump = hub_config.bump,
    )]
    pub hub_config: Account<'info, HubConfig>,

    #[account(
        init,
        payer = creator,
        space = Profile::SIZE,
        seeds = [PROFILE_SEED, &hub_config.next_profile_id().to_le_bytes()],
        bump,
    )]
    pub profile: Account<'info, Profile>,

    #[account(
        init_if_needed,
        payer = creator,
        space = HandleRecord::SIZE,
        seeds = [HANDLE_SEED, &handle_seed(&params.handle)],
        bump,
    )]
    pub handle_record: Account<'info, HandleRecord>,

    /// Required when a follow module is set
    pub follow_module_whitelist: Option<Account<'info, ModuleWhitelist>>,

    /// CHECK: Compared against `params.follow_module` by the gateway
    pub module_program: Option<UncheckedAccount<'info>>,

    /// CHECK: Owned and validated by the module program
    #[account(mut)]
    pub module_state: Option<UncheckedAccount<'info>>,

    /// CHECK: PDA signer for module callbacks
    #[account(seeds = [HUB_AUTHORITY_SEED], bump = hub_config.authority_bump)]
    pub hub_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CreateProfile>, params: CreateProfileParams) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::CreateProfile)?;
    require!(params.to != Pubkey::default(), HubError::InvalidRecipient);
    validate_handle(&params.handle)?;
    validate_uri(&params.image_uri)?;
    validate_uri(&params.follow_nft_uri)?;
    require!(ctx.accounts.handle_record.profile_id == 0, HubError::HandleTaken);

    let clock = Clock::get()?;
    let profile_id = ctx.accounts.hub_config.next_profile_id();

    let follow_module_return_data = match params.follow_module {
        Some(module) => {
            let call = ModuleCall::InitializeFollow {
                profile_id,
                data: params.follow_module_init_data.clone(),
            };
            let accounts = gateway::bind_module(
                &call,
                &module,
                ctx.accounts.follow_module_whitelist.as_deref(),
                ctx.accounts.module_program.as_deref(),
                ctx.accounts.module_state.as_deref(),
            )?;
            gateway::dispatch(
                &call,
                &accounts,
                &ctx.accounts.hub_authority,
                ctx.accounts.hub_config.authority_bump,
                &[
                    ctx.accounts.creator.to_account_info(),
                    ctx.accounts.system_program.to_account_info(),
                ],
            )?
        }
        None => Vec::new(),
    };

    ctx.accounts.hub_config.profile_counter = profile_id;

    let handle_record = &mut ctx.accounts.handle_record;
    handle_record.profile_id = profile_id;
    handle_record.bump = ctx.bumps.handle_record;

    let profile = &mut ctx.accounts.profile;
    profile.profile_id = profile_id;
    profile.owner = params.to;
    profile.approved = None;
    profile.handle = params.handle.clone();
    profile.image_uri = params.image_uri.clone();
    profile.follow_nft_uri = params.follow_nft_uri.clone();
    profile.pub_count = 0;
    profile.follow_module = params.follow_module;
    profile.dispatcher = None;
    profile.follow_registry = None;
    profile.created_at = clock.unix_timestamp;
    profile.burned = false;
    profile.bump = ctx.bumps.profile;

    emit!(ProfileCreated {
        profile_id,
        creator: ctx.accounts.creator.key(),
        to: params.to,
        handle: params.handle.clone(),
        image_uri: params.image_uri,
        follow_module: params.follow_module,
        follow_module_return_data: follow_module_return_data.clone(),
        follow_nft_uri: params.follow_nft_uri,
        timestamp: clock.unix_timestamp,
    });
    if params.follow_module.is_some() {
        emit!(FollowModuleSet {
            profile_id,
            follow_module: params.follow_module,
            follow_module_return_data,
            timestamp: clock.unix_timestamp,
        });
    }

    msg!("Created profile #{} @{} for {}", profile_id, params.handle, params.to);
    Ok(())
}
