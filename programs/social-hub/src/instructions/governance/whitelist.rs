use anchor_lang::prelude::*;

use crate::constants::{CREATOR_WHITELIST_SEED, HUB_CONFIG_SEED, MODULE_WHITELIST_SEED};
use crate::errors::HubError;
use crate::events::{ModuleWhitelisted, ProfileCreatorWhitelisted};
use crate::state::{HubConfig, ModuleKind, ModuleWhitelist, ProfileCreatorWhitelist};

// =============================================================================
// WHITELISTS
// =============================================================================
// Governance-only. Entries are created on first write and flipped in place
// afterwards; a de-whitelisted entry stays behind with its flag cleared.
// =============================================================================

#[derive(Accounts)]
#[instruction(creator: Pubkey)]
pub struct WhitelistProfileCreator<'info> {
    #[account(mut)]
    pub governance: Signer<'info>,

    #[account(
        seeds = [HUB_CONFIG_SEED],
        bump = hub_config.bump,
        constraint = hub_config.is_governance(&governance.key()) @ HubError::NotGovernance,
    )]
    pub hub_config: Account<'info, HubConfig>,

    #[account(
        init_if_needed,
        payer = governance,
        space = ProfileCreatorWhitelist::SIZE,
        seeds = [CREATOR_WHITELIST_SEED, creator.as_ref()],
        bump,
    )]
    pub creator_whitelist: Account<'info, ProfileCreatorWhitelist>,

    pub system_program: Program<'info, System>,
}

pub fn whitelist_profile_creator(
    ctx: Context<WhitelistProfileCreator>,
    creator: Pubkey,
    whitelisted: bool,
) -> Result<()> {
    let entry = &mut ctx.accounts.creator_whitelist;
    entry.creator = creator;
    entry.whitelisted = whitelisted;
    entry.bump = ctx.bumps.creator_whitelist;

    emit!(ProfileCreatorWhitelisted {
        creator,
        whitelisted,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Profile creator {} whitelisted: {}", creator, whitelisted);
    Ok(())
}

#[derive(Accounts)]
#[instruction(module: Pubkey)]
pub struct WhitelistModule<'info> {
    #[account(mut)]
    pub governance: Signer<'info>,

    #[account(
        seeds = [HUB_CONFIG_SEED],
        bump = hub_config.bump,
        constraint = hub_config.is_governance(&governance.key()) @ HubError::NotGovernance,
    )]
    pub hub_config: Account<'info, HubConfig>,

    #[account(
        init_if_needed,
        payer = governance,
        space = ModuleWhitelist::SIZE,
        seeds = [MODULE_WHITELIST_SEED, module.as_ref()],
        bump,
    )]
    pub module_whitelist: Account<'info, ModuleWhitelist>,

    pub system_program: Program<'info, System>,
}

pub fn whitelist_module(
    ctx: Context<WhitelistModule>,
    module: Pubkey,
    kind: ModuleKind,
    whitelisted: bool,
) -> Result<()> {
    let entry = &mut ctx.accounts.module_whitelist;
    entry.module = module;
    entry.bump = ctx.bumps.module_whitelist;
    entry.set(kind, whitelisted);

    emit!(ModuleWhitelisted {
        module,
        kind,
        whitelisted,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("{:?} module {} whitelisted: {}", kind, module, whitelisted);
    Ok(())
}
