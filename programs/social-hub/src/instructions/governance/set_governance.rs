use anchor_lang::prelude::*;

use crate::constants::HUB_CONFIG_SEED;
use crate::errors::HubError;
use crate::events::{EmergencyAdminSet, GovernanceSet};
use crate::state::HubConfig;

#[derive(Accounts)]
pub struct GovernanceOnly<'info> {
    pub governance: Signer<'info>,

    #[account(
        mut,
        seeds = [HUB_CONFIG_SEED],
        bump = hub_config.bump,
        constraint = hub_config.is_governance(&governance.key()) @ HubError::NotGovernance,
    )]
    pub hub_config: Account<'info, HubConfig>,
}

pub fn set_governance(ctx: Context<GovernanceOnly>, new_governance: Pubkey) -> Result<()> {
    let hub_config = &mut ctx.accounts.hub_config;
    let previous = hub_config.governance;
    hub_config.governance = new_governance;

    emit!(GovernanceSet {
        caller: ctx.accounts.governance.key(),
        previous,
        new: new_governance,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Governance set to {}", new_governance);
    Ok(())
}

pub fn set_emergency_admin(ctx: Context<GovernanceOnly>, new_emergency_admin: Pubkey) -> Result<()> {
    let hub_config = &mut ctx.accounts.hub_config;
    let previous = hub_config.emergency_admin;
    hub_config.emergency_admin = new_emergency_admin;

    emit!(EmergencyAdminSet {
        caller: ctx.accounts.governance.key(),
        previous,
        new: new_emergency_admin,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Emergency admin set to {}", new_emergency_admin);
    Ok(())
}
