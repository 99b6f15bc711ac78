use anchor_lang::prelude::*;

use crate::constants::HUB_CONFIG_SEED;
use crate::errors::HubError;
use crate::events::StateSet;
use crate::state::{HubConfig, ProtocolState};

#[derive(Accounts)]
pub struct SetState<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [HUB_CONFIG_SEED],
        bump = hub_config.bump,
        constraint = hub_config.can_set_state(&caller.key()) @ HubError::NotGovernanceOrEmergencyAdmin,
    )]
    pub hub_config: Account<'info, HubConfig>,
}

/// Any transition is allowed, for the emergency admin as much as governance.
pub fn handler(ctx: Context<SetState>, new_state: ProtocolState) -> Result<()> {
    let hub_config = &mut ctx.accounts.hub_config;
    let previous = hub_config.state;
    hub_config.state = new_state;

    emit!(StateSet {
        caller: ctx.accounts.caller.key(),
        previous,
        new: new_state,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Protocol state {:?} -> {:?}", previous, new_state);
    Ok(())
}
