use anchor_lang::prelude::*;

use crate::constants::{HUB_CONFIG_SEED, PROFILE_SEED};
use crate::events::ProfileTransferred;
use crate::state::{HubAction, HubConfig, Profile};

#[derive(Accounts)]
#[instruction(profile_id: u64)]
pub struct TransferProfile<'info> {
    /// Owner or approved address
    pub caller: Signer<'info>,

    #[account(seeds = [HUB_CONFIG_SEED], bump = hub_config.bump)]
    pub hub_config: Account<'info, HubConfig>,

    #[account(
        mut,
        seeds = [PROFILE_SEED, &profile_id.to_le_bytes()],
        bump = profile.bump,
    )]
    pub profile: Account<'info, Profile>,
}

pub fn handler(ctx: Context<TransferProfile>, profile_id: u64, to: Pubkey) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::TransferProfile)?;
    let profile = &mut ctx.accounts.profile;
    profile.require_owner_or_approved(&ctx.accounts.caller.key())?;

    let from = profile.owner;
    profile.transfer(to)?;

    emit!(ProfileTransferred {
        profile_id,
        from,
        to,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Profile #{} transferred {} -> {}", profile_id, from, to);
    Ok(())
}
