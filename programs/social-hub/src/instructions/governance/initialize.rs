use anchor_lang::prelude::*;

use crate::constants::{HUB_AUTHORITY_SEED, HUB_CONFIG_SEED};
use crate::errors::HubError;
use crate::program::SocialHub;
use crate::state::{HubConfig, ProtocolState};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init,
        payer = payer,
        space = HubConfig::SIZE,
        seeds = [HUB_CONFIG_SEED],
        bump,
    )]
    pub hub_config: Account<'info, HubConfig>,

    /// Data-less PDA that signs every module callback
    /// CHECK: Address derived from seeds, never read
    #[account(seeds = [HUB_AUTHORITY_SEED], bump)]
    pub hub_authority: UncheckedAccount<'info>,

    #[account(constraint = program.programdata_address()? == Some(program_data.key()))]
    pub program: Program<'info, SocialHub>,

    /// Only the upgrade authority may initialize
    #[account(
        constraint = is_upgrade_authority(program_data.upgrade_authority_address, &payer.key())
            @ HubError::NotUpgradeAuthority,
    )]
    pub program_data: Account<'info, ProgramData>,

    pub system_program: Program<'info, System>,
}

/// An immutable program (no upgrade authority) cannot be initialized.
pub fn is_upgrade_authority(upgrade_authority: Option<Pubkey>, signer: &Pubkey) -> bool {
    upgrade_authority == Some(*signer)
}

pub fn handler(
    ctx: Context<Initialize>,
    governance: Pubkey,
    emergency_admin: Pubkey,
    chain_id: u64,
) -> Result<()> {
    let hub_config = &mut ctx.accounts.hub_config;

    hub_config.governance = governance;
    hub_config.emergency_admin = emergency_admin;
    hub_config.state = ProtocolState::Unpaused;
    hub_config.chain_id = chain_id;
    hub_config.profile_counter = 0;
    hub_config.authority_bump = ctx.bumps.hub_authority;
    hub_config.bump = ctx.bumps.hub_config;

    msg!(
        "Hub initialized: governance {}, emergency admin {}, chain {}",
        governance,
        emergency_admin,
        chain_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_upgrade_authority_initializes() {
        let deployer = Pubkey::new_unique();
        assert!(is_upgrade_authority(Some(deployer), &deployer));
        assert!(!is_upgrade_authority(Some(deployer), &Pubkey::new_unique()));
        assert!(!is_upgrade_authority(None, &deployer));
    }
}
