use anchor_lang::prelude::*;
use social_hub::gateway::hub_authority_address;

declare_id!("FZaomiGW1MufMQWiKjsVEkhXPo3m81wEa96SZGCvcP7T");

/// Follow module that denies every follow, making a profile unfollowable.
#[program]
pub mod revert_follow_module {
    use super::*;

    pub fn initialize_follow_module(
        _ctx: Context<InitializeFollow>,
        profile_id: u64,
        _data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        msg!("Profile #{} no longer accepts follows", profile_id);
        Ok(Vec::new())
    }

    pub fn process_follow(
        _ctx: Context<ProcessFollow>,
        _follower: Pubkey,
        _profile_id: u64,
        _data: Vec<u8>,
    ) -> Result<()> {
        err!(ModuleError::FollowInvalid)
    }
}

fn is_hub(authority: &Signer) -> bool {
    authority.key() == hub_authority_address().0
}

#[derive(Accounts)]
pub struct InitializeFollow<'info> {
    #[account(constraint = is_hub(&hub_authority) @ ModuleError::NotHub)]
    pub hub_authority: Signer<'info>,

    /// CHECK: Stateless module
    pub module_state: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ProcessFollow<'info> {
    #[account(constraint = is_hub(&hub_authority) @ ModuleError::NotHub)]
    pub hub_authority: Signer<'info>,

    /// CHECK: Stateless module
    pub module_state: UncheckedAccount<'info>,

    /// CHECK: Identity only
    pub follower: UncheckedAccount<'info>,

    /// CHECK: Unused
    pub follow_registry: UncheckedAccount<'info>,
}

#[error_code]
pub enum ModuleError {
    #[msg("Caller is not the social hub")]
    NotHub,

    #[msg("This profile cannot be followed")]
    FollowInvalid,
}
