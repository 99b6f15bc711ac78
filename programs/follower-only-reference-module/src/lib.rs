use anchor_lang::prelude::*;
use social_hub::gateway::hub_authority_address;
use social_hub::storage;

declare_id!("rmJJrBrCphHR1QgdmEnoizH4T6NJe3h4Enf7iUw3nUp");

/// Reference module that only lets followers of the pointed profile comment
/// on or mirror a publication.
#[program]
pub mod follower_only_reference_module {
    use super::*;

    pub fn initialize_reference_module(
        _ctx: Context<InitializeReference>,
        _profile_id: u64,
        _pub_id: u64,
        _data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    pub fn process_comment(
        ctx: Context<ProcessReference>,
        profile_id: u64,
        pointed_profile_id: u64,
        _pointed_pub_id: u64,
        _data: Vec<u8>,
    ) -> Result<()> {
        require_follower(&ctx.accounts, profile_id, pointed_profile_id)
    }

    pub fn process_mirror(
        ctx: Context<ProcessReference>,
        profile_id: u64,
        pointed_profile_id: u64,
        _pointed_pub_id: u64,
        _data: Vec<u8>,
    ) -> Result<()> {
        require_follower(&ctx.accounts, profile_id, pointed_profile_id)
    }
}

/// The acting profile's owner must hold a follow token of the pointed profile.
fn require_follower(
    accounts: &ProcessReference,
    profile_id: u64,
    pointed_profile_id: u64,
) -> Result<()> {
    let profile = storage::load_profile(&accounts.profile, profile_id)?;
    require!(
        storage::follows(&accounts.follow_record, pointed_profile_id, &profile.owner),
        ModuleError::FollowInvalid
    );
    Ok(())
}

fn is_hub(authority: &Signer) -> bool {
    authority.key() == hub_authority_address().0
}

#[derive(Accounts)]
pub struct InitializeReference<'info> {
    #[account(constraint = is_hub(&hub_authority) @ ModuleError::NotHub)]
    pub hub_authority: Signer<'info>,

    /// CHECK: Stateless module
    pub module_state: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ProcessReference<'info> {
    #[account(constraint = is_hub(&hub_authority) @ ModuleError::NotHub)]
    pub hub_authority: Signer<'info>,

    /// CHECK: Stateless module
    pub module_state: UncheckedAccount<'info>,

    /// Profile doing the commenting or mirroring
    /// CHECK: Decoded by `social_hub::storage::load_profile`
    pub profile: UncheckedAccount<'info>,

    /// Profile owner's holder record in the pointed profile's follow registry
    /// CHECK: Address and contents checked by `social_hub::storage::follows`
    pub follow_record: UncheckedAccount<'info>,
}

#[error_code]
pub enum ModuleError {
    #[msg("Caller is not the social hub")]
    NotHub,

    #[msg("Only followers of the pointed profile may reference it")]
    FollowInvalid,
}
