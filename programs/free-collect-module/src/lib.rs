use anchor_lang::prelude::*;
use social_hub::gateway::hub_authority_address;
use social_hub::storage;

declare_id!("ALEXcJhjJdHx5B5mwkiAZxoipZRRRx2GiDTTEbWNMbkr");

pub const CONFIG_SEED: &[u8] = b"free_collect";

/// Free collect module: anyone may collect, optionally only followers of
/// the publishing profile.
#[program]
pub mod free_collect_module {
    use super::*;

    /// Init data is a borsh `bool`: whether only followers may collect.
    pub fn initialize_publication_collect_module(
        ctx: Context<InitializeCollect>,
        profile_id: u64,
        pub_id: u64,
        data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let follower_only = decode_init_data(&data)?;

        let config = &mut ctx.accounts.config;
        config.profile_id = profile_id;
        config.pub_id = pub_id;
        config.follower_only = follower_only;
        config.bump = ctx.bumps.config;

        msg!(
            "Free collect configured for {}/{} (follower only: {})",
            profile_id,
            pub_id,
            follower_only
        );
        Ok(data)
    }

    pub fn process_collect(
        ctx: Context<ProcessCollect>,
        _referrer_profile_id: u64,
        collector: Pubkey,
        profile_id: u64,
        _pub_id: u64,
        _data: Vec<u8>,
    ) -> Result<()> {
        if ctx.accounts.config.follower_only {
            require!(
                storage::follows(&ctx.accounts.follow_record, profile_id, &collector),
                ModuleError::FollowInvalid
            );
        }
        Ok(())
    }
}

pub fn decode_init_data(data: &[u8]) -> Result<bool> {
    bool::try_from_slice(data).map_err(|_| error!(ModuleError::InitParamsInvalid))
}

fn is_hub(authority: &Signer) -> bool {
    authority.key() == hub_authority_address().0
}

#[account]
pub struct FreeCollectConfig {
    pub profile_id: u64,
    pub pub_id: u64,
    pub follower_only: bool,
    pub bump: u8,
}

impl FreeCollectConfig {
    pub const SIZE: usize = 8 + 8 + 8 + 1 + 1;
}

#[derive(Accounts)]
#[instruction(profile_id: u64, pub_id: u64)]
pub struct InitializeCollect<'info> {
    #[account(constraint = is_hub(&hub_authority) @ ModuleError::NotHub)]
    pub hub_authority: Signer<'info>,

    #[account(
        init,
        payer = payer,
        space = FreeCollectConfig::SIZE,
        seeds = [CONFIG_SEED, &profile_id.to_le_bytes(), &pub_id.to_le_bytes()],
        bump,
    )]
    pub config: Account<'info, FreeCollectConfig>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(referrer_profile_id: u64, collector: Pubkey, profile_id: u64, pub_id: u64)]
pub struct ProcessCollect<'info> {
    #[account(constraint = is_hub(&hub_authority) @ ModuleError::NotHub)]
    pub hub_authority: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED, &profile_id.to_le_bytes(), &pub_id.to_le_bytes()],
        bump = config.bump,
    )]
    pub config: Account<'info, FreeCollectConfig>,

    /// CHECK: Identity only; the hub authorized the collector
    pub collector: UncheckedAccount<'info>,

    /// Collector's holder record in the profile's follow registry
    /// CHECK: Address and contents checked by `social_hub::storage::follows`
    pub follow_record: UncheckedAccount<'info>,
}

#[error_code]
pub enum ModuleError {
    #[msg("Caller is not the social hub")]
    NotHub,

    #[msg("Init data must be a borsh-encoded bool")]
    InitParamsInvalid,

    #[msg("Only followers may collect this publication")]
    FollowInvalid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_data_is_a_single_bool() {
        assert!(decode_init_data(&[1]).unwrap());
        assert!(!decode_init_data(&[0]).unwrap());
        for bad in [&[][..], &[2][..], &[1, 0][..]] {
            match decode_init_data(bad) {
                Err(Error::AnchorError(e)) => {
                    assert_eq!(e.error_code_number, u32::from(ModuleError::InitParamsInvalid))
                }
                _ => panic!("accepted {bad:?}"),
            }
        }
    }
}
