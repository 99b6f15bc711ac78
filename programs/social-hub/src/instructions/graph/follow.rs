use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;

use crate::constants::{FOLLOW_REGISTRY_SEED, HUB_AUTHORITY_SEED, HUB_CONFIG_SEED, SIG_NONCE_SEED};
use crate::errors::HubError;
use crate::events::{DelegatedPowerChanged, FollowRegistryDeployed, Followed};
use crate::gateway::{self, ModuleCall};
use crate::signature::{self, encode, SignedAction, TypedDataSignature};
use crate::state::{FollowRegistry, HubAction, HubConfig, PowerChange, ReceiptStore, SigNonce};
use crate::storage::{self, AccountStore, Funding};

// =============================================================================
// FOLLOW
// =============================================================================
//
// Batch follow. Remaining accounts, per requested profile and in order:
//
//   profile (w), follow_registry (w), [module_program, module_state (w)]
//
// where the module pair is present only if the profile has a follow module.
// A profile may appear several times; each occurrence mints another token.
//
// After the last group come the registry records every mint touches, in any
// order: the new token, the follower's holder record, the two list slots and,
// when the follower has a delegate, the delegate's holder record and the
// power and supply checkpoints being written.
// =============================================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct FollowParams {
    pub profile_ids: Vec<u64>,
    /// Follow module data, one entry per profile id
    pub datas: Vec<Vec<u8>>,
}

#[derive(Accounts)]
pub struct Follow<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    /// The follower
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

    /// CHECK: PDA signer for module callbacks
    #[account(seeds = [HUB_AUTHORITY_SEED], bump = hub_config.authority_bump)]
    pub hub_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn check_batch(params: &FollowParams) -> Result<()> {
    require!(
        params.profile_ids.len() == params.datas.len(),
        HubError::ArrayMismatch
    );
    Ok(())
}

/// Run the follow module, then mint. A module that fails leaves no token.
pub fn mint_follow<S, F>(
    registry: &mut FollowRegistry,
    store: &mut S,
    follower: Pubkey,
    now: i64,
    block: u64,
    process_follow: F,
) -> Result<(u64, Vec<PowerChange>)>
where
    S: ReceiptStore,
    F: FnOnce() -> Result<()>,
{
    process_follow()?;
    registry.mint(store, follower, now, block)
}

/// Returns the minted token ids in input order.
pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Follow<'info>>,
    params: FollowParams,
    sig: Option<TypedDataSignature>,
) -> Result<Vec<u64>> {
    ctx.accounts.hub_config.check_gate(HubAction::Follow)?;
    check_batch(&params)?;

    let accounts = &mut *ctx.accounts;
    let follower = signature::authorize(
        &accounts.hub_config,
        &accounts.caller.key(),
        &accounts.principal,
        &mut accounts.sig_nonce,
        ctx.bumps.sig_nonce,
        &accounts.instructions,
        SignedAction::Follow,
        &encode(&params)?,
        sig,
    )?;

    let clock = Clock::get()?;
    let payer = accounts.caller.to_account_info();
    let system_program = accounts.system_program.to_account_info();
    let mut remaining = ctx.remaining_accounts.iter();
    let mut token_ids = Vec::with_capacity(params.profile_ids.len());

    for (&profile_id, data) in params.profile_ids.iter().zip(params.datas.iter()) {
        let profile_info = remaining.next().ok_or(HubError::AccountsMissing)?;
        let registry_info = remaining.next().ok_or(HubError::AccountsMissing)?;
        let mut profile = storage::load_profile(profile_info, profile_id)?;

        let mut registry = match storage::load_follow_registry(registry_info, profile_id)? {
            Some(registry) => registry,
            None => {
                let (_, bump) = storage::follow_registry_address(profile_id);
                storage::create_pda_account(
                    &payer,
                    registry_info,
                    &system_program,
                    FollowRegistry::SIZE,
                    &[FOLLOW_REGISTRY_SEED, &profile_id.to_le_bytes(), &[bump]],
                )?;
                profile.follow_registry = Some(registry_info.key());
                storage::store_account(profile_info, &profile)?;

                emit!(FollowRegistryDeployed {
                    profile_id,
                    registry: registry_info.key(),
                    timestamp: clock.unix_timestamp,
                });
                msg!("Deployed follow registry for profile #{}", profile_id);
                FollowRegistry::new(profile_id, bump)
            }
        };

        let module_accounts = match profile.follow_module {
            Some(module) => {
                let call = ModuleCall::ProcessFollow {
                    follower,
                    profile_id,
                    data: data.clone(),
                };
                let bound =
                    gateway::bind_module(&call, &module, None, remaining.next(), remaining.next())?;
                Some((call, bound))
            }
            None => None,
        };

        let mut store = AccountStore::writer(
            registry_info.key(),
            ctx.remaining_accounts,
            Funding {
                payer: &payer,
                system_program: &system_program,
            },
        );
        let (token_id, changes) = mint_follow(
            &mut registry,
            &mut store,
            follower,
            clock.unix_timestamp,
            clock.slot,
            || match &module_accounts {
                Some((call, bound)) => gateway::dispatch(
                    call,
                    bound,
                    &accounts.hub_authority,
                    accounts.hub_config.authority_bump,
                    &[accounts.principal.to_account_info(), registry_info.clone()],
                )
                .map(|_| ()),
                None => Ok(()),
            },
        )?;
        storage::store_account(registry_info, &registry)?;

        for change in changes {
            emit!(DelegatedPowerChanged {
                profile_id,
                delegatee: change.delegatee,
                new_power: change.new_power,
                block_number: clock.slot,
            });
        }
        token_ids.push(token_id);
    }

    emit!(Followed {
        follower,
        profile_ids: params.profile_ids.clone(),
        token_ids: token_ids.clone(),
        timestamp: clock.unix_timestamp,
    });
    msg!("{} followed {} profile(s)", follower, token_ids.len());
    Ok(token_ids)
}
