use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;

use crate::constants::{HUB_CONFIG_SEED, SIG_NONCE_SEED};
use crate::errors::HubError;
use crate::events::{DelegateChanged, DelegatedPowerChanged};
use crate::signature::{self, encode, SignedAction, TypedDataSignature};
use crate::state::{HubAction, HubConfig, SigNonce};
use crate::storage::{self, AccountStore, Funding};

/// Remaining accounts: the delegator's holder record and, when power moves,
/// the old and new delegates' holder records plus the power and supply
/// checkpoints being written.
#[derive(Accounts)]
pub struct DelegateFollowPower<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    /// The delegator
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

    /// CHECK: Address checked by `storage::load_follow_registry`
    #[account(mut)]
    pub follow_registry: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Point the principal's follow power on `profile_id` at `delegatee`.
/// `None` or the default key undelegates.
pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, DelegateFollowPower<'info>>,
    profile_id: u64,
    delegatee: Option<Pubkey>,
    sig: Option<TypedDataSignature>,
) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::DelegateFollowPower)?;

    let accounts = &mut *ctx.accounts;
    let delegator = signature::authorize(
        &accounts.hub_config,
        &accounts.caller.key(),
        &accounts.principal,
        &mut accounts.sig_nonce,
        ctx.bumps.sig_nonce,
        &accounts.instructions,
        SignedAction::DelegateFollowPower,
        &encode(&(profile_id, delegatee))?,
        sig,
    )?;

    let registry_info = accounts.follow_registry.to_account_info();
    let mut registry = storage::load_follow_registry(&registry_info, profile_id)?
        .ok_or(HubError::NotFollowRegistry)?;

    let slot = Clock::get()?.slot;
    let payer = accounts.caller.to_account_info();
    let system_program = accounts.system_program.to_account_info();
    let mut records = AccountStore::writer(
        registry_info.key(),
        ctx.remaining_accounts,
        Funding {
            payer: &payer,
            system_program: &system_program,
        },
    );
    let previous = registry.delegate_of(&records, &delegator)?;
    let changes = registry.delegate(&mut records, delegator, delegatee, slot)?;
    let new = registry.delegate_of(&records, &delegator)?;
    storage::store_account(&registry_info, &registry)?;

    emit!(DelegateChanged {
        profile_id,
        delegator,
        previous,
        new,
        block_number: slot,
    });
    for change in changes {
        emit!(DelegatedPowerChanged {
            profile_id,
            delegatee: change.delegatee,
            new_power: change.new_power,
            block_number: slot,
        });
    }
    msg!("{} delegated profile #{} follow power to {:?}", delegator, profile_id, new);
    Ok(())
}
