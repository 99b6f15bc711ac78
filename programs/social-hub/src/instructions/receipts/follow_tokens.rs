use anchor_lang::prelude::*;

use crate::errors::HubError;
use crate::events::{DelegatedPowerChanged, ReceiptApproved, ReceiptBurned, ReceiptTransferred};
use crate::state::{FollowRegistry, PowerChange};
use crate::storage::{self, AccountStore, Funding};

// =============================================================================
// FOLLOW TOKENS
// =============================================================================
// Transfers and burns move the token's unit of power between the holders'
// delegates. None of these are gated by protocol state.
//
// Remaining accounts: the registry records the operation touches.
// =============================================================================

#[derive(Accounts)]
pub struct FollowTokenAction<'info> {
    /// Owner or approved address; pays for new records
    #[account(mut)]
    pub caller: Signer<'info>,

    /// CHECK: Address checked by `storage::load_follow_registry`
    #[account(mut)]
    pub follow_registry: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

impl<'info> FollowTokenAction<'info> {
    fn load(&self, profile_id: u64) -> Result<FollowRegistry> {
        storage::load_follow_registry(&self.follow_registry, profile_id)?
            .ok_or_else(|| error!(HubError::TokenDoesNotExist))
    }

    fn records<'a>(&'a self, remaining: &'a [AccountInfo<'info>]) -> AccountStore<'a, 'info> {
        AccountStore::writer(
            self.follow_registry.key(),
            remaining,
            Funding {
                payer: &self.caller,
                system_program: &self.system_program,
            },
        )
    }
}

fn emit_power_changes(profile_id: u64, changes: Vec<PowerChange>, slot: u64) {
    for change in changes {
        emit!(DelegatedPowerChanged {
            profile_id,
            delegatee: change.delegatee,
            new_power: change.new_power,
            block_number: slot,
        });
    }
}

pub fn transfer_follow_token<'info>(
    ctx: Context<'_, '_, '_, 'info, FollowTokenAction<'info>>,
    profile_id: u64,
    token_id: u64,
    to: Pubkey,
) -> Result<()> {
    let clock = Clock::get()?;
    let accounts = &*ctx.accounts;
    let mut registry = accounts.load(profile_id)?;
    let mut records = accounts.records(ctx.remaining_accounts);
    let (from, changes) =
        registry.transfer(&mut records, token_id, &accounts.caller.key(), to, clock.slot)?;
    storage::store_account(&accounts.follow_registry, &registry)?;

    emit!(ReceiptTransferred {
        registry: accounts.follow_registry.key(),
        token_id,
        from,
        to,
        timestamp: clock.unix_timestamp,
    });
    emit_power_changes(profile_id, changes, clock.slot);
    msg!("Follow token #{} of profile #{} moved {} -> {}", token_id, profile_id, from, to);
    Ok(())
}

pub fn approve_follow_token<'info>(
    ctx: Context<'_, '_, '_, 'info, FollowTokenAction<'info>>,
    profile_id: u64,
    token_id: u64,
    approved: Option<Pubkey>,
) -> Result<()> {
    let accounts = &*ctx.accounts;
    let registry = accounts.load(profile_id)?;
    let owner = accounts.caller.key();
    let mut records = accounts.records(ctx.remaining_accounts);
    registry
        .ledger
        .approve(&mut records, token_id, &owner, approved)?;

    emit!(ReceiptApproved {
        registry: accounts.follow_registry.key(),
        token_id,
        owner,
        approved,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

pub fn burn_follow_token<'info>(
    ctx: Context<'_, '_, '_, 'info, FollowTokenAction<'info>>,
    profile_id: u64,
    token_id: u64,
) -> Result<()> {
    let clock = Clock::get()?;
    let accounts = &*ctx.accounts;
    let mut registry = accounts.load(profile_id)?;
    let mut records = accounts.records(ctx.remaining_accounts);
    let (owner, changes) =
        registry.burn(&mut records, token_id, &accounts.caller.key(), clock.slot)?;
    storage::store_account(&accounts.follow_registry, &registry)?;

    emit!(ReceiptBurned {
        registry: accounts.follow_registry.key(),
        token_id,
        owner,
        timestamp: clock.unix_timestamp,
    });
    emit_power_changes(profile_id, changes, clock.slot);
    msg!("Follow token #{} of profile #{} burned", token_id, profile_id);
    Ok(())
}
