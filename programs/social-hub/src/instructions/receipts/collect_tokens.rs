use anchor_lang::prelude::*;

use crate::errors::HubError;
use crate::events::{ReceiptApproved, ReceiptBurned, ReceiptTransferred};
use crate::state::CollectRegistry;
use crate::storage::{self, AccountStore, Funding};

/// Remaining accounts: the registry records the operation touches.
#[derive(Accounts)]
pub struct CollectTokenAction<'info> {
    /// Owner or approved address; pays for new records
    #[account(mut)]
    pub caller: Signer<'info>,

    /// CHECK: Address checked by `storage::load_collect_registry`
    #[account(mut)]
    pub collect_registry: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

impl<'info> CollectTokenAction<'info> {
    fn load(&self, profile_id: u64, pub_id: u64) -> Result<CollectRegistry> {
        storage::load_collect_registry(&self.collect_registry, profile_id, pub_id)?
            .ok_or_else(|| error!(HubError::TokenDoesNotExist))
    }

    fn records<'a>(&'a self, remaining: &'a [AccountInfo<'info>]) -> AccountStore<'a, 'info> {
        AccountStore::writer(
            self.collect_registry.key(),
            remaining,
            Funding {
                payer: &self.caller,
                system_program: &self.system_program,
            },
        )
    }
}

pub fn transfer_collect_token<'info>(
    ctx: Context<'_, '_, '_, 'info, CollectTokenAction<'info>>,
    profile_id: u64,
    pub_id: u64,
    token_id: u64,
    to: Pubkey,
) -> Result<()> {
    let accounts = &*ctx.accounts;
    let registry = accounts.load(profile_id, pub_id)?;
    let mut records = accounts.records(ctx.remaining_accounts);
    let from = registry
        .ledger
        .transfer(&mut records, token_id, &accounts.caller.key(), to)?;

    emit!(ReceiptTransferred {
        registry: accounts.collect_registry.key(),
        token_id,
        from,
        to,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Collect token #{} of {}/{} moved {} -> {}", token_id, profile_id, pub_id, from, to);
    Ok(())
}

pub fn approve_collect_token<'info>(
    ctx: Context<'_, '_, '_, 'info, CollectTokenAction<'info>>,
    profile_id: u64,
    pub_id: u64,
    token_id: u64,
    approved: Option<Pubkey>,
) -> Result<()> {
    let accounts = &*ctx.accounts;
    let registry = accounts.load(profile_id, pub_id)?;
    let owner = accounts.caller.key();
    let mut records = accounts.records(ctx.remaining_accounts);
    registry
        .ledger
        .approve(&mut records, token_id, &owner, approved)?;

    emit!(ReceiptApproved {
        registry: accounts.collect_registry.key(),
        token_id,
        owner,
        approved,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

pub fn burn_collect_token<'info>(
    ctx: Context<'_, '_, '_, 'info, CollectTokenAction<'info>>,
    profile_id: u64,
    pub_id: u64,
    token_id: u64,
) -> Result<()> {
    let accounts = &*ctx.accounts;
    let mut registry = accounts.load(profile_id, pub_id)?;
    let mut records = accounts.records(ctx.remaining_accounts);
    let owner = registry
        .ledger
        .burn(&mut records, token_id, &accounts.caller.key())?;
    storage::store_account(&accounts.collect_registry, &registry)?;

    emit!(ReceiptBurned {
        registry: accounts.collect_registry.key(),
        token_id,
        owner,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Collect token #{} of {}/{} burned", token_id, profile_id, pub_id);
    Ok(())
}
