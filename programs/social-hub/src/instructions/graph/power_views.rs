use anchor_lang::prelude::*;

use crate::state::FollowRegistry;
use crate::storage::{self, AccountStore};

/// Remaining accounts: the user's holder record (power queries) and the
/// checkpoints on the binary-search path. A query at or after the newest
/// checkpoint reads none.
#[derive(Accounts)]
pub struct FollowPowerView<'info> {
    /// CHECK: Address checked by `storage::load_follow_registry`
    pub follow_registry: UncheckedAccount<'info>,
}

// A profile nobody has followed yet reads as an empty registry.
fn registry_or_empty(accounts: &FollowPowerView, profile_id: u64) -> Result<FollowRegistry> {
    Ok(storage::load_follow_registry(&accounts.follow_registry, profile_id)?
        .unwrap_or_else(|| FollowRegistry::new(profile_id, 0)))
}

/// View: `user`'s delegated power at the end of `block_number`.
pub fn get_power_by_block_number<'info>(
    ctx: Context<'_, '_, '_, 'info, FollowPowerView<'info>>,
    profile_id: u64,
    user: Pubkey,
    block_number: u64,
) -> Result<u64> {
    let current = Clock::get()?.slot;
    let records = AccountStore::reader(ctx.accounts.follow_registry.key(), ctx.remaining_accounts);
    registry_or_empty(ctx.accounts, profile_id)?.power_by_block_number(
        &records,
        &user,
        block_number,
        current,
    )
}

/// View: total delegated supply at the end of `block_number`.
pub fn get_delegated_supply_by_block_number<'info>(
    ctx: Context<'_, '_, '_, 'info, FollowPowerView<'info>>,
    profile_id: u64,
    block_number: u64,
) -> Result<u64> {
    let current = Clock::get()?.slot;
    let records = AccountStore::reader(ctx.accounts.follow_registry.key(), ctx.remaining_accounts);
    registry_or_empty(ctx.accounts, profile_id)?.delegated_supply_by_block_number(
        &records,
        block_number,
        current,
    )
}
