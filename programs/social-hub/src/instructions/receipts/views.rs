use anchor_lang::prelude::*;

use crate::state::ReceiptLedger;
use crate::storage::{self, AccountStore};

// =============================================================================
// RECEIPT VIEWS
// =============================================================================
// Read-only queries over either kind of registry. An undeployed registry
// reads as empty. Remaining accounts: the records the query reads (the
// holder record for balances and owner lists, the token record, the list
// slot being indexed).
// =============================================================================

/// Which registry a query targets.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptSource {
    Follow { profile_id: u64 },
    Collect { profile_id: u64, pub_id: u64 },
}

#[derive(Accounts)]
pub struct ReceiptView<'info> {
    /// The follow or collect registry named by the source
    /// CHECK: Address checked by `storage::load_follow_registry` / `load_collect_registry`
    pub registry: UncheckedAccount<'info>,
}

impl ReceiptView<'_> {
    fn ledger(&self, source: ReceiptSource) -> Result<ReceiptLedger> {
        let ledger = match source {
            ReceiptSource::Follow { profile_id } => {
                storage::load_follow_registry(&self.registry, profile_id)?.map(|r| r.ledger)
            }
            ReceiptSource::Collect { profile_id, pub_id } => {
                storage::load_collect_registry(&self.registry, profile_id, pub_id)?
                    .map(|r| r.ledger)
            }
        };
        Ok(ledger.unwrap_or_default())
    }
}

pub fn get_receipt_total_supply(ctx: Context<ReceiptView>, source: ReceiptSource) -> Result<u64> {
    Ok(ctx.accounts.ledger(source)?.total_supply)
}

pub fn get_receipt_balance<'info>(
    ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
    source: ReceiptSource,
    owner: Pubkey,
) -> Result<u64> {
    let ledger = ctx.accounts.ledger(source)?;
    let records = AccountStore::reader(ctx.accounts.registry.key(), ctx.remaining_accounts);
    ledger.balance_of(&records, &owner)
}

pub fn get_receipt_owner<'info>(
    ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
    source: ReceiptSource,
    token_id: u64,
) -> Result<Pubkey> {
    let ledger = ctx.accounts.ledger(source)?;
    let records = AccountStore::reader(ctx.accounts.registry.key(), ctx.remaining_accounts);
    ledger.owner_of(&records, token_id)
}

/// Block time the token was minted at.
pub fn get_receipt_minted_at<'info>(
    ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
    source: ReceiptSource,
    token_id: u64,
) -> Result<i64> {
    let ledger = ctx.accounts.ledger(source)?;
    let records = AccountStore::reader(ctx.accounts.registry.key(), ctx.remaining_accounts);
    ledger.minted_at(&records, token_id)
}

pub fn get_receipt_token_by_index<'info>(
    ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
    source: ReceiptSource,
    index: u64,
) -> Result<u64> {
    let ledger = ctx.accounts.ledger(source)?;
    let records = AccountStore::reader(ctx.accounts.registry.key(), ctx.remaining_accounts);
    ledger.token_by_index(&records, index)
}

pub fn get_receipt_token_of_owner_by_index<'info>(
    ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
    source: ReceiptSource,
    owner: Pubkey,
    index: u64,
) -> Result<u64> {
    let ledger = ctx.accounts.ledger(source)?;
    let records = AccountStore::reader(ctx.accounts.registry.key(), ctx.remaining_accounts);
    ledger.token_of_owner_by_index(&records, &owner, index)
}
