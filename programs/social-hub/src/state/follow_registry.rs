use anchor_lang::prelude::*;

use crate::errors::HubError;
use crate::state::receipt::{HistoryKey, ReceiptLedger, ReceiptStore};

/// Snapshot of a value as of the end of `block_number`.
#[account]
#[derive(Copy, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    pub block_number: u64,
    pub value: u64,
}

impl Checkpoint {
    pub const SIZE: usize = 8 + 8 + 8;
}

/// Length and newest entry of a strictly block-ordered history whose
/// checkpoints live in their own accounts.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryHeader {
    pub count: u64,
    pub latest: Checkpoint,
}

impl HistoryHeader {
    pub const SIZE: usize = 8 + 8 + 8;

    pub fn latest_value(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.latest.value
        }
    }

    /// Record `value` at `block_number`. A second write in the same block
    /// replaces the first, so there is at most one checkpoint per block.
    pub fn write<S: ReceiptStore>(
        &mut self,
        store: &mut S,
        key: HistoryKey,
        block_number: u64,
        value: u64,
    ) -> Result<()> {
        let index = if self.count > 0 && self.latest.block_number == block_number {
            self.count - 1
        } else {
            self.count += 1;
            self.count - 1
        };
        self.latest = Checkpoint { block_number, value };
        store.put_checkpoint(key, index, &self.latest)
    }

    /// Value of the latest checkpoint at or before `block_number`, 0 if none.
    /// Only the checkpoints on the binary-search path are read.
    pub fn value_at<S: ReceiptStore>(
        &self,
        store: &S,
        key: HistoryKey,
        block_number: u64,
    ) -> Result<u64> {
        if self.count == 0 {
            return Ok(0);
        }
        if self.latest.block_number <= block_number {
            return Ok(self.latest.value);
        }
        let (mut lo, mut hi) = (0, self.count - 1);
        let mut found = 0;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let checkpoint = store.checkpoint(key, mid)?;
            if checkpoint.block_number <= block_number {
                found = checkpoint.value;
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(found)
    }
}

/// A power change worth surfacing as an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerChange {
    pub delegatee: Pubkey,
    pub new_power: u64,
}

// =============================================================================
// FOLLOW REGISTRY
// =============================================================================
// Header of one profile's follow receipts, created on first follow. Besides
// the receipt ledger it carries a block-indexed voting-power ledger: each
// follow token is one unit of power, counted for its holder's delegate (never
// for the holder itself unless it delegated to itself).
//
// Delegates and per-delegatee power headers sit in the holder records; the
// checkpoints themselves are separate accounts.
// =============================================================================

#[account]
pub struct FollowRegistry {
    pub profile_id: u64,
    pub ledger: ReceiptLedger,
    pub delegated_supply: HistoryHeader,
    /// PDA bump seed
    pub bump: u8,
}

impl FollowRegistry {
    pub const SIZE: usize = 8 +  // discriminator
        8 +                      // profile_id
        ReceiptLedger::SIZE +    // ledger
        HistoryHeader::SIZE +    // delegated_supply
        1;                       // bump

    pub fn new(profile_id: u64, bump: u8) -> Self {
        Self {
            profile_id,
            ledger: ReceiptLedger::default(),
            delegated_supply: HistoryHeader::default(),
            bump,
        }
    }

    pub fn delegate_of<S: ReceiptStore>(&self, store: &S, holder: &Pubkey) -> Result<Option<Pubkey>> {
        Ok(store.holder(holder)?.delegate)
    }

    /// Current delegated power of `delegatee`.
    pub fn power_of<S: ReceiptStore>(&self, store: &S, delegatee: &Pubkey) -> Result<u64> {
        Ok(store.holder(delegatee)?.power.latest_value())
    }

    pub fn power_by_block_number<S: ReceiptStore>(
        &self,
        store: &S,
        user: &Pubkey,
        block_number: u64,
        current_block: u64,
    ) -> Result<u64> {
        require!(block_number <= current_block, HubError::BlockNumberInvalid);
        store
            .holder(user)?
            .power
            .value_at(store, HistoryKey::Power(*user), block_number)
    }

    pub fn delegated_supply_by_block_number<S: ReceiptStore>(
        &self,
        store: &S,
        block_number: u64,
        current_block: u64,
    ) -> Result<u64> {
        require!(block_number <= current_block, HubError::BlockNumberInvalid);
        self.delegated_supply
            .value_at(store, HistoryKey::Supply, block_number)
    }

    /// Mint a follow token; its unit of power goes to the follower's delegate.
    pub fn mint<S: ReceiptStore>(
        &mut self,
        store: &mut S,
        to: Pubkey,
        now: i64,
        block: u64,
    ) -> Result<(u64, Vec<PowerChange>)> {
        let token_id = self.ledger.mint(store, to, now)?;
        let delegate = self.delegate_of(store, &to)?;
        let changes = self.move_power(store, None, delegate, 1, block)?;
        Ok((token_id, changes))
    }

    pub fn transfer<S: ReceiptStore>(
        &mut self,
        store: &mut S,
        token_id: u64,
        caller: &Pubkey,
        to: Pubkey,
        block: u64,
    ) -> Result<(Pubkey, Vec<PowerChange>)> {
        let from = self.ledger.transfer(store, token_id, caller, to)?;
        let previous = self.delegate_of(store, &from)?;
        let next = self.delegate_of(store, &to)?;
        let changes = self.move_power(store, previous, next, 1, block)?;
        Ok((from, changes))
    }

    pub fn burn<S: ReceiptStore>(
        &mut self,
        store: &mut S,
        token_id: u64,
        caller: &Pubkey,
        block: u64,
    ) -> Result<(Pubkey, Vec<PowerChange>)> {
        let owner = self.ledger.burn(store, token_id, caller)?;
        let previous = self.delegate_of(store, &owner)?;
        let changes = self.move_power(store, previous, None, 1, block)?;
        Ok((owner, changes))
    }

    /// Point all of `delegator`'s power at `delegatee` (or at nobody). The
    /// default key means nobody.
    ///
    /// Always stamps the delegated supply at `block`; the value only moves
    /// when the delegator switches between having a delegate and not.
    pub fn delegate<S: ReceiptStore>(
        &mut self,
        store: &mut S,
        delegator: Pubkey,
        delegatee: Option<Pubkey>,
        block: u64,
    ) -> Result<Vec<PowerChange>> {
        let delegatee = delegatee.filter(|d| *d != Pubkey::default());
        let mut record = store.holder(&delegator)?;
        let previous = record.delegate;
        record.delegate = delegatee;
        store.put_holder(&delegator, &record)?;

        let changes = self.move_power(store, previous, delegatee, record.balance, block)?;
        let supply = self.delegated_supply.latest_value();
        self.delegated_supply
            .write(store, HistoryKey::Supply, block, supply)?;
        Ok(changes)
    }

    fn move_power<S: ReceiptStore>(
        &mut self,
        store: &mut S,
        from: Option<Pubkey>,
        to: Option<Pubkey>,
        amount: u64,
        block: u64,
    ) -> Result<Vec<PowerChange>> {
        let mut changes = Vec::with_capacity(2);
        if let Some(from) = from {
            let mut record = store.holder(&from)?;
            let new_power = record.power.latest_value().saturating_sub(amount);
            record
                .power
                .write(store, HistoryKey::Power(from), block, new_power)?;
            store.put_holder(&from, &record)?;
            changes.push(PowerChange { delegatee: from, new_power });
        }
        if let Some(to) = to {
            let mut record = store.holder(&to)?;
            let new_power = record.power.latest_value() + amount;
            record
                .power
                .write(store, HistoryKey::Power(to), block, new_power)?;
            store.put_holder(&to, &record)?;
            changes.push(PowerChange { delegatee: to, new_power });
        }
        let supply = self.delegated_supply.latest_value();
        match (from, to) {
            (None, Some(_)) => {
                self.delegated_supply
                    .write(store, HistoryKey::Supply, block, supply + amount)?;
            }
            (Some(_), None) => {
                self.delegated_supply.write(
                    store,
                    HistoryKey::Supply,
                    block,
                    supply.saturating_sub(amount),
                )?;
            }
            _ => {}
        }
        Ok(changes)
    }
}
