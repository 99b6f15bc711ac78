use anchor_lang::prelude::*;

use crate::errors::HubError;
use crate::state::follow_registry::{Checkpoint, HistoryHeader};

// =============================================================================
// RECEIPT RECORDS
// =============================================================================
// Follow and collect registries keep one small account per entity instead of
// one growing table: each token, each holder and each enumeration slot is its
// own PDA under the registry. An operation touches a bounded number of them,
// however many tokens the registry has minted.
//
// Enumeration uses two swap-remove lists per registry: every live token, and
// the tokens of each holder. A token records its position in both.
// =============================================================================

/// One follow or collect receipt. A default `owner` marks a burned token.
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct ReceiptToken {
    pub token_id: u64,
    pub owner: Pubkey,
    pub approved: Option<Pubkey>,
    pub minted_at: i64,
    /// Position in the registry's list of live tokens
    pub global_index: u64,
    /// Position in the owner's token list
    pub owner_index: u64,
}

impl ReceiptToken {
    pub const SIZE: usize = 8 +  // discriminator
        8 +                      // token_id
        32 +                     // owner
        33 +                     // approved
        8 +                      // minted_at
        8 +                      // global_index
        8;                       // owner_index

    pub fn is_live(&self) -> bool {
        self.owner != Pubkey::default()
    }
}

/// Per-address record of one registry. Collect registries only use the
/// balance; follow registries also keep the delegate and the power history
/// of the address as a delegatee.
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct ReceiptHolder {
    /// Live tokens held, which is also the length of the holder's list
    pub balance: u64,
    pub delegate: Option<Pubkey>,
    pub power: HistoryHeader,
}

impl ReceiptHolder {
    pub const SIZE: usize = 8 +  // discriminator
        8 +                      // balance
        33 +                     // delegate
        HistoryHeader::SIZE;     // power
}

/// One entry of an enumeration list.
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct TokenSlot {
    pub token_id: u64,
}

impl TokenSlot {
    pub const SIZE: usize = 8 + 8;
}

/// The enumeration lists of a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenList {
    All,
    OwnedBy(Pubkey),
}

/// The checkpoint histories of a follow registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HistoryKey {
    Supply,
    Power(Pubkey),
}

/// Keyed access to the per-entity records of one registry.
///
/// Reads of a holder that has never been written return the default record.
/// Writes create the record on first use.
pub trait ReceiptStore {
    fn token(&self, token_id: u64) -> Result<Option<ReceiptToken>>;
    fn put_token(&mut self, token: &ReceiptToken) -> Result<()>;
    fn holder(&self, holder: &Pubkey) -> Result<ReceiptHolder>;
    fn put_holder(&mut self, holder: &Pubkey, record: &ReceiptHolder) -> Result<()>;
    fn slot(&self, list: TokenList, index: u64) -> Result<u64>;
    fn put_slot(&mut self, list: TokenList, index: u64, token_id: u64) -> Result<()>;
    fn checkpoint(&self, history: HistoryKey, index: u64) -> Result<Checkpoint>;
    fn put_checkpoint(&mut self, history: HistoryKey, index: u64, checkpoint: &Checkpoint)
        -> Result<()>;
}

// =============================================================================
// RECEIPT LEDGER
// =============================================================================
// Counters kept in the registry header. Token ids are sequential from 1 and
// never reused.
// =============================================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReceiptLedger {
    /// Highest id minted so far
    pub minted: u64,
    /// Live (unburned) tokens
    pub total_supply: u64,
}

impl ReceiptLedger {
    pub const SIZE: usize = 8 + 8;

    pub fn mint<S: ReceiptStore>(&mut self, store: &mut S, to: Pubkey, now: i64) -> Result<u64> {
        require!(to != Pubkey::default(), HubError::InvalidRecipient);
        let token_id = self.minted + 1;
        let mut holder = store.holder(&to)?;

        store.put_slot(TokenList::All, self.total_supply, token_id)?;
        store.put_slot(TokenList::OwnedBy(to), holder.balance, token_id)?;
        store.put_token(&ReceiptToken {
            token_id,
            owner: to,
            approved: None,
            minted_at: now,
            global_index: self.total_supply,
            owner_index: holder.balance,
        })?;
        holder.balance += 1;
        store.put_holder(&to, &holder)?;

        self.minted = token_id;
        self.total_supply += 1;
        Ok(token_id)
    }

    pub fn token<S: ReceiptStore>(&self, store: &S, token_id: u64) -> Result<ReceiptToken> {
        store
            .token(token_id)?
            .filter(ReceiptToken::is_live)
            .ok_or_else(|| error!(HubError::TokenDoesNotExist))
    }

    pub fn owner_of<S: ReceiptStore>(&self, store: &S, token_id: u64) -> Result<Pubkey> {
        Ok(self.token(store, token_id)?.owner)
    }

    pub fn minted_at<S: ReceiptStore>(&self, store: &S, token_id: u64) -> Result<i64> {
        Ok(self.token(store, token_id)?.minted_at)
    }

    pub fn balance_of<S: ReceiptStore>(&self, store: &S, holder: &Pubkey) -> Result<u64> {
        Ok(store.holder(holder)?.balance)
    }

    /// The `index`-th live token. Order changes as tokens are burned.
    pub fn token_by_index<S: ReceiptStore>(&self, store: &S, index: u64) -> Result<u64> {
        require!(index < self.total_supply, HubError::TokenDoesNotExist);
        store.slot(TokenList::All, index)
    }

    /// The `index`-th token held by `holder`.
    pub fn token_of_owner_by_index<S: ReceiptStore>(
        &self,
        store: &S,
        holder: &Pubkey,
        index: u64,
    ) -> Result<u64> {
        require!(
            index < store.holder(holder)?.balance,
            HubError::TokenDoesNotExist
        );
        store.slot(TokenList::OwnedBy(*holder), index)
    }

    /// Only the owner may set (or clear) the approval.
    pub fn approve<S: ReceiptStore>(
        &self,
        store: &mut S,
        token_id: u64,
        caller: &Pubkey,
        approved: Option<Pubkey>,
    ) -> Result<()> {
        let mut token = self.token(store, token_id)?;
        require_keys_eq!(token.owner, *caller, HubError::NotOwnerOrApproved);
        token.approved = approved;
        store.put_token(&token)
    }

    /// Move a token; returns the previous owner.
    pub fn transfer<S: ReceiptStore>(
        &self,
        store: &mut S,
        token_id: u64,
        caller: &Pubkey,
        to: Pubkey,
    ) -> Result<Pubkey> {
        require!(to != Pubkey::default(), HubError::InvalidRecipient);
        let mut token = self.token(store, token_id)?;
        require!(is_owner_or_approved(&token, caller), HubError::NotOwnerOrApproved);
        let from = token.owner;

        release_from_owner(store, &token)?;
        let mut recipient = store.holder(&to)?;
        store.put_slot(TokenList::OwnedBy(to), recipient.balance, token_id)?;
        token.owner = to;
        token.owner_index = recipient.balance;
        token.approved = None;
        store.put_token(&token)?;
        recipient.balance += 1;
        store.put_holder(&to, &recipient)?;
        Ok(from)
    }

    /// Destroy a token; returns its last owner.
    pub fn burn<S: ReceiptStore>(
        &mut self,
        store: &mut S,
        token_id: u64,
        caller: &Pubkey,
    ) -> Result<Pubkey> {
        let mut token = self.token(store, token_id)?;
        require!(is_owner_or_approved(&token, caller), HubError::NotOwnerOrApproved);
        let owner = token.owner;

        release_from_owner(store, &token)?;
        unlink(store, TokenList::All, token.global_index, self.total_supply)?;
        self.total_supply -= 1;

        token.owner = Pubkey::default();
        token.approved = None;
        store.put_token(&token)?;
        Ok(owner)
    }
}

fn is_owner_or_approved(token: &ReceiptToken, caller: &Pubkey) -> bool {
    token.owner == *caller || token.approved == Some(*caller)
}

/// Drop `token` from its owner's list and balance.
fn release_from_owner<S: ReceiptStore>(store: &mut S, token: &ReceiptToken) -> Result<()> {
    let mut holder = store.holder(&token.owner)?;
    unlink(
        store,
        TokenList::OwnedBy(token.owner),
        token.owner_index,
        holder.balance,
    )?;
    holder.balance -= 1;
    store.put_holder(&token.owner, &holder)
}

/// Remove position `index` from a list of length `len` by moving the last
/// entry into it.
fn unlink<S: ReceiptStore>(store: &mut S, list: TokenList, index: u64, len: u64) -> Result<()> {
    let last = len - 1;
    if index == last {
        return Ok(());
    }
    let moved_id = store.slot(list, last)?;
    store.put_slot(list, index, moved_id)?;
    let mut moved = store
        .token(moved_id)?
        .ok_or_else(|| error!(HubError::TokenDoesNotExist))?;
    match list {
        TokenList::All => moved.global_index = index,
        TokenList::OwnedBy(_) => moved.owner_index = index,
    }
    store.put_token(&moved)
}

// =============================================================================
// COLLECT REGISTRY
// =============================================================================
// Header of the receipts of one canonical publication, created on first
// collect. The source pair is the resolved root, so collecting through any
// mirror chain lands here.
// =============================================================================

#[account]
pub struct CollectRegistry {
    /// Canonical source profile
    pub profile_id: u64,
    /// Canonical source publication
    pub pub_id: u64,
    pub ledger: ReceiptLedger,
    /// PDA bump seed
    pub bump: u8,
}

impl CollectRegistry {
    pub const SIZE: usize = 8 +  // discriminator
        8 +                      // profile_id
        8 +                      // pub_id
        ReceiptLedger::SIZE +    // ledger
        1;                       // bump

    pub fn new(profile_id: u64, pub_id: u64, bump: u8) -> Self {
        Self {
            profile_id,
            pub_id,
            ledger: ReceiptLedger::default(),
            bump,
        }
    }

    pub fn source(&self) -> (u64, u64) {
        (self.profile_id, self.pub_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{error_code, MemoryStore};

    #[test]
    fn mints_sequential_ids_with_timestamps() {
        let mut store = MemoryStore::default();
        let mut ledger = ReceiptLedger::default();
        let alice = Pubkey::new_unique();
        assert_eq!(ledger.mint(&mut store, alice, 100).unwrap(), 1);
        assert_eq!(ledger.mint(&mut store, alice, 101).unwrap(), 2);
        assert_eq!(ledger.minted_at(&store, 2).unwrap(), 101);
        assert_eq!(ledger.balance_of(&store, &alice).unwrap(), 2);
        assert_eq!(ledger.total_supply, 2);
    }

    #[test]
    fn burned_ids_are_not_reused() {
        let mut store = MemoryStore::default();
        let mut ledger = ReceiptLedger::default();
        let alice = Pubkey::new_unique();
        ledger.mint(&mut store, alice, 0).unwrap();
        ledger.mint(&mut store, alice, 0).unwrap();
        assert_eq!(ledger.burn(&mut store, 1, &alice).unwrap(), alice);

        assert_eq!(ledger.mint(&mut store, alice, 0).unwrap(), 3);
        assert_eq!(ledger.total_supply, 2);
        assert_eq!(
            error_code(ledger.owner_of(&store, 1)),
            u32::from(HubError::TokenDoesNotExist)
        );
        let mut live: Vec<u64> = (0..2)
            .map(|i| ledger.token_by_index(&store, i).unwrap())
            .collect();
        live.sort();
        assert_eq!(live, vec![2, 3]);
        assert_eq!(
            error_code(ledger.token_by_index(&store, 2)),
            u32::from(HubError::TokenDoesNotExist)
        );
    }

    #[test]
    fn approved_operator_can_transfer_once() {
        let mut store = MemoryStore::default();
        let mut ledger = ReceiptLedger::default();
        let alice = Pubkey::new_unique();
        let operator = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        ledger.mint(&mut store, alice, 0).unwrap();

        assert_eq!(
            error_code(ledger.transfer(&mut store, 1, &operator, bob)),
            u32::from(HubError::NotOwnerOrApproved)
        );
        ledger.approve(&mut store, 1, &alice, Some(operator)).unwrap();
        assert_eq!(ledger.transfer(&mut store, 1, &operator, bob).unwrap(), alice);
        assert_eq!(ledger.owner_of(&store, 1).unwrap(), bob);
        // approval does not survive the transfer
        assert_eq!(
            error_code(ledger.transfer(&mut store, 1, &operator, alice)),
            u32::from(HubError::NotOwnerOrApproved)
        );
    }

    #[test]
    fn only_owner_may_approve() {
        let mut store = MemoryStore::default();
        let mut ledger = ReceiptLedger::default();
        let alice = Pubkey::new_unique();
        let mallory = Pubkey::new_unique();
        ledger.mint(&mut store, alice, 0).unwrap();
        assert_eq!(
            error_code(ledger.approve(&mut store, 1, &mallory, Some(mallory))),
            u32::from(HubError::NotOwnerOrApproved)
        );
    }

    #[test]
    fn owner_lists_follow_transfers_and_burns() {
        let mut store = MemoryStore::default();
        let mut ledger = ReceiptLedger::default();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        for owner in [alice, bob, alice, alice] {
            ledger.mint(&mut store, owner, 0).unwrap();
        }
        assert_eq!(ledger.token_of_owner_by_index(&store, &alice, 0).unwrap(), 1);
        assert_eq!(ledger.token_of_owner_by_index(&store, &alice, 1).unwrap(), 3);
        assert_eq!(ledger.token_of_owner_by_index(&store, &alice, 2).unwrap(), 4);

        // removing alice's first token moves her last one into its place
        ledger.transfer(&mut store, 1, &alice, bob).unwrap();
        assert_eq!(ledger.token_of_owner_by_index(&store, &alice, 0).unwrap(), 4);
        assert_eq!(ledger.token_of_owner_by_index(&store, &alice, 1).unwrap(), 3);
        assert_eq!(ledger.token_of_owner_by_index(&store, &bob, 1).unwrap(), 1);
        assert_eq!(ledger.token(&store, 4).unwrap().owner_index, 0);

        ledger.burn(&mut store, 2, &bob).unwrap();
        assert_eq!(ledger.balance_of(&store, &bob).unwrap(), 1);
        assert_eq!(ledger.token_of_owner_by_index(&store, &bob, 0).unwrap(), 1);
        assert_eq!(
            error_code(ledger.token_of_owner_by_index(&store, &bob, 1)),
            u32::from(HubError::TokenDoesNotExist)
        );
    }

    #[test]
    fn transfer_to_self_keeps_lists_consistent() {
        let mut store = MemoryStore::default();
        let mut ledger = ReceiptLedger::default();
        let alice = Pubkey::new_unique();
        ledger.mint(&mut store, alice, 0).unwrap();
        ledger.mint(&mut store, alice, 0).unwrap();

        ledger.transfer(&mut store, 1, &alice, alice).unwrap();
        assert_eq!(ledger.balance_of(&store, &alice).unwrap(), 2);
        let mut held: Vec<u64> = (0..2)
            .map(|i| ledger.token_of_owner_by_index(&store, &alice, i).unwrap())
            .collect();
        held.sort();
        assert_eq!(held, vec![1, 2]);
    }

    #[test]
    fn rejects_default_recipient_and_unknown_ids() {
        let mut store = MemoryStore::default();
        let mut ledger = ReceiptLedger::default();
        assert_eq!(
            error_code(ledger.mint(&mut store, Pubkey::default(), 0)),
            u32::from(HubError::InvalidRecipient)
        );
        assert_eq!(
            error_code(ledger.owner_of(&store, 0)),
            u32::from(HubError::TokenDoesNotExist)
        );
        assert_eq!(
            error_code(ledger.owner_of(&store, 7)),
            u32::from(HubError::TokenDoesNotExist)
        );
    }
}
