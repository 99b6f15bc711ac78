use std::cell::RefCell;

use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Allocate, Assign, CreateAccount, Transfer};

use crate::constants::{
    ALL_TOKENS_SEED, COLLECT_REGISTRY_SEED, FOLLOW_REGISTRY_SEED, OWNED_TOKENS_SEED,
    POWER_CHECKPOINT_SEED, PROFILE_SEED, PUBLICATION_SEED, RECEIPT_HOLDER_SEED,
    RECEIPT_TOKEN_SEED, SUPPLY_CHECKPOINT_SEED,
};
use crate::errors::HubError;
use crate::state::{
    Checkpoint, CollectRegistry, FollowRegistry, HistoryKey, Profile, Publication,
    ReceiptHolder, ReceiptStore, ReceiptToken, TokenList, TokenSlot,
};

// =============================================================================
// MANUAL ACCOUNT STORAGE
// =============================================================================
//
// Variable-length batches (follow), mirror chains (collect) and the
// per-entity records of a registry arrive as remaining accounts. Those
// accounts are located, created and written here instead of through typed
// `Account<T>` wrappers.
// =============================================================================

pub fn profile_address(profile_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PROFILE_SEED, &profile_id.to_le_bytes()], &crate::ID)
}

pub fn publication_address(profile_id: u64, pub_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[PUBLICATION_SEED, &profile_id.to_le_bytes(), &pub_id.to_le_bytes()],
        &crate::ID,
    )
}

pub fn follow_registry_address(profile_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[FOLLOW_REGISTRY_SEED, &profile_id.to_le_bytes()], &crate::ID)
}

pub fn collect_registry_address(profile_id: u64, pub_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[COLLECT_REGISTRY_SEED, &profile_id.to_le_bytes(), &pub_id.to_le_bytes()],
        &crate::ID,
    )
}

fn load<T: AccountDeserialize>(info: &AccountInfo) -> Option<T> {
    if info.owner != &crate::ID || info.data_is_empty() {
        return None;
    }
    let data = info.try_borrow_data().ok()?;
    T::try_deserialize(&mut &data[..]).ok()
}

/// Load a live profile from an arbitrary account.
pub fn load_profile(info: &AccountInfo, profile_id: u64) -> Result<Profile> {
    match load::<Profile>(info) {
        Some(profile) if profile.profile_id == profile_id && profile.exists() => Ok(profile),
        _ => err!(HubError::ProfileNotFound),
    }
}

pub fn load_publication(info: &AccountInfo, profile_id: u64, pub_id: u64) -> Result<Publication> {
    match load::<Publication>(info) {
        Some(publication) if publication.id() == (profile_id, pub_id) => Ok(publication),
        _ => err!(HubError::PublicationDoesNotExist),
    }
}

/// Load the follow registry of `profile_id`, `None` if not yet deployed.
pub fn load_follow_registry(info: &AccountInfo, profile_id: u64) -> Result<Option<FollowRegistry>> {
    let (expected, _) = follow_registry_address(profile_id);
    require_keys_eq!(info.key(), expected, HubError::NotFollowRegistry);
    if info.data_is_empty() {
        return Ok(None);
    }
    match load::<FollowRegistry>(info) {
        Some(registry) if registry.profile_id == profile_id => Ok(Some(registry)),
        _ => err!(HubError::NotFollowRegistry),
    }
}

/// Load the collect registry of a canonical publication, `None` if not yet deployed.
pub fn load_collect_registry(
    info: &AccountInfo,
    profile_id: u64,
    pub_id: u64,
) -> Result<Option<CollectRegistry>> {
    let (expected, _) = collect_registry_address(profile_id, pub_id);
    require_keys_eq!(info.key(), expected, HubError::NotCollectRegistry);
    if info.data_is_empty() {
        return Ok(None);
    }
    match load::<CollectRegistry>(info) {
        Some(registry) if registry.source() == (profile_id, pub_id) => Ok(Some(registry)),
        _ => err!(HubError::NotCollectRegistry),
    }
}

/// Whether `who` holds at least one follow token of `profile_id`, judged
/// from `holder_record`, which must be `who`'s record in that profile's
/// follow registry. An uncreated or foreign account counts as no follow.
pub fn follows(holder_record: &AccountInfo, profile_id: u64, who: &Pubkey) -> bool {
    let (registry, _) = follow_registry_address(profile_id);
    let (expected, _) = RegistryRecord::Holder(*who).address(&registry);
    holder_record.key() == expected
        && load::<ReceiptHolder>(holder_record).map_or(false, |h| h.balance > 0)
}

// =============================================================================
// REGISTRY RECORDS
// =============================================================================

/// A per-entity account under a follow or collect registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryRecord {
    Token(u64),
    Holder(Pubkey),
    Slot(TokenList, u64),
    Checkpoint(HistoryKey, u64),
}

impl RegistryRecord {
    fn seeds(&self, registry: &Pubkey) -> Vec<Vec<u8>> {
        let registry = registry.to_bytes().to_vec();
        match *self {
            RegistryRecord::Token(token_id) => vec![
                RECEIPT_TOKEN_SEED.to_vec(),
                registry,
                token_id.to_le_bytes().to_vec(),
            ],
            RegistryRecord::Holder(holder) => vec![
                RECEIPT_HOLDER_SEED.to_vec(),
                registry,
                holder.to_bytes().to_vec(),
            ],
            RegistryRecord::Slot(TokenList::All, index) => vec![
                ALL_TOKENS_SEED.to_vec(),
                registry,
                index.to_le_bytes().to_vec(),
            ],
            RegistryRecord::Slot(TokenList::OwnedBy(holder), index) => vec![
                OWNED_TOKENS_SEED.to_vec(),
                registry,
                holder.to_bytes().to_vec(),
                index.to_le_bytes().to_vec(),
            ],
            RegistryRecord::Checkpoint(HistoryKey::Supply, index) => vec![
                SUPPLY_CHECKPOINT_SEED.to_vec(),
                registry,
                index.to_le_bytes().to_vec(),
            ],
            RegistryRecord::Checkpoint(HistoryKey::Power(delegatee), index) => vec![
                POWER_CHECKPOINT_SEED.to_vec(),
                registry,
                delegatee.to_bytes().to_vec(),
                index.to_le_bytes().to_vec(),
            ],
        }
    }

    pub fn address(&self, registry: &Pubkey) -> (Pubkey, u8) {
        let seeds = self.seeds(registry);
        let seeds: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
        Pubkey::find_program_address(&seeds, &crate::ID)
    }

    fn space(&self) -> usize {
        match self {
            RegistryRecord::Token(_) => ReceiptToken::SIZE,
            RegistryRecord::Holder(_) => ReceiptHolder::SIZE,
            RegistryRecord::Slot(..) => TokenSlot::SIZE,
            RegistryRecord::Checkpoint(..) => Checkpoint::SIZE,
        }
    }
}

/// Pays for records created on first write.
pub struct Funding<'a, 'info> {
    pub payer: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
}

/// [`ReceiptStore`] over the record accounts supplied with an instruction.
///
/// Every record an operation touches must be among `accounts`; a missing
/// one fails with `AccountsMissing`. Stores without funding are read-only.
pub struct AccountStore<'a, 'info> {
    registry: Pubkey,
    accounts: &'a [AccountInfo<'info>],
    funding: Option<Funding<'a, 'info>>,
    derived: RefCell<Vec<(RegistryRecord, Pubkey, u8)>>,
}

impl<'a, 'info> AccountStore<'a, 'info> {
    pub fn reader(registry: Pubkey, accounts: &'a [AccountInfo<'info>]) -> Self {
        Self {
            registry,
            accounts,
            funding: None,
            derived: RefCell::new(Vec::new()),
        }
    }

    pub fn writer(
        registry: Pubkey,
        accounts: &'a [AccountInfo<'info>],
        funding: Funding<'a, 'info>,
    ) -> Self {
        Self {
            funding: Some(funding),
            ..Self::reader(registry, accounts)
        }
    }

    fn derive(&self, record: RegistryRecord) -> (Pubkey, u8) {
        let mut derived = self.derived.borrow_mut();
        if let Some((_, address, bump)) = derived.iter().find(|(r, _, _)| *r == record) {
            return (*address, *bump);
        }
        let (address, bump) = record.address(&self.registry);
        derived.push((record, address, bump));
        (address, bump)
    }

    fn find(&self, record: RegistryRecord) -> Result<&'a AccountInfo<'info>> {
        let (address, _) = self.derive(record);
        self.accounts
            .iter()
            .find(|info| info.key == &address)
            .ok_or_else(|| error!(HubError::AccountsMissing))
    }

    fn read<T: AccountDeserialize>(&self, record: RegistryRecord) -> Result<Option<T>> {
        let info = self.find(record)?;
        if info.data_is_empty() {
            return Ok(None);
        }
        require_keys_eq!(*info.owner, crate::ID, HubError::RecordInvalid);
        let data = info.try_borrow_data()?;
        T::try_deserialize(&mut &data[..])
            .map(Some)
            .map_err(|_| error!(HubError::RecordInvalid))
    }

    fn write<T: AccountSerialize>(&mut self, record: RegistryRecord, value: &T) -> Result<()> {
        let info = self.find(record)?;
        if info.owner != &crate::ID {
            let funding = self
                .funding
                .as_ref()
                .ok_or_else(|| error!(HubError::AccountsMissing))?;
            let (_, bump) = self.derive(record);
            let mut seeds = record.seeds(&self.registry);
            seeds.push(vec![bump]);
            let seeds: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
            create_pda_account(
                funding.payer,
                info,
                funding.system_program,
                record.space(),
                &seeds,
            )?;
        }
        store_account(info, value)
    }
}

impl ReceiptStore for AccountStore<'_, '_> {
    fn token(&self, token_id: u64) -> Result<Option<ReceiptToken>> {
        self.read(RegistryRecord::Token(token_id))
    }

    fn put_token(&mut self, token: &ReceiptToken) -> Result<()> {
        self.write(RegistryRecord::Token(token.token_id), token)
    }

    fn holder(&self, holder: &Pubkey) -> Result<ReceiptHolder> {
        Ok(self
            .read(RegistryRecord::Holder(*holder))?
            .unwrap_or_default())
    }

    fn put_holder(&mut self, holder: &Pubkey, record: &ReceiptHolder) -> Result<()> {
        self.write(RegistryRecord::Holder(*holder), record)
    }

    fn slot(&self, list: TokenList, index: u64) -> Result<u64> {
        self.read::<TokenSlot>(RegistryRecord::Slot(list, index))?
            .map(|slot| slot.token_id)
            .ok_or_else(|| error!(HubError::RecordInvalid))
    }

    fn put_slot(&mut self, list: TokenList, index: u64, token_id: u64) -> Result<()> {
        self.write(RegistryRecord::Slot(list, index), &TokenSlot { token_id })
    }

    fn checkpoint(&self, history: HistoryKey, index: u64) -> Result<Checkpoint> {
        self.read(RegistryRecord::Checkpoint(history, index))?
            .ok_or_else(|| error!(HubError::RecordInvalid))
    }

    fn put_checkpoint(
        &mut self,
        history: HistoryKey,
        index: u64,
        checkpoint: &Checkpoint,
    ) -> Result<()> {
        self.write(RegistryRecord::Checkpoint(history, index), checkpoint)
    }
}

// =============================================================================
// ACCOUNT CREATION
// =============================================================================

/// How a PDA gets its lamports, space and owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreationPlan {
    /// Empty address: one `create_account`
    Create { lamports: u64 },
    /// Address already holds lamports (anyone can send them): top up to rent
    /// exemption, then allocate and assign under the PDA's signature
    Adopt { top_up: u64 },
}

pub fn creation_plan(current_lamports: u64, rent_exempt: u64) -> CreationPlan {
    if current_lamports == 0 {
        CreationPlan::Create {
            lamports: rent_exempt,
        }
    } else {
        CreationPlan::Adopt {
            top_up: rent_exempt.saturating_sub(current_lamports),
        }
    }
}

/// Create a hub-owned PDA with `space` bytes, funded for rent by `payer`.
pub fn create_pda_account<'info>(
    payer: &AccountInfo<'info>,
    account: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    space: usize,
    signer_seeds: &[&[u8]],
) -> Result<()> {
    let rent_exempt = Rent::get()?.minimum_balance(space);
    match creation_plan(account.lamports(), rent_exempt) {
        CreationPlan::Create { lamports } => system_program::create_account(
            CpiContext::new_with_signer(
                system_program.clone(),
                CreateAccount {
                    from: payer.clone(),
                    to: account.clone(),
                },
                &[signer_seeds],
            ),
            lamports,
            space as u64,
            &crate::ID,
        ),
        CreationPlan::Adopt { top_up } => {
            if top_up > 0 {
                system_program::transfer(
                    CpiContext::new(
                        system_program.clone(),
                        Transfer {
                            from: payer.clone(),
                            to: account.clone(),
                        },
                    ),
                    top_up,
                )?;
            }
            system_program::allocate(
                CpiContext::new_with_signer(
                    system_program.clone(),
                    Allocate {
                        account_to_allocate: account.clone(),
                    },
                    &[signer_seeds],
                ),
                space as u64,
            )?;
            system_program::assign(
                CpiContext::new_with_signer(
                    system_program.clone(),
                    Assign {
                        account_to_assign: account.clone(),
                    },
                    &[signer_seeds],
                ),
                &crate::ID,
            )
        }
    }
}

/// Serialize `value` (discriminator included) into `account`.
pub fn store_account<T: AccountSerialize>(account: &AccountInfo, value: &T) -> Result<()> {
    let mut data = account.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data;
    value.try_serialize(&mut writer)
}
