//! Fixtures shared by the unit tests.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::ed25519_program;
use anchor_lang::solana_program::instruction::Instruction;

use crate::errors::HubError;
use crate::state::{
    Checkpoint, HistoryKey, HubConfig, Profile, ProtocolState, Publication, ReceiptHolder,
    ReceiptStore, ReceiptToken, TokenList,
};

/// Anchor error number of a failed result.
pub fn error_code<T>(result: Result<T>) -> u32 {
    match result {
        Ok(_) => panic!("expected an error"),
        Err(Error::AnchorError(e)) => e.error_code_number,
        Err(other) => panic!("unexpected program error: {other:?}"),
    }
}

pub fn hub_config() -> HubConfig {
    HubConfig {
        governance: Pubkey::new_unique(),
        emergency_admin: Pubkey::new_unique(),
        state: ProtocolState::Unpaused,
        chain_id: 1,
        profile_counter: 0,
        authority_bump: 255,
        bump: 255,
    }
}

pub fn profile(profile_id: u64, owner: Pubkey) -> Profile {
    Profile {
        profile_id,
        owner,
        approved: None,
        handle: format!("profile{profile_id}"),
        image_uri: String::new(),
        follow_nft_uri: String::new(),
        pub_count: 0,
        follow_module: None,
        dispatcher: None,
        follow_registry: None,
        created_at: 0,
        burned: false,
        bump: 255,
    }
}

fn publication(profile_id: u64, pub_id: u64, pointer: (u64, u64)) -> Publication {
    Publication {
        profile_id,
        pub_id,
        pointed_profile_id: pointer.0,
        pointed_pub_id: pointer.1,
        content_uri: String::new(),
        collect_module: None,
        reference_module: None,
        created_at: 0,
        bump: 255,
    }
}

pub fn post(profile_id: u64, pub_id: u64, collect_module: Pubkey) -> Publication {
    Publication {
        content_uri: "ar://post".to_string(),
        collect_module: Some(collect_module),
        ..publication(profile_id, pub_id, (0, 0))
    }
}

pub fn comment(
    profile_id: u64,
    pub_id: u64,
    pointer: (u64, u64),
    collect_module: Pubkey,
) -> Publication {
    Publication {
        content_uri: "ar://comment".to_string(),
        collect_module: Some(collect_module),
        ..publication(profile_id, pub_id, pointer)
    }
}

pub fn mirror(profile_id: u64, pub_id: u64, pointer: (u64, u64)) -> Publication {
    publication(profile_id, pub_id, pointer)
}

/// An ed25519 precompile instruction in the layout wallets produce:
/// offsets header, then public key, signature and message.
pub fn ed25519_instruction(signer: &Pubkey, message: &[u8]) -> Instruction {
    const PUBKEY_OFFSET: u16 = 16;
    const SIGNATURE_OFFSET: u16 = PUBKEY_OFFSET + 32;
    const MESSAGE_OFFSET: u16 = SIGNATURE_OFFSET + 64;

    let mut data = vec![1u8, 0];
    for field in [
        SIGNATURE_OFFSET,
        u16::MAX,
        PUBKEY_OFFSET,
        u16::MAX,
        MESSAGE_OFFSET,
        message.len() as u16,
        u16::MAX,
    ] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    data.extend_from_slice(signer.as_ref());
    data.extend_from_slice(&[7u8; 64]);
    data.extend_from_slice(message);

    Instruction {
        program_id: ed25519_program::ID,
        accounts: vec![],
        data,
    }
}

/// Registry records kept in maps instead of accounts.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tokens: BTreeMap<u64, ReceiptToken>,
    holders: BTreeMap<Pubkey, ReceiptHolder>,
    slots: BTreeMap<(TokenList, u64), u64>,
    checkpoints: BTreeMap<(HistoryKey, u64), Checkpoint>,
}

impl MemoryStore {
    /// A whole history in index order.
    pub fn checkpoints(&self, history: HistoryKey) -> Vec<Checkpoint> {
        self.checkpoints
            .iter()
            .filter(|((key, _), _)| *key == history)
            .map(|(_, checkpoint)| *checkpoint)
            .collect()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

impl ReceiptStore for MemoryStore {
    fn token(&self, token_id: u64) -> Result<Option<ReceiptToken>> {
        Ok(self.tokens.get(&token_id).cloned())
    }

    fn put_token(&mut self, token: &ReceiptToken) -> Result<()> {
        self.tokens.insert(token.token_id, token.clone());
        Ok(())
    }

    fn holder(&self, holder: &Pubkey) -> Result<ReceiptHolder> {
        Ok(self.holders.get(holder).cloned().unwrap_or_default())
    }

    fn put_holder(&mut self, holder: &Pubkey, record: &ReceiptHolder) -> Result<()> {
        self.holders.insert(*holder, record.clone());
        Ok(())
    }

    fn slot(&self, list: TokenList, index: u64) -> Result<u64> {
        self.slots
            .get(&(list, index))
            .copied()
            .ok_or_else(|| error!(HubError::RecordInvalid))
    }

    fn put_slot(&mut self, list: TokenList, index: u64, token_id: u64) -> Result<()> {
        self.slots.insert((list, index), token_id);
        Ok(())
    }

    fn checkpoint(&self, history: HistoryKey, index: u64) -> Result<Checkpoint> {
        self.checkpoints
            .get(&(history, index))
            .copied()
            .ok_or_else(|| error!(HubError::RecordInvalid))
    }

    fn put_checkpoint(
        &mut self,
        history: HistoryKey,
        index: u64,
        checkpoint: &Checkpoint,
    ) -> Result<()> {
        self.checkpoints.insert((history, index), *checkpoint);
        Ok(())
    }
}
