//! End-to-end flows over the hub's state layer: signed actions, publication
//! classification and follow receipts.

use std::collections::HashMap;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::ed25519_program;
use anchor_lang::solana_program::instruction::Instruction;
use social_hub::errors::HubError;
use social_hub::signature::{authorize_action, SignedAction, TypedDataSignature};
use social_hub::state::{
    pub_type_of, resolve_root, Checkpoint, FollowRegistry, HistoryKey, HubConfig, ProtocolState,
    PubType, Publication, ReceiptHolder, ReceiptStore, ReceiptToken, SigNonce, TokenList,
};

fn error_code<T>(result: Result<T>) -> u32 {
    match result {
        Ok(_) => panic!("expected an error"),
        Err(Error::AnchorError(e)) => e.error_code_number,
        Err(other) => panic!("unexpected program error: {other:?}"),
    }
}

fn hub_config() -> HubConfig {
    HubConfig {
        governance: Pubkey::new_unique(),
        emergency_admin: Pubkey::new_unique(),
        state: ProtocolState::Unpaused,
        chain_id: 101,
        profile_counter: 0,
        authority_bump: 254,
        bump: 255,
    }
}

fn nonce_for(principal: Pubkey) -> SigNonce {
    SigNonce {
        principal,
        nonce: 0,
        bump: 255,
    }
}

/// Precompile instruction attesting `message` was signed by `signer`.
fn attestation(signer: &Pubkey, message: &[u8]) -> Instruction {
    let mut data = vec![1u8, 0];
    for field in [48u16, u16::MAX, 16, u16::MAX, 112, message.len() as u16, u16::MAX] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    data.extend_from_slice(signer.as_ref());
    data.extend_from_slice(&[9u8; 64]);
    data.extend_from_slice(message);
    Instruction {
        program_id: ed25519_program::ID,
        accounts: vec![],
        data,
    }
}

fn publication(profile_id: u64, pub_id: u64, pointer: (u64, u64), module: Option<Pubkey>) -> Publication {
    Publication {
        profile_id,
        pub_id,
        pointed_profile_id: pointer.0,
        pointed_pub_id: pointer.1,
        content_uri: if module.is_some() { "ar://content".to_string() } else { String::new() },
        collect_module: module,
        reference_module: None,
        created_at: 0,
        bump: 255,
    }
}

#[test]
fn relayed_signature_acts_for_the_signer() {
    let config = hub_config();
    let alice = Pubkey::new_unique();
    let relayer = Pubkey::new_unique();
    let mut nonce = nonce_for(alice);
    let payload = b"ar://avatar".to_vec();

    let digest = config.typed_data_digest(SignedAction::SetProfileImageUri, &payload, 0, 1_000);
    let ix = attestation(&alice, &digest);
    let actor = authorize_action(
        &config,
        &relayer,
        &alice,
        &mut nonce,
        SignedAction::SetProfileImageUri,
        &payload,
        Some(TypedDataSignature { deadline: 1_000 }),
        999,
        Some(&ix),
    )
    .unwrap();

    assert_eq!(actor, alice);
    assert_eq!(nonce.nonce, 1);

    // the same signature cannot be replayed at the next nonce
    assert_eq!(
        error_code(authorize_action(
            &config,
            &relayer,
            &alice,
            &mut nonce,
            SignedAction::SetProfileImageUri,
            &payload,
            Some(TypedDataSignature { deadline: 1_000 }),
            999,
            Some(&ix),
        )),
        u32::from(HubError::SignatureInvalid)
    );
    assert_eq!(nonce.nonce, 1);
}

#[test]
fn direct_action_cancels_an_outstanding_signature() {
    let config = hub_config();
    let alice = Pubkey::new_unique();
    let mut nonce = nonce_for(alice);
    let payload = vec![1u8, 2, 3];

    let digest = config.typed_data_digest(SignedAction::Post, &payload, 0, 50);
    let ix = attestation(&alice, &digest);

    authorize_action(&config, &alice, &alice, &mut nonce, SignedAction::Post, &payload, None, 10, None)
        .unwrap();

    assert_eq!(
        error_code(authorize_action(
            &config,
            &Pubkey::new_unique(),
            &alice,
            &mut nonce,
            SignedAction::Post,
            &payload,
            Some(TypedDataSignature { deadline: 50 }),
            10,
            Some(&ix),
        )),
        u32::from(HubError::SignatureInvalid)
    );
}

#[test]
fn expiry_is_reported_before_a_bad_attestation() {
    let config = hub_config();
    let alice = Pubkey::new_unique();
    let mut nonce = nonce_for(alice);

    assert_eq!(
        error_code(authorize_action(
            &config,
            &alice,
            &alice,
            &mut nonce,
            SignedAction::Follow,
            &[],
            Some(TypedDataSignature { deadline: 5 }),
            6,
            None,
        )),
        u32::from(HubError::SignatureExpired)
    );
    assert_eq!(nonce.nonce, 0);
}

#[test]
fn signatures_are_bound_to_the_chain() {
    let config = hub_config();
    let other_chain = HubConfig {
        chain_id: config.chain_id + 1,
        ..hub_config()
    };
    let alice = Pubkey::new_unique();
    let mut nonce = nonce_for(alice);

    let digest = other_chain.typed_data_digest(SignedAction::Mirror, &[], 0, 100);
    let ix = attestation(&alice, &digest);
    assert_eq!(
        error_code(authorize_action(
            &config,
            &alice,
            &alice,
            &mut nonce,
            SignedAction::Mirror,
            &[],
            Some(TypedDataSignature { deadline: 100 }),
            1,
            Some(&ix),
        )),
        u32::from(HubError::SignatureInvalid)
    );
}

#[test]
fn publications_classify_and_collect_through_any_mirror_depth() {
    let module = Pubkey::new_unique();
    let mut graph: HashMap<(u64, u64), Publication> = HashMap::new();
    graph.insert((1, 1), publication(1, 1, (0, 0), Some(module)));
    graph.insert((1, 2), publication(1, 2, (1, 1), Some(module)));
    graph.insert((1, 3), publication(1, 3, (1, 1), None));

    let types: Vec<PubType> = (1..=4).map(|id| pub_type_of(3, id, graph.get(&(1, id)))).collect();
    assert_eq!(
        types,
        vec![PubType::Post, PubType::Comment, PubType::Mirror, PubType::Nonexistent]
    );

    // profiles 2..=6 each mirror the previous mirror
    let mut previous = (1, 3);
    for profile_id in 2..=6 {
        graph.insert((profile_id, 1), publication(profile_id, 1, previous, None));
        previous = (profile_id, 1);
    }

    let fetch = |profile_id: u64, pub_id: u64| {
        graph
            .get(&(profile_id, pub_id))
            .cloned()
            .ok_or_else(|| error!(HubError::PublicationDoesNotExist))
    };
    for profile_id in 2..=6 {
        let root = resolve_root(graph[&(profile_id, 1)].clone(), fetch).unwrap();
        assert_eq!(root.id(), (1, 1));
        assert_eq!(root.collect_module, Some(module));
    }
}

/// Registry records held in maps, through the public store interface.
#[derive(Default)]
struct MapStore {
    tokens: HashMap<u64, ReceiptToken>,
    holders: HashMap<Pubkey, ReceiptHolder>,
    slots: HashMap<(TokenList, u64), u64>,
    checkpoints: HashMap<(HistoryKey, u64), Checkpoint>,
}

impl ReceiptStore for MapStore {
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

    fn put_checkpoint(&mut self, history: HistoryKey, index: u64, checkpoint: &Checkpoint) -> Result<()> {
        self.checkpoints.insert((history, index), *checkpoint);
        Ok(())
    }
}

#[test]
fn following_three_times_then_delegating() {
    let mut store = MapStore::default();
    let mut registry = FollowRegistry::new(1, 255);
    let alice = Pubkey::new_unique();
    let bob = Pubkey::new_unique();

    let ids: Vec<u64> = (0..3)
        .map(|_| registry.mint(&mut store, alice, 1_700_000_000, 10).unwrap().0)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(registry.ledger.balance_of(&store, &alice).unwrap(), 3);
    assert_eq!(registry.power_of(&store, &alice).unwrap(), 0);

    let changes = registry.delegate(&mut store, alice, Some(bob), 11).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].delegatee, bob);
    assert_eq!(changes[0].new_power, 3);

    // giving a token away moves its unit of power off bob
    registry
        .transfer(&mut store, 2, &alice, Pubkey::new_unique(), 12)
        .unwrap();
    assert_eq!(registry.power_by_block_number(&store, &bob, 10, 12).unwrap(), 0);
    assert_eq!(registry.power_by_block_number(&store, &bob, 11, 12).unwrap(), 3);
    assert_eq!(registry.power_by_block_number(&store, &bob, 12, 12).unwrap(), 2);
    assert_eq!(registry.delegated_supply_by_block_number(&store, 12, 12).unwrap(), 2);
    assert_eq!(
        error_code(registry.power_by_block_number(&store, &bob, 13, 12)),
        u32::from(HubError::BlockNumberInvalid)
    );

    // alice's remaining tokens are enumerable in her list
    let mut held: Vec<u64> = (0..2)
        .map(|i| registry.ledger.token_of_owner_by_index(&store, &alice, i).unwrap())
        .collect();
    held.sort();
    assert_eq!(held, vec![1, 3]);
}
