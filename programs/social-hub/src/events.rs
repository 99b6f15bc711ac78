use anchor_lang::prelude::*;

use crate::state::{ModuleKind, ProtocolState};

// === Governance ===

#[event]
pub struct GovernanceSet {
    pub caller: Pubkey,
    pub previous: Pubkey,
    pub new: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct EmergencyAdminSet {
    pub caller: Pubkey,
    pub previous: Pubkey,
    pub new: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct StateSet {
    pub caller: Pubkey,
    pub previous: ProtocolState,
    pub new: ProtocolState,
    pub timestamp: i64,
}

#[event]
pub struct ProfileCreatorWhitelisted {
    pub creator: Pubkey,
    pub whitelisted: bool,
    pub timestamp: i64,
}

#[event]
pub struct ModuleWhitelisted {
    pub module: Pubkey,
    pub kind: ModuleKind,
    pub whitelisted: bool,
    pub timestamp: i64,
}

#[event]
pub struct NonceIncremented {
    pub principal: Pubkey,
    pub nonce: u64,
    pub timestamp: i64,
}

// === Profiles ===

#[event]
pub struct ProfileCreated {
    pub profile_id: u64,
    pub creator: Pubkey,
    pub to: Pubkey,
    pub handle: String,
    pub image_uri: String,
    pub follow_module: Option<Pubkey>,
    pub follow_module_return_data: Vec<u8>,
    pub follow_nft_uri: String,
    pub timestamp: i64,
}

#[event]
pub struct FollowModuleSet {
    pub profile_id: u64,
    pub follow_module: Option<Pubkey>,
    pub follow_module_return_data: Vec<u8>,
    pub timestamp: i64,
}

#[event]
pub struct DispatcherSet {
    pub profile_id: u64,
    pub dispatcher: Option<Pubkey>,
    pub timestamp: i64,
}

#[event]
pub struct ProfileImageUriSet {
    pub profile_id: u64,
    pub image_uri: String,
    pub timestamp: i64,
}

#[event]
pub struct FollowNftUriSet {
    pub profile_id: u64,
    pub follow_nft_uri: String,
    pub timestamp: i64,
}

#[event]
pub struct ProfileApproved {
    pub profile_id: u64,
    pub owner: Pubkey,
    pub approved: Option<Pubkey>,
    pub timestamp: i64,
}

#[event]
pub struct ProfileTransferred {
    pub profile_id: u64,
    pub from: Pubkey,
    pub to: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct ProfileBurned {
    pub profile_id: u64,
    pub owner: Pubkey,
    pub timestamp: i64,
}

// === Publishing ===

#[event]
pub struct PostCreated {
    pub profile_id: u64,
    pub pub_id: u64,
    pub content_uri: String,
    pub collect_module: Pubkey,
    pub collect_module_return_data: Vec<u8>,
    pub reference_module: Option<Pubkey>,
    pub reference_module_return_data: Vec<u8>,
    pub timestamp: i64,
}

#[event]
pub struct CommentCreated {
    pub profile_id: u64,
    pub pub_id: u64,
    pub content_uri: String,
    pub profile_id_pointed: u64,
    pub pub_id_pointed: u64,
    pub collect_module: Pubkey,
    pub collect_module_return_data: Vec<u8>,
    pub reference_module: Option<Pubkey>,
    pub reference_module_return_data: Vec<u8>,
    pub timestamp: i64,
}

#[event]
pub struct MirrorCreated {
    pub profile_id: u64,
    pub pub_id: u64,
    pub profile_id_pointed: u64,
    pub pub_id_pointed: u64,
    pub reference_module: Option<Pubkey>,
    pub reference_module_return_data: Vec<u8>,
    pub timestamp: i64,
}

// === Follow and collect ===

#[event]
pub struct FollowRegistryDeployed {
    pub profile_id: u64,
    pub registry: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct Followed {
    pub follower: Pubkey,
    pub profile_ids: Vec<u64>,
    pub token_ids: Vec<u64>,
    pub timestamp: i64,
}

#[event]
pub struct CollectRegistryDeployed {
    pub profile_id: u64,
    pub pub_id: u64,
    pub registry: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct Collected {
    pub collector: Pubkey,
    pub profile_id: u64,
    pub pub_id: u64,
    pub root_profile_id: u64,
    pub root_pub_id: u64,
    pub token_id: u64,
    pub timestamp: i64,
}

#[event]
pub struct ReceiptTransferred {
    pub registry: Pubkey,
    pub token_id: u64,
    pub from: Pubkey,
    pub to: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct ReceiptApproved {
    pub registry: Pubkey,
    pub token_id: u64,
    pub owner: Pubkey,
    pub approved: Option<Pubkey>,
    pub timestamp: i64,
}

#[event]
pub struct ReceiptBurned {
    pub registry: Pubkey,
    pub token_id: u64,
    pub owner: Pubkey,
    pub timestamp: i64,
}

// === Delegation ===

#[event]
pub struct DelegateChanged {
    pub profile_id: u64,
    pub delegator: Pubkey,
    pub previous: Option<Pubkey>,
    pub new: Option<Pubkey>,
    pub block_number: u64,
}

#[event]
pub struct DelegatedPowerChanged {
    pub profile_id: u64,
    pub delegatee: Pubkey,
    pub new_power: u64,
    pub block_number: u64,
}
