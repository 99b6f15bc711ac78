// =============================================================================
// SOCIAL HUB CONSTANTS
// =============================================================================
//
// PDA seeds, length limits and the typed-data domain. Changing any seed
// changes every derived address, so these are effectively part of the ABI.
// =============================================================================

pub const HUB_CONFIG_SEED: &[u8] = b"hub_config";
pub const HUB_AUTHORITY_SEED: &[u8] = b"hub_authority";
pub const MODULE_WHITELIST_SEED: &[u8] = b"module_whitelist";
pub const CREATOR_WHITELIST_SEED: &[u8] = b"creator_whitelist";
pub const SIG_NONCE_SEED: &[u8] = b"sig_nonce";
pub const PROFILE_SEED: &[u8] = b"profile";
pub const HANDLE_SEED: &[u8] = b"handle";
pub const PUBLICATION_SEED: &[u8] = b"publication";
pub const FOLLOW_REGISTRY_SEED: &[u8] = b"follow_registry";
pub const COLLECT_REGISTRY_SEED: &[u8] = b"collect_registry";
pub const RECEIPT_TOKEN_SEED: &[u8] = b"receipt_token";
pub const RECEIPT_HOLDER_SEED: &[u8] = b"receipt_holder";
pub const ALL_TOKENS_SEED: &[u8] = b"all_tokens";
pub const OWNED_TOKENS_SEED: &[u8] = b"owned_tokens";
pub const SUPPLY_CHECKPOINT_SEED: &[u8] = b"supply_checkpoint";
pub const POWER_CHECKPOINT_SEED: &[u8] = b"power_checkpoint";

pub const MAX_HANDLE_LENGTH: usize = 31;
pub const MAX_URI_LENGTH: usize = 256;

pub const DOMAIN_NAME: &[u8] = b"Social Hub Profiles";
pub const DOMAIN_VERSION: &[u8] = b"1";
pub const DOMAIN_TYPE: &[u8] =
    b"EIP712Domain(string name,string version,uint64 chainId,bytes32 verifyingProgram)";
