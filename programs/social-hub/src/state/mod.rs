// =============================================================================
// SOCIAL HUB STATE MODULE
// =============================================================================
//
// Every persistent record is a PDA owned by the hub program:
// - HubConfig: governance root, protocol state, profile counter
// - ModuleWhitelist / ProfileCreatorWhitelist: governance-controlled allow lists
// - SigNonce: per-principal signature nonce
// - Profile / HandleRecord / Publication: the social graph
// - FollowRegistry / CollectRegistry: receipt ledger headers, created on first use
// - ReceiptToken / ReceiptHolder / TokenSlot / Checkpoint: fixed-size records
//   under a registry, one account each
// =============================================================================

pub mod hub;
pub mod whitelist;
pub mod nonce;
pub mod profile;
pub mod publication;
pub mod receipt;
pub mod follow_registry;

pub use hub::*;
pub use whitelist::*;
pub use nonce::*;
pub use profile::*;
pub use publication::*;
pub use receipt::*;
pub use follow_registry::*;
