use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

use crate::constants::{MAX_HANDLE_LENGTH, MAX_URI_LENGTH};
use crate::errors::HubError;

// =============================================================================
// PROFILE
// =============================================================================
// A numeric social identity. The profile itself is the transferable entry:
// `owner` changes on transfer and becomes the default key on burn. Burning
// leaves publications intact but releases the handle.
// =============================================================================

#[account]
pub struct Profile {
    /// Sequential id, starting at 1
    pub profile_id: u64,
    /// Current owner; default key once burned
    pub owner: Pubkey,
    /// Single address allowed to transfer or burn on the owner's behalf
    pub approved: Option<Pubkey>,
    /// Unique, immutable handle
    pub handle: String,
    pub image_uri: String,
    pub follow_nft_uri: String,
    /// Number of publications created so far
    pub pub_count: u64,
    /// Module consulted on every follow
    pub follow_module: Option<Pubkey>,
    /// Second address allowed to publish and edit metadata
    pub dispatcher: Option<Pubkey>,
    /// Follow registry, assigned on first follow
    pub follow_registry: Option<Pubkey>,
    pub created_at: i64,
    pub burned: bool,
    /// PDA bump seed
    pub bump: u8,
}

impl Profile {
    pub const SIZE: usize = 8 +         // discriminator
        8 +                             // profile_id
        32 +                            // owner
        33 +                            // approved
        4 + MAX_HANDLE_LENGTH +         // handle
        4 + MAX_URI_LENGTH +            // image_uri
        4 + MAX_URI_LENGTH +            // follow_nft_uri
        8 +                             // pub_count
        33 +                            // follow_module
        33 +                            // dispatcher
        33 +                            // follow_registry
        8 +                             // created_at
        1 +                             // burned
        1;                              // bump

    pub fn exists(&self) -> bool {
        self.profile_id != 0 && !self.burned
    }

    pub fn is_owner(&self, caller: &Pubkey) -> bool {
        self.exists() && self.owner == *caller
    }

    pub fn is_owner_or_dispatcher(&self, caller: &Pubkey) -> bool {
        self.is_owner(caller) || (self.exists() && self.dispatcher == Some(*caller))
    }

    pub fn is_owner_or_approved(&self, caller: &Pubkey) -> bool {
        self.is_owner(caller) || (self.exists() && self.approved == Some(*caller))
    }

    pub fn require_owner(&self, caller: &Pubkey) -> Result<()> {
        require!(self.exists(), HubError::ProfileNotFound);
        require!(self.is_owner(caller), HubError::NotProfileOwner);
        Ok(())
    }

    pub fn require_owner_or_dispatcher(&self, caller: &Pubkey) -> Result<()> {
        require!(self.exists(), HubError::ProfileNotFound);
        require!(
            self.is_owner_or_dispatcher(caller),
            HubError::NotProfileOwnerOrDispatcher
        );
        Ok(())
    }

    pub fn require_owner_or_approved(&self, caller: &Pubkey) -> Result<()> {
        require!(self.exists(), HubError::ProfileNotFound);
        require!(self.is_owner_or_approved(caller), HubError::NotOwnerOrApproved);
        Ok(())
    }

    /// Reserve the next publication id.
    pub fn next_pub_id(&mut self) -> u64 {
        self.pub_count += 1;
        self.pub_count
    }

    /// Hand the profile to a new owner. Dispatcher and approval do not follow.
    pub fn transfer(&mut self, to: Pubkey) -> Result<()> {
        require!(to != Pubkey::default(), HubError::InvalidRecipient);
        self.owner = to;
        self.approved = None;
        self.dispatcher = None;
        Ok(())
    }

    pub fn burn(&mut self) {
        self.owner = Pubkey::default();
        self.approved = None;
        self.dispatcher = None;
        self.follow_module = None;
        self.burned = true;
    }
}

/// Reserves a handle. Closed when the owning profile is burned.
#[account]
pub struct HandleRecord {
    pub profile_id: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl HandleRecord {
    pub const SIZE: usize = 8 + 8 + 1;
}

/// Seed of a handle's reservation record. Hashed so any valid handle fits
/// the 32-byte seed limit.
pub fn handle_seed(handle: &str) -> [u8; 32] {
    keccak::hash(handle.as_bytes()).0
}

/// Handles are lowercase `[a-z0-9._-]`, 1 to 31 bytes, not starting with '.'.
pub fn validate_handle(handle: &str) -> Result<()> {
    let bytes = handle.as_bytes();
    require!(
        !bytes.is_empty() && bytes.len() <= MAX_HANDLE_LENGTH,
        HubError::HandleLengthInvalid
    );
    require!(bytes[0] != b'.', HubError::HandleFirstCharInvalid);
    let valid = bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'.' | b'_' | b'-'));
    require!(valid, HubError::HandleContainsInvalidCharacters);
    Ok(())
}

pub fn validate_uri(uri: &str) -> Result<()> {
    require!(uri.len() <= MAX_URI_LENGTH, HubError::UriTooLong);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{error_code, profile};

    #[test]
    fn accepts_well_formed_handles() {
        for handle in ["alice", "a", "bob.social", "x_y-z", "0123456789012345678901234567890"] {
            assert!(validate_handle(handle).is_ok(), "{handle}");
        }
    }

    #[test]
    fn rejects_bad_lengths() {
        assert_eq!(error_code(validate_handle("")), u32::from(HubError::HandleLengthInvalid));
        let long = "a".repeat(MAX_HANDLE_LENGTH + 1);
        assert_eq!(error_code(validate_handle(&long)), u32::from(HubError::HandleLengthInvalid));
    }

    #[test]
    fn rejects_uppercase_and_symbols() {
        for handle in ["Alice", "al ice", "al@ice", "ali/ce"] {
            assert_eq!(
                error_code(validate_handle(handle)),
                u32::from(HubError::HandleContainsInvalidCharacters),
                "{handle}"
            );
        }
        assert_eq!(error_code(validate_handle(".alice")), u32::from(HubError::HandleFirstCharInvalid));
    }

    #[test]
    fn dispatcher_can_publish_but_not_transfer() {
        let owner = Pubkey::new_unique();
        let dispatcher = Pubkey::new_unique();
        let mut p = profile(1, owner);
        p.dispatcher = Some(dispatcher);

        assert!(p.require_owner_or_dispatcher(&dispatcher).is_ok());
        assert_eq!(
            error_code(p.require_owner_or_approved(&dispatcher)),
            u32::from(HubError::NotOwnerOrApproved)
        );
        assert_eq!(error_code(p.require_owner(&dispatcher)), u32::from(HubError::NotProfileOwner));
    }

    #[test]
    fn transfer_clears_dispatcher_and_approval() {
        let owner = Pubkey::new_unique();
        let buyer = Pubkey::new_unique();
        let mut p = profile(1, owner);
        p.dispatcher = Some(Pubkey::new_unique());
        p.approved = Some(buyer);

        p.transfer(buyer).unwrap();
        assert_eq!(p.owner, buyer);
        assert_eq!(p.dispatcher, None);
        assert_eq!(p.approved, None);
        assert_eq!(
            error_code(p.transfer(Pubkey::default())),
            u32::from(HubError::InvalidRecipient)
        );
    }

    #[test]
    fn burned_profile_keeps_publication_count() {
        let owner = Pubkey::new_unique();
        let mut p = profile(3, owner);
        p.follow_module = Some(Pubkey::new_unique());
        p.next_pub_id();
        p.next_pub_id();
        p.burn();

        assert!(!p.exists());
        assert_eq!(p.pub_count, 2);
        assert_eq!(p.follow_module, None);
        assert_eq!(error_code(p.require_owner(&owner)), u32::from(HubError::ProfileNotFound));
    }

    #[test]
    fn publication_ids_are_sequential_from_one() {
        let mut p = profile(1, Pubkey::new_unique());
        assert_eq!(p.next_pub_id(), 1);
        assert_eq!(p.next_pub_id(), 2);
        assert_eq!(p.pub_count, 2);
    }
}
