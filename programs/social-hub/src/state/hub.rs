use anchor_lang::prelude::*;

use crate::errors::HubError;
use crate::signature::{self, SignedAction};

/// Global protocol state. Ordering is by restrictiveness.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProtocolState {
    Unpaused,
    PublishingPaused,
    Paused,
}

/// How an entry point is gated by the protocol state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Gate {
    /// Runs in every state
    Open,
    /// Blocked only by `Paused`
    NotPaused,
    /// Blocked by `PublishingPaused` and `Paused`
    Publishing,
}

/// Entry points that consult the protocol state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HubAction {
    CreateProfile,
    SetFollowModule,
    SetDispatcher,
    SetProfileImageUri,
    SetFollowNftUri,
    ApproveProfile,
    TransferProfile,
    BurnProfile,
    Post,
    Comment,
    Mirror,
    Follow,
    Collect,
    DelegateFollowPower,
}

impl HubAction {
    pub fn gate(self) -> Gate {
        match self {
            HubAction::ApproveProfile | HubAction::DelegateFollowPower => Gate::Open,
            HubAction::Post | HubAction::Comment | HubAction::Mirror => Gate::Publishing,
            HubAction::CreateProfile
            | HubAction::SetFollowModule
            | HubAction::SetDispatcher
            | HubAction::SetProfileImageUri
            | HubAction::SetFollowNftUri
            | HubAction::TransferProfile
            | HubAction::BurnProfile
            | HubAction::Follow
            | HubAction::Collect => Gate::NotPaused,
        }
    }
}

// =============================================================================
// HUB CONFIG
// =============================================================================
// Single governance-controlled root. Passed by reference into every
// instruction that needs the state gate, the typed-data domain or the
// module-callback signer.
// =============================================================================

#[account]
pub struct HubConfig {
    /// May change governance, the emergency admin, whitelists and state
    pub governance: Pubkey,
    /// May change protocol state only
    pub emergency_admin: Pubkey,
    /// Current protocol state
    pub state: ProtocolState,
    /// Chain identifier bound into every signature domain
    pub chain_id: u64,
    /// Last assigned profile id (ids start at 1)
    pub profile_counter: u64,
    /// Bump of the hub authority PDA that signs module callbacks
    pub authority_bump: u8,
    /// PDA bump seed
    pub bump: u8,
}

impl HubConfig {
    pub const SIZE: usize = 8 +  // discriminator
        32 +                     // governance
        32 +                     // emergency_admin
        1 +                      // state
        8 +                      // chain_id
        8 +                      // profile_counter
        1 +                      // authority_bump
        1;                       // bump

    pub fn is_governance(&self, caller: &Pubkey) -> bool {
        self.governance == *caller
    }

    pub fn can_set_state(&self, caller: &Pubkey) -> bool {
        self.governance == *caller || self.emergency_admin == *caller
    }

    /// Reject `action` if the current protocol state forbids it.
    pub fn check_gate(&self, action: HubAction) -> Result<()> {
        match (action.gate(), self.state) {
            (Gate::Open, _) | (_, ProtocolState::Unpaused) => Ok(()),
            (_, ProtocolState::Paused) => err!(HubError::Paused),
            (Gate::NotPaused, ProtocolState::PublishingPaused) => Ok(()),
            (Gate::Publishing, ProtocolState::PublishingPaused) => {
                err!(HubError::PublishingPaused)
            }
        }
    }

    pub fn next_profile_id(&self) -> u64 {
        self.profile_counter + 1
    }

    pub fn domain_separator(&self) -> [u8; 32] {
        signature::domain_separator(self.chain_id, &crate::ID)
    }

    pub fn typed_data_digest(
        &self,
        action: SignedAction,
        payload: &[u8],
        nonce: u64,
        deadline: i64,
    ) -> [u8; 32] {
        signature::typed_data_digest(&self.domain_separator(), action, payload, nonce, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::error_code;

    fn config(state: ProtocolState) -> HubConfig {
        HubConfig {
            governance: Pubkey::new_unique(),
            emergency_admin: Pubkey::new_unique(),
            state,
            chain_id: 1,
            profile_counter: 0,
            authority_bump: 255,
            bump: 255,
        }
    }

    const ALL_ACTIONS: [HubAction; 14] = [
        HubAction::CreateProfile,
        HubAction::SetFollowModule,
        HubAction::SetDispatcher,
        HubAction::SetProfileImageUri,
        HubAction::SetFollowNftUri,
        HubAction::ApproveProfile,
        HubAction::TransferProfile,
        HubAction::BurnProfile,
        HubAction::Post,
        HubAction::Comment,
        HubAction::Mirror,
        HubAction::Follow,
        HubAction::Collect,
        HubAction::DelegateFollowPower,
    ];

    #[test]
    fn unpaused_permits_everything() {
        let hub = config(ProtocolState::Unpaused);
        for action in ALL_ACTIONS {
            assert!(hub.check_gate(action).is_ok(), "{action:?}");
        }
    }

    #[test]
    fn publishing_paused_only_blocks_publishing() {
        let hub = config(ProtocolState::PublishingPaused);
        for action in [HubAction::Post, HubAction::Comment, HubAction::Mirror] {
            assert_eq!(
                error_code(hub.check_gate(action)),
                u32::from(HubError::PublishingPaused),
                "{action:?}"
            );
        }
        for action in [
            HubAction::Follow,
            HubAction::Collect,
            HubAction::CreateProfile,
            HubAction::TransferProfile,
            HubAction::BurnProfile,
            HubAction::SetFollowModule,
            HubAction::DelegateFollowPower,
        ] {
            assert!(hub.check_gate(action).is_ok(), "{action:?}");
        }
    }

    #[test]
    fn paused_blocks_all_but_approval_and_delegation() {
        let hub = config(ProtocolState::Paused);
        for action in ALL_ACTIONS {
            match action.gate() {
                Gate::Open => assert!(hub.check_gate(action).is_ok(), "{action:?}"),
                _ => assert_eq!(
                    error_code(hub.check_gate(action)),
                    u32::from(HubError::Paused),
                    "{action:?}"
                ),
            }
        }
        assert_eq!(HubAction::ApproveProfile.gate(), Gate::Open);
        assert_eq!(HubAction::DelegateFollowPower.gate(), Gate::Open);
    }

    #[test]
    fn emergency_admin_may_set_state_but_is_not_governance() {
        let hub = config(ProtocolState::Unpaused);
        assert!(hub.can_set_state(&hub.emergency_admin));
        assert!(hub.can_set_state(&hub.governance));
        assert!(!hub.is_governance(&hub.emergency_admin));
        assert!(!hub.can_set_state(&Pubkey::new_unique()));
    }

    #[test]
    fn domain_is_bound_to_chain_id() {
        let mut hub = config(ProtocolState::Unpaused);
        let first = hub.domain_separator();
        hub.chain_id = 2;
        assert_ne!(first, hub.domain_separator());
    }
}
