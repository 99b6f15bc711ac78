use anchor_lang::prelude::*;

use crate::errors::HubError;

/// The three module capabilities a program can be whitelisted for.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ModuleKind {
    Follow,
    Collect,
    Reference,
}

impl ModuleKind {
    pub fn not_whitelisted_error(self) -> HubError {
        match self {
            ModuleKind::Follow => HubError::FollowModuleNotWhitelisted,
            ModuleKind::Collect => HubError::CollectModuleNotWhitelisted,
            ModuleKind::Reference => HubError::ReferenceModuleNotWhitelisted,
        }
    }
}

// =============================================================================
// MODULE WHITELIST
// =============================================================================
// One account per module program, one flag per capability. Checked only when
// a module is first configured; de-whitelisting never breaks existing
// profiles or publications.
// =============================================================================

#[account]
pub struct ModuleWhitelist {
    /// The module program this entry describes
    pub module: Pubkey,
    pub follow: bool,
    pub collect: bool,
    pub reference: bool,
    /// PDA bump seed
    pub bump: u8,
}

impl ModuleWhitelist {
    pub const SIZE: usize = 8 + 32 + 1 + 1 + 1 + 1;

    pub fn is_whitelisted(&self, kind: ModuleKind) -> bool {
        match kind {
            ModuleKind::Follow => self.follow,
            ModuleKind::Collect => self.collect,
            ModuleKind::Reference => self.reference,
        }
    }

    pub fn set(&mut self, kind: ModuleKind, whitelisted: bool) {
        match kind {
            ModuleKind::Follow => self.follow = whitelisted,
            ModuleKind::Collect => self.collect = whitelisted,
            ModuleKind::Reference => self.reference = whitelisted,
        }
    }
}

/// Reject `module` unless `entry` whitelists it for `kind`.
pub fn require_whitelisted(
    kind: ModuleKind,
    module: &Pubkey,
    entry: Option<&ModuleWhitelist>,
) -> Result<()> {
    let whitelisted = entry.map_or(false, |w| w.module == *module && w.is_whitelisted(kind));
    require!(whitelisted, kind.not_whitelisted_error());
    Ok(())
}

#[account]
pub struct ProfileCreatorWhitelist {
    pub creator: Pubkey,
    pub whitelisted: bool,
    /// PDA bump seed
    pub bump: u8,
}

impl ProfileCreatorWhitelist {
    pub const SIZE: usize = 8 + 32 + 1 + 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::error_code;

    fn entry(module: Pubkey) -> ModuleWhitelist {
        ModuleWhitelist {
            module,
            follow: false,
            collect: false,
            reference: false,
            bump: 255,
        }
    }

    #[test]
    fn flags_are_independent_per_kind() {
        let module = Pubkey::new_unique();
        let mut w = entry(module);
        w.set(ModuleKind::Collect, true);

        assert!(require_whitelisted(ModuleKind::Collect, &module, Some(&w)).is_ok());
        assert_eq!(
            error_code(require_whitelisted(ModuleKind::Follow, &module, Some(&w))),
            u32::from(HubError::FollowModuleNotWhitelisted)
        );
        assert_eq!(
            error_code(require_whitelisted(ModuleKind::Reference, &module, Some(&w))),
            u32::from(HubError::ReferenceModuleNotWhitelisted)
        );
    }

    #[test]
    fn entry_for_another_module_does_not_count() {
        let mut w = entry(Pubkey::new_unique());
        w.set(ModuleKind::Follow, true);
        assert_eq!(
            error_code(require_whitelisted(ModuleKind::Follow, &Pubkey::new_unique(), Some(&w))),
            u32::from(HubError::FollowModuleNotWhitelisted)
        );
    }

    #[test]
    fn missing_entry_is_not_whitelisted() {
        assert_eq!(
            error_code(require_whitelisted(ModuleKind::Collect, &Pubkey::new_unique(), None)),
            u32::from(HubError::CollectModuleNotWhitelisted)
        );
    }
}
