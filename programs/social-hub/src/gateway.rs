use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::{get_return_data, invoke_signed};

use crate::constants::HUB_AUTHORITY_SEED;
use crate::errors::HubError;
use crate::signature::encode;
use crate::state::{require_whitelisted, ModuleKind, ModuleWhitelist};

// =============================================================================
// MODULE GATEWAY
// =============================================================================
//
// The only place the hub calls into a module program. Every call is signed by
// the hub authority PDA, which is what modules check to reject callers other
// than the hub.
//
// CPI account layout:
//   [hub_authority (signer), module_state (writable), ...call accounts]
//
// Visibility: modules see hub accounts as they were serialized when the CPI
// was issued. Typed accounts of the calling instruction are only written
// back at instruction exit, so a module always observes the pre-instruction
// profile and publication. Follow and collect modules run before the mint,
// so the token being minted is never visible to them.
// =============================================================================

/// One module callback with its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleCall {
    InitializeFollow {
        profile_id: u64,
        data: Vec<u8>,
    },
    ProcessFollow {
        follower: Pubkey,
        profile_id: u64,
        data: Vec<u8>,
    },
    InitializeCollect {
        profile_id: u64,
        pub_id: u64,
        data: Vec<u8>,
    },
    ProcessCollect {
        referrer_profile_id: u64,
        collector: Pubkey,
        profile_id: u64,
        pub_id: u64,
        data: Vec<u8>,
    },
    InitializeReference {
        profile_id: u64,
        pub_id: u64,
        data: Vec<u8>,
    },
    ProcessComment {
        profile_id: u64,
        pointed_profile_id: u64,
        pointed_pub_id: u64,
        data: Vec<u8>,
    },
    ProcessMirror {
        profile_id: u64,
        pointed_profile_id: u64,
        pointed_pub_id: u64,
        data: Vec<u8>,
    },
}

impl ModuleCall {
    /// Instruction name on the module program.
    pub fn method(&self) -> &'static str {
        match self {
            ModuleCall::InitializeFollow { .. } => "initialize_follow_module",
            ModuleCall::ProcessFollow { .. } => "process_follow",
            ModuleCall::InitializeCollect { .. } => "initialize_publication_collect_module",
            ModuleCall::ProcessCollect { .. } => "process_collect",
            ModuleCall::InitializeReference { .. } => "initialize_reference_module",
            ModuleCall::ProcessComment { .. } => "process_comment",
            ModuleCall::ProcessMirror { .. } => "process_mirror",
        }
    }

    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleCall::InitializeFollow { .. } | ModuleCall::ProcessFollow { .. } => {
                ModuleKind::Follow
            }
            ModuleCall::InitializeCollect { .. } | ModuleCall::ProcessCollect { .. } => {
                ModuleKind::Collect
            }
            ModuleCall::InitializeReference { .. }
            | ModuleCall::ProcessComment { .. }
            | ModuleCall::ProcessMirror { .. } => ModuleKind::Reference,
        }
    }

    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            ModuleCall::InitializeFollow { .. }
                | ModuleCall::InitializeCollect { .. }
                | ModuleCall::InitializeReference { .. }
        )
    }

    /// Borsh-encoded arguments, in the module instruction's parameter order.
    pub fn encode_args(&self) -> Result<Vec<u8>> {
        match self {
            ModuleCall::InitializeFollow { profile_id, data } => encode(&(profile_id, data)),
            ModuleCall::ProcessFollow {
                follower,
                profile_id,
                data,
            } => encode(&(follower, profile_id, data)),
            ModuleCall::InitializeCollect {
                profile_id,
                pub_id,
                data,
            }
            | ModuleCall::InitializeReference {
                profile_id,
                pub_id,
                data,
            } => encode(&(profile_id, pub_id, data)),
            ModuleCall::ProcessCollect {
                referrer_profile_id,
                collector,
                profile_id,
                pub_id,
                data,
            } => encode(&(referrer_profile_id, collector, profile_id, pub_id, data)),
            ModuleCall::ProcessComment {
                profile_id,
                pointed_profile_id,
                pointed_pub_id,
                data,
            }
            | ModuleCall::ProcessMirror {
                profile_id,
                pointed_profile_id,
                pointed_pub_id,
                data,
            } => encode(&(profile_id, pointed_profile_id, pointed_pub_id, data)),
        }
    }

    /// Anchor instruction data: 8-byte sighash followed by the arguments.
    pub fn instruction_data(&self) -> Result<Vec<u8>> {
        let mut data = sighash(self.method()).to_vec();
        data.extend(self.encode_args()?);
        Ok(data)
    }
}

pub fn sighash(method: &str) -> [u8; 8] {
    let preimage = format!("global:{method}");
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash::hash(preimage.as_bytes()).to_bytes()[..8]);
    out
}

pub fn hub_authority_address() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[HUB_AUTHORITY_SEED], &crate::ID)
}

/// Accounts a configured module is reached through.
pub struct ModuleAccounts<'a, 'info> {
    pub program: &'a AccountInfo<'info>,
    pub state: &'a AccountInfo<'info>,
}

/// Initialization calls need the module whitelisted for the call's kind.
/// Process calls skip the whitelist, so de-whitelisting a module never
/// strands the profiles and publications already configured with it.
pub fn check_whitelist(
    call: &ModuleCall,
    module: &Pubkey,
    whitelist: Option<&ModuleWhitelist>,
) -> Result<()> {
    if call.is_initialization() {
        require_whitelisted(call.kind(), module, whitelist)?;
    }
    Ok(())
}

/// Pair a configured module with the program and state accounts supplied.
pub fn bind_module<'a, 'info>(
    call: &ModuleCall,
    module: &Pubkey,
    whitelist: Option<&ModuleWhitelist>,
    program: Option<&'a AccountInfo<'info>>,
    state: Option<&'a AccountInfo<'info>>,
) -> Result<ModuleAccounts<'a, 'info>> {
    check_whitelist(call, module, whitelist)?;
    let (program, state) = match (program, state) {
        (Some(program), Some(state)) => (program, state),
        _ => return err!(HubError::ModuleAccountsMissing),
    };
    require_keys_eq!(program.key(), *module, HubError::ModuleProgramMismatch);
    Ok(ModuleAccounts { program, state })
}

/// Invoke `call` on a module, signed by the hub authority.
///
/// `extra` follows the module state in the CPI account list. Returns whatever
/// return data the module set, or an empty vector.
pub fn dispatch<'info>(
    call: &ModuleCall,
    module: &ModuleAccounts<'_, 'info>,
    hub_authority: &AccountInfo<'info>,
    authority_bump: u8,
    extra: &[AccountInfo<'info>],
) -> Result<Vec<u8>> {
    let mut metas = Vec::with_capacity(2 + extra.len());
    metas.push(AccountMeta::new_readonly(hub_authority.key(), true));
    metas.push(AccountMeta::new(module.state.key(), false));
    metas.extend(extra.iter().map(|info| AccountMeta {
        pubkey: info.key(),
        is_signer: info.is_signer,
        is_writable: info.is_writable,
    }));

    let ix = Instruction {
        program_id: module.program.key(),
        accounts: metas,
        data: call.instruction_data()?,
    };

    let mut infos = Vec::with_capacity(3 + extra.len());
    infos.push(hub_authority.clone());
    infos.push(module.state.clone());
    infos.extend(extra.iter().cloned());
    infos.push(module.program.clone());

    invoke_signed(&ix, &infos, &[&[HUB_AUTHORITY_SEED, &[authority_bump]]])?;

    Ok(match get_return_data() {
        Some((program_id, data)) if program_id == module.program.key() => data,
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::error_code;

    #[test]
    fn sighash_matches_anchor_discriminator() {
        let expected = hash::hash(b"global:process_follow").to_bytes();
        assert_eq!(sighash("process_follow"), expected[..8]);
    }

    #[test]
    fn process_collect_encodes_arguments_in_order() {
        let collector = Pubkey::new_unique();
        let call = ModuleCall::ProcessCollect {
            referrer_profile_id: 3,
            collector,
            profile_id: 1,
            pub_id: 2,
            data: vec![9],
        };
        let data = call.instruction_data().unwrap();

        assert_eq!(data[..8], sighash("process_collect"));
        assert_eq!(data[8..16], 3u64.to_le_bytes());
        assert_eq!(data[16..48], collector.to_bytes());
        assert_eq!(data[48..56], 1u64.to_le_bytes());
        assert_eq!(data[56..64], 2u64.to_le_bytes());
        assert_eq!(data[64..], [1, 0, 0, 0, 9]);
    }

    #[test]
    fn only_initialization_consults_the_whitelist() {
        let module = Pubkey::new_unique();
        let mut entry = ModuleWhitelist {
            module,
            follow: true,
            collect: false,
            reference: false,
            bump: 255,
        };
        let init = ModuleCall::InitializeFollow { profile_id: 1, data: vec![] };
        let process = ModuleCall::ProcessFollow {
            follower: Pubkey::new_unique(),
            profile_id: 1,
            data: vec![],
        };
        assert!(check_whitelist(&init, &module, Some(&entry)).is_ok());

        // de-whitelisted after the profile was configured
        entry.follow = false;
        assert_eq!(
            error_code(check_whitelist(&init, &module, Some(&entry))),
            u32::from(HubError::FollowModuleNotWhitelisted)
        );
        assert!(check_whitelist(&process, &module, Some(&entry)).is_ok());
        assert!(check_whitelist(&process, &module, None).is_ok());
    }

    #[test]
    fn initialization_is_checked_against_its_own_kind() {
        let module = Pubkey::new_unique();
        let entry = ModuleWhitelist {
            module,
            follow: true,
            collect: false,
            reference: false,
            bump: 255,
        };
        let collect = ModuleCall::InitializeCollect { profile_id: 1, pub_id: 1, data: vec![] };
        let reference = ModuleCall::InitializeReference { profile_id: 1, pub_id: 1, data: vec![] };
        assert_eq!(
            error_code(check_whitelist(&collect, &module, Some(&entry))),
            u32::from(HubError::CollectModuleNotWhitelisted)
        );
        assert_eq!(
            error_code(check_whitelist(&reference, &module, Some(&entry))),
            u32::from(HubError::ReferenceModuleNotWhitelisted)
        );
        // an entry for another program does not count
        assert_eq!(
            error_code(check_whitelist(
                &ModuleCall::InitializeFollow { profile_id: 1, data: vec![] },
                &Pubkey::new_unique(),
                Some(&entry),
            )),
            u32::from(HubError::FollowModuleNotWhitelisted)
        );
    }
}
