use anchor_lang::prelude::*;
use anchor_lang::solana_program::ed25519_program;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::keccak;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};

use crate::constants::{DOMAIN_NAME, DOMAIN_TYPE, DOMAIN_VERSION};
use crate::errors::HubError;
use crate::state::{HubConfig, SigNonce};

// =============================================================================
// TYPED-DATA SIGNATURES
// =============================================================================
//
// A meta-transaction is authorized by the principal's ed25519 signature over
//
//   keccak(0x19 0x01 || domain_separator || struct_hash)
//
// where the struct hash binds the action type, the borsh-encoded parameters,
// the principal's current nonce and an absolute deadline. The signature is
// not passed as data: the relayer places an ed25519 precompile instruction
// directly before the hub instruction, and the hub reads that instruction
// back through the instructions sysvar. The runtime has already rejected the
// transaction if the precompile signature does not verify, so the hub only
// has to check *what* was signed and *by whom*.
// =============================================================================

/// Every action that can be authorized by a detached signature.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum SignedAction {
    SetFollowModule,
    SetDispatcher,
    SetProfileImageUri,
    SetFollowNftUri,
    ApproveProfile,
    BurnProfile,
    Post,
    Comment,
    Mirror,
    Follow,
    Collect,
    DelegateFollowPower,
}

impl SignedAction {
    pub fn type_string(self) -> &'static [u8] {
        match self {
            SignedAction::SetFollowModule => {
                b"SetFollowModuleWithSig(bytes params,uint64 nonce,int64 deadline)"
            }
            SignedAction::SetDispatcher => {
                b"SetDispatcherWithSig(bytes params,uint64 nonce,int64 deadline)"
            }
            SignedAction::SetProfileImageUri => {
                b"SetProfileImageURIWithSig(bytes params,uint64 nonce,int64 deadline)"
            }
            SignedAction::SetFollowNftUri => {
                b"SetFollowNFTURIWithSig(bytes params,uint64 nonce,int64 deadline)"
            }
            SignedAction::ApproveProfile => b"Permit(bytes params,uint64 nonce,int64 deadline)",
            SignedAction::BurnProfile => b"BurnWithSig(bytes params,uint64 nonce,int64 deadline)",
            SignedAction::Post => b"PostWithSig(bytes params,uint64 nonce,int64 deadline)",
            SignedAction::Comment => b"CommentWithSig(bytes params,uint64 nonce,int64 deadline)",
            SignedAction::Mirror => b"MirrorWithSig(bytes params,uint64 nonce,int64 deadline)",
            SignedAction::Follow => b"FollowWithSig(bytes params,uint64 nonce,int64 deadline)",
            SignedAction::Collect => b"CollectWithSig(bytes params,uint64 nonce,int64 deadline)",
            SignedAction::DelegateFollowPower => {
                b"DelegateBySig(bytes params,uint64 nonce,int64 deadline)"
            }
        }
    }
}

/// Detached-signature envelope carried by every `*_with_sig` instruction.
/// The signature bytes themselves travel in the preceding ed25519 instruction.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct TypedDataSignature {
    pub deadline: i64,
}

pub fn domain_separator(chain_id: u64, verifying_program: &Pubkey) -> [u8; 32] {
    keccak::hashv(&[
        &keccak::hash(DOMAIN_TYPE).0,
        &keccak::hash(DOMAIN_NAME).0,
        &keccak::hash(DOMAIN_VERSION).0,
        &chain_id.to_le_bytes(),
        verifying_program.as_ref(),
    ])
    .0
}

pub fn typed_data_digest(
    domain: &[u8; 32],
    action: SignedAction,
    payload: &[u8],
    nonce: u64,
    deadline: i64,
) -> [u8; 32] {
    let struct_hash = keccak::hashv(&[
        &keccak::hash(action.type_string()).0,
        payload,
        &nonce.to_le_bytes(),
        &deadline.to_le_bytes(),
    ]);
    keccak::hashv(&[b"\x19\x01", domain, &struct_hash.0]).0
}

/// Borsh bytes of an instruction's parameters, as bound into the digest.
pub fn encode<T: AnchorSerialize>(params: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    params
        .serialize(&mut bytes)
        .map_err(|_| error!(anchor_lang::error::ErrorCode::AccountDidNotSerialize))?;
    Ok(bytes)
}

const SIGNATURE_OFFSETS_START: usize = 2;
const SIGNATURE_OFFSETS_SIZE: usize = 14;
const PUBKEY_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;
const CURRENT_INSTRUCTION: u16 = u16::MAX;

/// Public key and message attested by a single-signature ed25519 precompile
/// instruction whose offsets all point into its own data.
pub fn parse_ed25519_instruction(ix: &Instruction) -> Option<(Pubkey, &[u8])> {
    if ix.program_id != ed25519_program::ID {
        return None;
    }
    let data = ix.data.as_slice();
    if data.len() < SIGNATURE_OFFSETS_START + SIGNATURE_OFFSETS_SIZE || data[0] != 1 {
        return None;
    }
    let read = |field: usize| {
        let at = SIGNATURE_OFFSETS_START + field * 2;
        u16::from_le_bytes([data[at], data[at + 1]])
    };
    let (signature_offset, signature_ix) = (read(0) as usize, read(1));
    let (pubkey_offset, pubkey_ix) = (read(2) as usize, read(3));
    let (message_offset, message_size, message_ix) = (read(4) as usize, read(5) as usize, read(6));

    if [signature_ix, pubkey_ix, message_ix]
        .iter()
        .any(|ix| *ix != CURRENT_INSTRUCTION)
    {
        return None;
    }
    data.get(signature_offset..signature_offset + SIGNATURE_LEN)?;
    let pubkey = data.get(pubkey_offset..pubkey_offset + PUBKEY_LEN)?;
    let message = data.get(message_offset..message_offset + message_size)?;
    Some((Pubkey::try_from(pubkey).ok()?, message))
}

/// Expiry is checked before the attestation, so an expired but otherwise
/// valid signature reports `SignatureExpired`.
pub fn verify_typed_signature(
    now: i64,
    deadline: i64,
    signer: &Pubkey,
    digest: &[u8; 32],
    attestation: Option<&Instruction>,
) -> Result<()> {
    require!(now <= deadline, HubError::SignatureExpired);
    let (attested_key, attested_message) = attestation
        .and_then(parse_ed25519_instruction)
        .ok_or_else(|| error!(HubError::SignatureInvalid))?;
    require_keys_eq!(attested_key, *signer, HubError::SignatureInvalid);
    require!(attested_message == digest.as_slice(), HubError::SignatureInvalid);
    Ok(())
}

/// The instruction immediately before the one currently executing.
pub fn preceding_instruction(instructions_sysvar: &AccountInfo) -> Result<Option<Instruction>> {
    let current = load_current_index_checked(instructions_sysvar)?;
    if current == 0 {
        return Ok(None);
    }
    Ok(Some(load_instruction_at_checked(
        current as usize - 1,
        instructions_sysvar,
    )?))
}

/// Resolve who is acting and consume their nonce.
///
/// Without a signature the transaction signer must be the principal. With
/// one, anybody may relay it. Either way the principal's nonce advances, so
/// any direct action cancels signatures issued at the old nonce.
pub fn authorize_action(
    hub_config: &HubConfig,
    caller: &Pubkey,
    principal: &Pubkey,
    sig_nonce: &mut SigNonce,
    action: SignedAction,
    payload: &[u8],
    sig: Option<TypedDataSignature>,
    now: i64,
    attestation: Option<&Instruction>,
) -> Result<Pubkey> {
    match sig {
        None => require_keys_eq!(*caller, *principal, HubError::CallerNotPrincipal),
        Some(sig) => {
            let digest = hub_config.typed_data_digest(action, payload, sig_nonce.nonce, sig.deadline);
            verify_typed_signature(now, sig.deadline, principal, &digest, attestation)?;
        }
    }
    sig_nonce.consume();
    Ok(*principal)
}

/// Account-level entry used by handlers: binds a fresh nonce account, reads
/// the clock and the preceding instruction only when a signature is present.
pub fn authorize<'info>(
    hub_config: &HubConfig,
    caller: &Pubkey,
    principal: &AccountInfo<'info>,
    sig_nonce: &mut Account<'info, SigNonce>,
    nonce_bump: u8,
    instructions: &AccountInfo<'info>,
    action: SignedAction,
    payload: &[u8],
    sig: Option<TypedDataSignature>,
) -> Result<Pubkey> {
    sig_nonce.bind(principal.key(), nonce_bump);
    let (now, attestation) = match sig {
        Some(_) => (Clock::get()?.unix_timestamp, preceding_instruction(instructions)?),
        None => (0, None),
    };
    authorize_action(
        hub_config,
        caller,
        &principal.key(),
        sig_nonce,
        action,
        payload,
        sig,
        now,
        attestation.as_ref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ed25519_instruction, error_code, hub_config};

    fn nonce_account(principal: Pubkey, nonce: u64) -> SigNonce {
        SigNonce {
            principal,
            nonce,
            bump: 255,
        }
    }

    #[test]
    fn parses_standard_precompile_layout() {
        let signer = Pubkey::new_unique();
        let ix = ed25519_instruction(&signer, b"hello");
        let (key, message) = parse_ed25519_instruction(&ix).unwrap();
        assert_eq!(key, signer);
        assert_eq!(message, b"hello");
    }

    #[test]
    fn ignores_other_programs_and_cross_instruction_offsets() {
        let signer = Pubkey::new_unique();
        let mut ix = ed25519_instruction(&signer, b"hello");
        ix.program_id = Pubkey::new_unique();
        assert!(parse_ed25519_instruction(&ix).is_none());

        let mut ix = ed25519_instruction(&signer, b"hello");
        // message lives in instruction 0 instead of this one
        ix.data[14..16].copy_from_slice(&0u16.to_le_bytes());
        assert!(parse_ed25519_instruction(&ix).is_none());
    }

    #[test]
    fn direct_call_must_come_from_principal() {
        let hub = hub_config();
        let principal = Pubkey::new_unique();
        let mut nonce = nonce_account(principal, 0);

        let result = authorize_action(
            &hub, &Pubkey::new_unique(), &principal, &mut nonce,
            SignedAction::Post, b"", None, 0, None,
        );
        assert_eq!(error_code(result), u32::from(HubError::CallerNotPrincipal));
        assert_eq!(nonce.nonce, 0);

        authorize_action(&hub, &principal, &principal, &mut nonce, SignedAction::Post, b"", None, 0, None)
            .unwrap();
        assert_eq!(nonce.nonce, 1);
    }

    #[test]
    fn relayed_signature_authorizes_principal() {
        let hub = hub_config();
        let principal = Pubkey::new_unique();
        let relayer = Pubkey::new_unique();
        let mut nonce = nonce_account(principal, 4);
        let digest = hub.typed_data_digest(SignedAction::Follow, b"params", 4, 100);
        let ix = ed25519_instruction(&principal, &digest);

        let acting = authorize_action(
            &hub, &relayer, &principal, &mut nonce, SignedAction::Follow, b"params",
            Some(TypedDataSignature { deadline: 100 }), 50, Some(&ix),
        )
        .unwrap();
        assert_eq!(acting, principal);
        assert_eq!(nonce.nonce, 5);
    }

    #[test]
    fn expired_signature_reports_expiry_even_when_valid() {
        let hub = hub_config();
        let principal = Pubkey::new_unique();
        let mut nonce = nonce_account(principal, 0);
        let digest = hub.typed_data_digest(SignedAction::Post, b"p", 0, 100);
        let ix = ed25519_instruction(&principal, &digest);

        let result = authorize_action(
            &hub, &principal, &principal, &mut nonce, SignedAction::Post, b"p",
            Some(TypedDataSignature { deadline: 100 }), 101, Some(&ix),
        );
        assert_eq!(error_code(result), u32::from(HubError::SignatureExpired));
        assert_eq!(nonce.nonce, 0);
    }

    #[test]
    fn direct_action_cancels_outstanding_signature() {
        let hub = hub_config();
        let signer = Pubkey::new_unique();
        let mut nonce = nonce_account(signer, 7);
        let digest = hub.typed_data_digest(SignedAction::Follow, b"f", 7, 1_000);
        let ix = ed25519_instruction(&signer, &digest);

        // any direct nonce-consuming action
        authorize_action(&hub, &signer, &signer, &mut nonce, SignedAction::ApproveProfile, b"", None, 0, None)
            .unwrap();

        let result = authorize_action(
            &hub, &Pubkey::new_unique(), &signer, &mut nonce, SignedAction::Follow, b"f",
            Some(TypedDataSignature { deadline: 1_000 }), 10, Some(&ix),
        );
        assert_eq!(error_code(result), u32::from(HubError::SignatureInvalid));
    }

    #[test]
    fn signature_is_bound_to_action_payload_and_signer() {
        let hub = hub_config();
        let principal = Pubkey::new_unique();
        let sig = Some(TypedDataSignature { deadline: 10 });
        let digest = hub.typed_data_digest(SignedAction::Post, b"a", 0, 10);

        let mut nonce = nonce_account(principal, 0);
        let ix = ed25519_instruction(&principal, &digest);
        let other_payload = authorize_action(
            &hub, &principal, &principal, &mut nonce, SignedAction::Post, b"b", sig, 0, Some(&ix),
        );
        assert_eq!(error_code(other_payload), u32::from(HubError::SignatureInvalid));

        let other_action = authorize_action(
            &hub, &principal, &principal, &mut nonce, SignedAction::Comment, b"a", sig, 0, Some(&ix),
        );
        assert_eq!(error_code(other_action), u32::from(HubError::SignatureInvalid));

        let impostor = ed25519_instruction(&Pubkey::new_unique(), &digest);
        let other_signer = authorize_action(
            &hub, &principal, &principal, &mut nonce, SignedAction::Post, b"a", sig, 0, Some(&impostor),
        );
        assert_eq!(error_code(other_signer), u32::from(HubError::SignatureInvalid));

        let missing = authorize_action(
            &hub, &principal, &principal, &mut nonce, SignedAction::Post, b"a", sig, 0, None,
        );
        assert_eq!(error_code(missing), u32::from(HubError::SignatureInvalid));
        assert_eq!(nonce.nonce, 0);
    }
}
