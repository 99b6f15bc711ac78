use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;

use crate::constants::{
    HUB_AUTHORITY_SEED, HUB_CONFIG_SEED, PROFILE_SEED, PUBLICATION_SEED, SIG_NONCE_SEED,
};
use crate::events::MirrorCreated;
use crate::gateway::ModuleCall;
use crate::signature::{self, encode, SignedAction, TypedDataSignature};
use crate::state::{HubAction, HubConfig, ModuleWhitelist, Profile, Publication, SigNonce};
use crate::storage;

use super::PublishingModules;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct MirrorParams {
    pub profile_id: u64,
    pub profile_id_pointed: u64,
    pub pub_id_pointed: u64,
    /// Passed to the pointed publication's reference module
    pub reference_module_data: Vec<u8>,
    pub reference_module: Option<Pubkey>,
    pub reference_module_init_data: Vec<u8>,
}

#[derive(Accounts)]
#[instruction(params: MirrorParams)]
pub struct Mirror<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    /// CHECK: Authorized by `signature::authorize`
    pub principal: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = caller,
        space = SigNonce::SIZE,
        seeds = [SIG_NONCE_SEED, principal.key().as_ref()],
        bump,
    )]
    pub sig_nonce: Account<'info, SigNonce>,

    /// CHECK: Instructions sysvar
    #[account(address = sysvar_instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    #[account(seeds = [HUB_CONFIG_SEED], bump = hub_config.bump)]
    pub hub_config: Account<'info, HubConfig>,

    #[account(
        mut,
        seeds = [PROFILE_SEED, &params.profile_id.to_le_bytes()],
        bump = profile.bump,
    )]
    pub profile: Account<'info, Profile>,

    #[account(
        init,
        payer = caller,
        space = Publication::SIZE,
        seeds = [
            PUBLICATION_SEED,
            &params.profile_id.to_le_bytes(),
            &(profile.pub_count + 1).to_le_bytes(),
        ],
        bump,
    )]
    pub publication: Account<'info, Publication>,

    /// CHECK: Loaded by `storage::load_publication`
    pub pointed_publication: UncheckedAccount<'info>,

    /// CHECK: Compared against the pointed reference module by the gateway
    pub pointed_reference_program: Option<UncheckedAccount<'info>>,

    /// CHECK: Owned and validated by the pointed reference module
    #[account(mut)]
    pub pointed_reference_state: Option<UncheckedAccount<'info>>,

    /// Profile owner's holder record in the pointed profile's follow registry
    /// CHECK: Read by the pointed reference module
    pub pointed_follow_record: Option<UncheckedAccount<'info>>,

    pub reference_module_whitelist: Option<Account<'info, ModuleWhitelist>>,

    /// CHECK: Compared against `params.reference_module` by the gateway
    pub reference_module_program: Option<UncheckedAccount<'info>>,

    /// CHECK: Owned and validated by the reference module
    #[account(mut)]
    pub reference_module_state: Option<UncheckedAccount<'info>>,

    /// CHECK: PDA signer for module callbacks
    #[account(seeds = [HUB_AUTHORITY_SEED], bump = hub_config.authority_bump)]
    pub hub_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// A mirror has no content and no collect module; collects through it
/// resolve to whatever it points at.
pub fn handler(
    ctx: Context<Mirror>,
    params: MirrorParams,
    sig: Option<TypedDataSignature>,
) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::Mirror)?;

    let accounts = &mut *ctx.accounts;
    let principal = signature::authorize(
        &accounts.hub_config,
        &accounts.caller.key(),
        &accounts.principal,
        &mut accounts.sig_nonce,
        ctx.bumps.sig_nonce,
        &accounts.instructions,
        SignedAction::Mirror,
        &encode(&params)?,
        sig,
    )?;
    accounts.profile.require_owner_or_dispatcher(&principal)?;

    let pointed = storage::load_publication(
        &accounts.pointed_publication,
        params.profile_id_pointed,
        params.pub_id_pointed,
    )?;

    let pub_id = accounts.profile.pub_count + 1;
    let payer = [
        accounts.caller.to_account_info(),
        accounts.system_program.to_account_info(),
    ];
    let modules = PublishingModules {
        hub_authority: &accounts.hub_authority,
        authority_bump: accounts.hub_config.authority_bump,
        payer: &payer,
        profile_id: params.profile_id,
        pub_id,
    };

    let reference_module_return_data = modules.reference(
        params.reference_module.as_ref(),
        accounts.reference_module_whitelist.as_deref(),
        accounts.reference_module_program.as_deref(),
        accounts.reference_module_state.as_deref(),
        params.reference_module_init_data.clone(),
    )?;
    modules.validate_reference(
        &pointed,
        ModuleCall::ProcessMirror {
            profile_id: params.profile_id,
            pointed_profile_id: params.profile_id_pointed,
            pointed_pub_id: params.pub_id_pointed,
            data: params.reference_module_data.clone(),
        },
        accounts.pointed_reference_program.as_deref(),
        accounts.pointed_reference_state.as_deref(),
        &accounts.profile.to_account_info(),
        accounts.pointed_follow_record.as_deref(),
    )?;

    let clock = Clock::get()?;
    accounts.profile.next_pub_id();

    let publication = &mut accounts.publication;
    publication.profile_id = params.profile_id;
    publication.pub_id = pub_id;
    publication.pointed_profile_id = params.profile_id_pointed;
    publication.pointed_pub_id = params.pub_id_pointed;
    publication.content_uri = String::new();
    publication.collect_module = None;
    publication.reference_module = params.reference_module;
    publication.created_at = clock.unix_timestamp;
    publication.bump = ctx.bumps.publication;

    emit!(MirrorCreated {
        profile_id: params.profile_id,
        pub_id,
        profile_id_pointed: params.profile_id_pointed,
        pub_id_pointed: params.pub_id_pointed,
        reference_module: params.reference_module,
        reference_module_return_data,
        timestamp: clock.unix_timestamp,
    });
    msg!(
        "Profile #{} mirrored {}/{} as #{}",
        params.profile_id,
        params.profile_id_pointed,
        params.pub_id_pointed,
        pub_id
    );
    Ok(())
}
