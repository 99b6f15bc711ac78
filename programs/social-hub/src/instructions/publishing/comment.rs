use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;

use crate::constants::{
    HUB_AUTHORITY_SEED, HUB_CONFIG_SEED, PROFILE_SEED, PUBLICATION_SEED, SIG_NONCE_SEED,
};
use crate::events::CommentCreated;
use crate::gateway::ModuleCall;
use crate::signature::{self, encode, SignedAction, TypedDataSignature};
use crate::state::{
    validate_uri, HubAction, HubConfig, ModuleWhitelist, Profile, Publication, SigNonce,
};
use crate::storage;

use super::PublishingModules;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct CommentParams {
    pub profile_id: u64,
    pub content_uri: String,
    pub profile_id_pointed: u64,
    pub pub_id_pointed: u64,
    /// Passed to the pointed publication's reference module
    pub reference_module_data: Vec<u8>,
    pub collect_module: Pubkey,
    pub collect_module_init_data: Vec<u8>,
    pub reference_module: Option<Pubkey>,
    pub reference_module_init_data: Vec<u8>,
}

#[derive(Accounts)]
#[instruction(params: CommentParams)]
pub struct Comment<'info> {
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

    pub collect_module_whitelist: Option<Account<'info, ModuleWhitelist>>,

    /// CHECK: Compared against `params.collect_module` by the gateway
    pub collect_module_program: UncheckedAccount<'info>,

    /// CHECK: Owned and validated by the collect module
    #[account(mut)]
    pub collect_module_state: UncheckedAccount<'info>,

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

pub fn handler(
    ctx: Context<Comment>,
    params: CommentParams,
    sig: Option<TypedDataSignature>,
) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::Comment)?;
    validate_uri(&params.content_uri)?;

    let accounts = &mut *ctx.accounts;
    let principal = signature::authorize(
        &accounts.hub_config,
        &accounts.caller.key(),
        &accounts.principal,
        &mut accounts.sig_nonce,
        ctx.bumps.sig_nonce,
        &accounts.instructions,
        SignedAction::Comment,
        &encode(&params)?,
        sig,
    )?;
    accounts.profile.require_owner_or_dispatcher(&principal)?;

    // The publication being created is not initialized yet, so pointing at
    // it fails here like any other missing publication.
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

    let collect_module_return_data = modules.collect(
        &params.collect_module,
        accounts.collect_module_whitelist.as_deref(),
        Some(&*accounts.collect_module_program),
        Some(&*accounts.collect_module_state),
        params.collect_module_init_data.clone(),
    )?;
    let reference_module_return_data = modules.reference(
        params.reference_module.as_ref(),
        accounts.reference_module_whitelist.as_deref(),
        accounts.reference_module_program.as_deref(),
        accounts.reference_module_state.as_deref(),
        params.reference_module_init_data.clone(),
    )?;
    modules.validate_reference(
        &pointed,
        ModuleCall::ProcessComment {
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
    publication.content_uri = params.content_uri.clone();
    publication.collect_module = Some(params.collect_module);
    publication.reference_module = params.reference_module;
    publication.created_at = clock.unix_timestamp;
    publication.bump = ctx.bumps.publication;

    emit!(CommentCreated {
        profile_id: params.profile_id,
        pub_id,
        content_uri: params.content_uri,
        profile_id_pointed: params.profile_id_pointed,
        pub_id_pointed: params.pub_id_pointed,
        collect_module: params.collect_module,
        collect_module_return_data,
        reference_module: params.reference_module,
        reference_module_return_data,
        timestamp: clock.unix_timestamp,
    });
    msg!(
        "Profile #{} commented #{} on {}/{}",
        params.profile_id,
        pub_id,
        params.profile_id_pointed,
        params.pub_id_pointed
    );
    Ok(())
}
