use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;

use crate::constants::{HUB_AUTHORITY_SEED, HUB_CONFIG_SEED, PROFILE_SEED, SIG_NONCE_SEED};
use crate::events::FollowModuleSet;
use crate::gateway::{self, ModuleCall};
use crate::signature::{self, encode, SignedAction, TypedDataSignature};
use crate::state::{HubAction, HubConfig, ModuleWhitelist, Profile, SigNonce};

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct SetFollowModuleParams {
    pub profile_id: u64,
    /// `None` lets anyone follow without a module callback
    pub follow_module: Option<Pubkey>,
    pub follow_module_init_data: Vec<u8>,
}

#[derive(Accounts)]
#[instruction(params: SetFollowModuleParams)]
pub struct SetFollowModule<'info> {
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

    pub follow_module_whitelist: Option<Account<'info, ModuleWhitelist>>,

    /// CHECK: Compared against `params.follow_module` by the gateway
    pub module_program: Option<UncheckedAccount<'info>>,

    /// CHECK: Owned and validated by the module program
    #[account(mut)]
    pub module_state: Option<UncheckedAccount<'info>>,

    /// CHECK: PDA signer for module callbacks
    #[account(seeds = [HUB_AUTHORITY_SEED], bump = hub_config.authority_bump)]
    pub hub_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Owner only. The new module is whitelist-checked and initialized here;
/// it is never re-checked on later follows.
pub fn handler(
    ctx: Context<SetFollowModule>,
    params: SetFollowModuleParams,
    sig: Option<TypedDataSignature>,
) -> Result<()> {
    ctx.accounts.hub_config.check_gate(HubAction::SetFollowModule)?;
    let accounts = &mut *ctx.accounts;
    let principal = signature::authorize(
        &accounts.hub_config,
        &accounts.caller.key(),
        &accounts.principal,
        &mut accounts.sig_nonce,
        ctx.bumps.sig_nonce,
        &accounts.instructions,
        SignedAction::SetFollowModule,
        &encode(&params)?,
        sig,
    )?;
    accounts.profile.require_owner(&principal)?;

    let return_data = match params.follow_module {
        Some(module) => {
            let call = ModuleCall::InitializeFollow {
                profile_id: params.profile_id,
                data: params.follow_module_init_data,
            };
            let module_accounts = gateway::bind_module(
                &call,
                &module,
                accounts.follow_module_whitelist.as_deref(),
                accounts.module_program.as_deref(),
                accounts.module_state.as_deref(),
            )?;
            gateway::dispatch(
                &call,
                &module_accounts,
                &accounts.hub_authority,
                accounts.hub_config.authority_bump,
                &[
                    accounts.caller.to_account_info(),
                    accounts.system_program.to_account_info(),
                ],
            )?
        }
        None => Vec::new(),
    };

    accounts.profile.follow_module = params.follow_module;

    emit!(FollowModuleSet {
        profile_id: params.profile_id,
        follow_module: params.follow_module,
        follow_module_return_data: return_data,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Profile #{} follow module set to {:?}", params.profile_id, params.follow_module);
    Ok(())
}
