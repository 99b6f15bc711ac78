use anchor_lang::prelude::*;

use crate::constants::SIG_NONCE_SEED;
use crate::events::NonceIncremented;
use crate::state::SigNonce;

#[derive(Accounts)]
pub struct IncrementNonce<'info> {
    #[account(mut)]
    pub principal: Signer<'info>,

    #[account(
        init_if_needed,
        payer = principal,
        space = SigNonce::SIZE,
        seeds = [SIG_NONCE_SEED, principal.key().as_ref()],
        bump,
    )]
    pub sig_nonce: Account<'info, SigNonce>,

    pub system_program: Program<'info, System>,
}

/// Invalidate every outstanding signature at the current nonce.
pub fn handler(ctx: Context<IncrementNonce>) -> Result<()> {
    let principal = ctx.accounts.principal.key();
    let sig_nonce = &mut ctx.accounts.sig_nonce;
    sig_nonce.bind(principal, ctx.bumps.sig_nonce);
    sig_nonce.consume();

    emit!(NonceIncremented {
        principal,
        nonce: sig_nonce.nonce,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Nonce of {} is now {}", principal, sig_nonce.nonce);
    Ok(())
}
