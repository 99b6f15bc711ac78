use anchor_lang::prelude::*;

use crate::constants::PROFILE_SEED;
use crate::state::{pub_type_of, Profile, PubType};
use crate::storage;

#[derive(Accounts)]
#[instruction(profile_id: u64)]
pub struct GetPubType<'info> {
    #[account(
        seeds = [PROFILE_SEED, &profile_id.to_le_bytes()],
        bump = profile.bump,
    )]
    pub profile: Account<'info, Profile>,

    /// CHECK: May be uninitialized; loaded by `storage::load_publication`
    pub publication: UncheckedAccount<'info>,
}

/// View: classification of `(profile_id, pub_id)`.
pub fn handler(ctx: Context<GetPubType>, profile_id: u64, pub_id: u64) -> Result<PubType> {
    let record = storage::load_publication(&ctx.accounts.publication, profile_id, pub_id).ok();
    Ok(pub_type_of(ctx.accounts.profile.pub_count, pub_id, record.as_ref()))
}
