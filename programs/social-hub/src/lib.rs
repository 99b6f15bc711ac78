use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod instructions;
pub mod signature;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_utils;

use instructions::*;
use signature::TypedDataSignature;
use state::{ModuleKind, ProtocolState, PubType};

declare_id!("ByqxCncPaKjQuxVUBbNuDLRJvS4N2ZU2S8KQk1vYMm1B");

#[program]
pub mod social_hub {
    use super::*;

    // === Governance ===

    /// Create the hub config. Callable once, by the program upgrade authority.
    pub fn initialize(
        ctx: Context<Initialize>,
        governance: Pubkey,
        emergency_admin: Pubkey,
        chain_id: u64,
    ) -> Result<()> {
        instructions::governance::initialize::handler(ctx, governance, emergency_admin, chain_id)
    }

    pub fn set_governance(ctx: Context<GovernanceOnly>, new_governance: Pubkey) -> Result<()> {
        instructions::governance::set_governance::set_governance(ctx, new_governance)
    }

    pub fn set_emergency_admin(
        ctx: Context<GovernanceOnly>,
        new_emergency_admin: Pubkey,
    ) -> Result<()> {
        instructions::governance::set_governance::set_emergency_admin(ctx, new_emergency_admin)
    }

    /// Governance or emergency admin
    pub fn set_state(ctx: Context<SetState>, new_state: ProtocolState) -> Result<()> {
        instructions::governance::set_state::handler(ctx, new_state)
    }

    pub fn whitelist_profile_creator(
        ctx: Context<WhitelistProfileCreator>,
        creator: Pubkey,
        whitelisted: bool,
    ) -> Result<()> {
        instructions::governance::whitelist::whitelist_profile_creator(ctx, creator, whitelisted)
    }

    pub fn whitelist_follow_module(
        ctx: Context<WhitelistModule>,
        module: Pubkey,
        whitelisted: bool,
    ) -> Result<()> {
        instructions::governance::whitelist::whitelist_module(
            ctx,
            module,
            ModuleKind::Follow,
            whitelisted,
        )
    }

    pub fn whitelist_collect_module(
        ctx: Context<WhitelistModule>,
        module: Pubkey,
        whitelisted: bool,
    ) -> Result<()> {
        instructions::governance::whitelist::whitelist_module(
            ctx,
            module,
            ModuleKind::Collect,
            whitelisted,
        )
    }

    pub fn whitelist_reference_module(
        ctx: Context<WhitelistModule>,
        module: Pubkey,
        whitelisted: bool,
    ) -> Result<()> {
        instructions::governance::whitelist::whitelist_module(
            ctx,
            module,
            ModuleKind::Reference,
            whitelisted,
        )
    }

    // === Signatures ===

    /// Consume the signer's nonce without any other effect
    pub fn increment_nonce(ctx: Context<IncrementNonce>) -> Result<()> {
        instructions::increment_nonce::handler(ctx)
    }

    // === Profiles ===

    /// Whitelisted creators only
    pub fn create_profile(ctx: Context<CreateProfile>, params: CreateProfileParams) -> Result<()> {
        instructions::profile::create_profile::handler(ctx, params)
    }

    pub fn set_follow_module(
        ctx: Context<SetFollowModule>,
        params: SetFollowModuleParams,
    ) -> Result<()> {
        instructions::profile::set_follow_module::handler(ctx, params, None)
    }

    pub fn set_follow_module_with_sig(
        ctx: Context<SetFollowModule>,
        params: SetFollowModuleParams,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::profile::set_follow_module::handler(ctx, params, Some(sig))
    }

    pub fn set_dispatcher(
        ctx: Context<ProfileAction>,
        profile_id: u64,
        dispatcher: Option<Pubkey>,
    ) -> Result<()> {
        instructions::profile::settings::set_dispatcher(ctx, profile_id, dispatcher, None)
    }

    pub fn set_dispatcher_with_sig(
        ctx: Context<ProfileAction>,
        profile_id: u64,
        dispatcher: Option<Pubkey>,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::profile::settings::set_dispatcher(ctx, profile_id, dispatcher, Some(sig))
    }

    pub fn set_profile_image_uri(
        ctx: Context<ProfileAction>,
        profile_id: u64,
        image_uri: String,
    ) -> Result<()> {
        instructions::profile::settings::set_profile_image_uri(ctx, profile_id, image_uri, None)
    }

    pub fn set_profile_image_uri_with_sig(
        ctx: Context<ProfileAction>,
        profile_id: u64,
        image_uri: String,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::profile::settings::set_profile_image_uri(ctx, profile_id, image_uri, Some(sig))
    }

    pub fn set_follow_nft_uri(
        ctx: Context<ProfileAction>,
        profile_id: u64,
        follow_nft_uri: String,
    ) -> Result<()> {
        instructions::profile::settings::set_follow_nft_uri(ctx, profile_id, follow_nft_uri, None)
    }

    pub fn set_follow_nft_uri_with_sig(
        ctx: Context<ProfileAction>,
        profile_id: u64,
        follow_nft_uri: String,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::profile::settings::set_follow_nft_uri(
            ctx,
            profile_id,
            follow_nft_uri,
            Some(sig),
        )
    }

    pub fn approve_profile(
        ctx: Context<ProfileAction>,
        profile_id: u64,
        approved: Option<Pubkey>,
    ) -> Result<()> {
        instructions::profile::settings::approve_profile(ctx, profile_id, approved, None)
    }

    /// Permit: approval authorized by the owner's signature
    pub fn approve_profile_with_sig(
        ctx: Context<ProfileAction>,
        profile_id: u64,
        approved: Option<Pubkey>,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::profile::settings::approve_profile(ctx, profile_id, approved, Some(sig))
    }

    pub fn transfer_profile(ctx: Context<TransferProfile>, profile_id: u64, to: Pubkey) -> Result<()> {
        instructions::profile::transfer_profile::handler(ctx, profile_id, to)
    }

    pub fn burn_profile(ctx: Context<BurnProfile>, profile_id: u64) -> Result<()> {
        instructions::profile::burn_profile::handler(ctx, profile_id, None)
    }

    pub fn burn_profile_with_sig(
        ctx: Context<BurnProfile>,
        profile_id: u64,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::profile::burn_profile::handler(ctx, profile_id, Some(sig))
    }

    // === Publishing ===

    pub fn post(ctx: Context<Post>, params: PostParams) -> Result<()> {
        instructions::publishing::post::handler(ctx, params, None)
    }

    pub fn post_with_sig(
        ctx: Context<Post>,
        params: PostParams,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::publishing::post::handler(ctx, params, Some(sig))
    }

    pub fn comment(ctx: Context<Comment>, params: CommentParams) -> Result<()> {
        instructions::publishing::comment::handler(ctx, params, None)
    }

    pub fn comment_with_sig(
        ctx: Context<Comment>,
        params: CommentParams,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::publishing::comment::handler(ctx, params, Some(sig))
    }

    pub fn mirror(ctx: Context<Mirror>, params: MirrorParams) -> Result<()> {
        instructions::publishing::mirror::handler(ctx, params, None)
    }

    pub fn mirror_with_sig(
        ctx: Context<Mirror>,
        params: MirrorParams,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::publishing::mirror::handler(ctx, params, Some(sig))
    }

    pub fn get_pub_type(ctx: Context<GetPubType>, profile_id: u64, pub_id: u64) -> Result<PubType> {
        instructions::publishing::get_pub_type::handler(ctx, profile_id, pub_id)
    }

    // === Follow & Collect ===

    /// Returns the minted follow token ids in input order
    pub fn follow<'info>(
        ctx: Context<'_, '_, '_, 'info, Follow<'info>>,
        params: FollowParams,
    ) -> Result<Vec<u64>> {
        instructions::graph::follow::handler(ctx, params, None)
    }

    pub fn follow_with_sig<'info>(
        ctx: Context<'_, '_, '_, 'info, Follow<'info>>,
        params: FollowParams,
        sig: TypedDataSignature,
    ) -> Result<Vec<u64>> {
        instructions::graph::follow::handler(ctx, params, Some(sig))
    }

    /// Returns the minted collect token id
    pub fn collect<'info>(
        ctx: Context<'_, '_, '_, 'info, Collect<'info>>,
        params: CollectParams,
    ) -> Result<u64> {
        instructions::graph::collect::handler(ctx, params, None)
    }

    pub fn collect_with_sig<'info>(
        ctx: Context<'_, '_, '_, 'info, Collect<'info>>,
        params: CollectParams,
        sig: TypedDataSignature,
    ) -> Result<u64> {
        instructions::graph::collect::handler(ctx, params, Some(sig))
    }

    // === Follow Power Delegation ===

    /// `None` or the default key undelegates
    pub fn delegate_follow_power<'info>(
        ctx: Context<'_, '_, '_, 'info, DelegateFollowPower<'info>>,
        profile_id: u64,
        delegatee: Option<Pubkey>,
    ) -> Result<()> {
        instructions::graph::delegate::handler(ctx, profile_id, delegatee, None)
    }

    pub fn delegate_follow_power_with_sig<'info>(
        ctx: Context<'_, '_, '_, 'info, DelegateFollowPower<'info>>,
        profile_id: u64,
        delegatee: Option<Pubkey>,
        sig: TypedDataSignature,
    ) -> Result<()> {
        instructions::graph::delegate::handler(ctx, profile_id, delegatee, Some(sig))
    }

    pub fn get_power_by_block_number<'info>(
        ctx: Context<'_, '_, '_, 'info, FollowPowerView<'info>>,
        profile_id: u64,
        user: Pubkey,
        block_number: u64,
    ) -> Result<u64> {
        instructions::graph::power_views::get_power_by_block_number(
            ctx,
            profile_id,
            user,
            block_number,
        )
    }

    pub fn get_delegated_supply_by_block_number<'info>(
        ctx: Context<'_, '_, '_, 'info, FollowPowerView<'info>>,
        profile_id: u64,
        block_number: u64,
    ) -> Result<u64> {
        instructions::graph::power_views::get_delegated_supply_by_block_number(
            ctx,
            profile_id,
            block_number,
        )
    }

    // === Receipt Tokens ===

    pub fn transfer_follow_token<'info>(
        ctx: Context<'_, '_, '_, 'info, FollowTokenAction<'info>>,
        profile_id: u64,
        token_id: u64,
        to: Pubkey,
    ) -> Result<()> {
        instructions::receipts::follow_tokens::transfer_follow_token(ctx, profile_id, token_id, to)
    }

    pub fn approve_follow_token<'info>(
        ctx: Context<'_, '_, '_, 'info, FollowTokenAction<'info>>,
        profile_id: u64,
        token_id: u64,
        approved: Option<Pubkey>,
    ) -> Result<()> {
        instructions::receipts::follow_tokens::approve_follow_token(
            ctx,
            profile_id,
            token_id,
            approved,
        )
    }

    pub fn burn_follow_token<'info>(
        ctx: Context<'_, '_, '_, 'info, FollowTokenAction<'info>>,
        profile_id: u64,
        token_id: u64,
    ) -> Result<()> {
        instructions::receipts::follow_tokens::burn_follow_token(ctx, profile_id, token_id)
    }

    pub fn transfer_collect_token<'info>(
        ctx: Context<'_, '_, '_, 'info, CollectTokenAction<'info>>,
        profile_id: u64,
        pub_id: u64,
        token_id: u64,
        to: Pubkey,
    ) -> Result<()> {
        instructions::receipts::collect_tokens::transfer_collect_token(
            ctx, profile_id, pub_id, token_id, to,
        )
    }

    pub fn approve_collect_token<'info>(
        ctx: Context<'_, '_, '_, 'info, CollectTokenAction<'info>>,
        profile_id: u64,
        pub_id: u64,
        token_id: u64,
        approved: Option<Pubkey>,
    ) -> Result<()> {
        instructions::receipts::collect_tokens::approve_collect_token(
            ctx, profile_id, pub_id, token_id, approved,
        )
    }

    pub fn burn_collect_token<'info>(
        ctx: Context<'_, '_, '_, 'info, CollectTokenAction<'info>>,
        profile_id: u64,
        pub_id: u64,
        token_id: u64,
    ) -> Result<()> {
        instructions::receipts::collect_tokens::burn_collect_token(ctx, profile_id, pub_id, token_id)
    }

    // === Receipt Views ===

    pub fn get_receipt_total_supply(ctx: Context<ReceiptView>, source: ReceiptSource) -> Result<u64> {
        instructions::receipts::views::get_receipt_total_supply(ctx, source)
    }

    pub fn get_receipt_balance<'info>(
        ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
        source: ReceiptSource,
        owner: Pubkey,
    ) -> Result<u64> {
        instructions::receipts::views::get_receipt_balance(ctx, source, owner)
    }

    pub fn get_receipt_owner<'info>(
        ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
        source: ReceiptSource,
        token_id: u64,
    ) -> Result<Pubkey> {
        instructions::receipts::views::get_receipt_owner(ctx, source, token_id)
    }

    pub fn get_receipt_minted_at<'info>(
        ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
        source: ReceiptSource,
        token_id: u64,
    ) -> Result<i64> {
        instructions::receipts::views::get_receipt_minted_at(ctx, source, token_id)
    }

    pub fn get_receipt_token_by_index<'info>(
        ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
        source: ReceiptSource,
        index: u64,
    ) -> Result<u64> {
        instructions::receipts::views::get_receipt_token_by_index(ctx, source, index)
    }

    pub fn get_receipt_token_of_owner_by_index<'info>(
        ctx: Context<'_, '_, '_, 'info, ReceiptView<'info>>,
        source: ReceiptSource,
        owner: Pubkey,
        index: u64,
    ) -> Result<u64> {
        instructions::receipts::views::get_receipt_token_of_owner_by_index(ctx, source, owner, index)
    }
}
