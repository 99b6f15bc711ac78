use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;

use crate::constants::{COLLECT_REGISTRY_SEED, HUB_AUTHORITY_SEED, HUB_CONFIG_SEED, SIG_NONCE_SEED};
use crate::errors::HubError;
use crate::events::{CollectRegistryDeployed, Collected};
use crate::gateway::{self, ModuleCall};
use crate::signature::{self, encode, SignedAction, TypedDataSignature};
use crate::state::{
    resolve_root, CollectRegistry, HubAction, HubConfig, PubType, Publication, ReceiptStore,
    SigNonce,
};
use crate::storage::{self, AccountStore, Funding};

// =============================================================================
// COLLECT
// =============================================================================
//
// The collected entry may be a mirror of a mirror of ... a post or comment.
// The client names the root it expects and passes every intermediate mirror
// hop, in chain order, as the leading remaining accounts. The hub walks the
// chain itself and refuses to mint unless it ends at exactly that root.
//
// The hops are followed by the registry records the mint touches: the new
// token, the collector's holder record and the two list slots.
// =============================================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct CollectParams {
    pub profile_id: u64,
    pub pub_id: u64,
    pub root_profile_id: u64,
    pub root_pub_id: u64,
    /// Collect module data
    pub data: Vec<u8>,
}

#[derive(Accounts)]
#[instruction(params: CollectParams)]
pub struct Collect<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    /// The collector
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

    /// The entry being collected
    /// CHECK: Loaded by `storage::load_publication`
    pub publication: UncheckedAccount<'info>,

    /// The canonical publication the chain resolves to
    /// CHECK: Loaded by `storage::load_publication`
    pub root_publication: UncheckedAccount<'info>,

    /// CHECK: Address checked by `storage::load_collect_registry`
    #[account(mut)]
    pub collect_registry: UncheckedAccount<'info>,

    /// Collector's holder record in the root profile's follow registry
    /// CHECK: Read by the collect module
    pub collector_follow_record: UncheckedAccount<'info>,

    /// CHECK: Compared against the root's collect module by the gateway
    pub collect_module_program: UncheckedAccount<'info>,

    /// CHECK: Owned and validated by the collect module
    #[account(mut)]
    pub collect_module_state: UncheckedAccount<'info>,

    /// CHECK: PDA signer for module callbacks
    #[account(seeds = [HUB_AUTHORITY_SEED], bump = hub_config.authority_bump)]
    pub hub_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Where a collect lands and who gets the referral.
pub struct CollectTarget {
    pub root: Publication,
    pub collect_module: Pubkey,
    /// The mirror's profile when collecting through a mirror, else the root's
    pub referrer_profile_id: u64,
}

/// Loader for the mirror walk: the expected root comes from its own account,
/// every other hop from the next supplied one.
pub fn chain_loader<'c, T, L>(
    expected_root: (u64, u64),
    root: &'c T,
    mut hops: impl Iterator<Item = &'c T> + 'c,
    load: L,
) -> impl FnMut(u64, u64) -> Result<Publication> + 'c
where
    T: 'c,
    L: Fn(&T, u64, u64) -> Result<Publication> + 'c,
{
    move |profile_id, pub_id| {
        if (profile_id, pub_id) == expected_root {
            return load(root, profile_id, pub_id);
        }
        let hop = hops.next().ok_or(HubError::CollectRootMismatch)?;
        load(hop, profile_id, pub_id)
    }
}

pub fn resolve_collect_target<F>(
    entry: Publication,
    expected_root: (u64, u64),
    fetch: F,
) -> Result<CollectTarget>
where
    F: FnMut(u64, u64) -> Result<Publication>,
{
    let referrer_profile_id = match entry.pub_type() {
        PubType::Mirror => entry.profile_id,
        _ => expected_root.0,
    };
    let root = resolve_root(entry, fetch)?;
    require!(root.id() == expected_root, HubError::CollectRootMismatch);
    let collect_module = root.collect_module.ok_or(HubError::CollectRootMismatch)?;
    Ok(CollectTarget {
        root,
        collect_module,
        referrer_profile_id,
    })
}

/// Run the collect module, then mint. The module sees the registry without
/// this token; a module that fails leaves none.
pub fn mint_collect<S, F>(
    registry: &mut CollectRegistry,
    store: &mut S,
    collector: Pubkey,
    now: i64,
    process_collect: F,
) -> Result<u64>
where
    S: ReceiptStore,
    F: FnOnce() -> Result<()>,
{
    process_collect()?;
    registry.ledger.mint(store, collector, now)
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Collect<'info>>,
    params: CollectParams,
    sig: Option<TypedDataSignature>,
) -> Result<u64> {
    ctx.accounts.hub_config.check_gate(HubAction::Collect)?;

    let accounts = &mut *ctx.accounts;
    let collector = signature::authorize(
        &accounts.hub_config,
        &accounts.caller.key(),
        &accounts.principal,
        &mut accounts.sig_nonce,
        ctx.bumps.sig_nonce,
        &accounts.instructions,
        SignedAction::Collect,
        &encode(&params)?,
        sig,
    )?;

    let expected_root = (params.root_profile_id, params.root_pub_id);
    let entry = storage::load_publication(&accounts.publication, params.profile_id, params.pub_id)?;
    let root_info: &AccountInfo<'info> = &accounts.root_publication;
    let CollectTarget {
        root,
        collect_module,
        referrer_profile_id,
    } = resolve_collect_target(
        entry,
        expected_root,
        chain_loader(
            expected_root,
            root_info,
            ctx.remaining_accounts.iter(),
            |info: &AccountInfo<'info>, profile_id, pub_id| {
                storage::load_publication(info, profile_id, pub_id)
            },
        ),
    )?;

    let clock = Clock::get()?;
    let payer = accounts.caller.to_account_info();
    let system_program = accounts.system_program.to_account_info();
    let registry_info = accounts.collect_registry.to_account_info();

    let mut registry =
        match storage::load_collect_registry(&registry_info, root.profile_id, root.pub_id)? {
            Some(registry) => registry,
            None => {
                let (_, bump) = storage::collect_registry_address(root.profile_id, root.pub_id);
                storage::create_pda_account(
                    &payer,
                    &registry_info,
                    &system_program,
                    CollectRegistry::SIZE,
                    &[
                        COLLECT_REGISTRY_SEED,
                        &root.profile_id.to_le_bytes(),
                        &root.pub_id.to_le_bytes(),
                        &[bump],
                    ],
                )?;
                emit!(CollectRegistryDeployed {
                    profile_id: root.profile_id,
                    pub_id: root.pub_id,
                    registry: registry_info.key(),
                    timestamp: clock.unix_timestamp,
                });
                msg!(
                    "Deployed collect registry for {}/{}",
                    root.profile_id,
                    root.pub_id
                );
                CollectRegistry::new(root.profile_id, root.pub_id, bump)
            }
        };

    let call = ModuleCall::ProcessCollect {
        referrer_profile_id,
        collector,
        profile_id: root.profile_id,
        pub_id: root.pub_id,
        data: params.data.clone(),
    };
    let module_accounts = gateway::bind_module(
        &call,
        &collect_module,
        None,
        Some(&*accounts.collect_module_program),
        Some(&*accounts.collect_module_state),
    )?;

    let mut store = AccountStore::writer(
        registry_info.key(),
        ctx.remaining_accounts,
        Funding {
            payer: &payer,
            system_program: &system_program,
        },
    );
    let token_id = mint_collect(
        &mut registry,
        &mut store,
        collector,
        clock.unix_timestamp,
        || {
            gateway::dispatch(
                &call,
                &module_accounts,
                &accounts.hub_authority,
                accounts.hub_config.authority_bump,
                &[
                    accounts.principal.to_account_info(),
                    accounts.collector_follow_record.to_account_info(),
                ],
            )
            .map(|_| ())
        },
    )?;
    storage::store_account(&registry_info, &registry)?;

    emit!(Collected {
        collector,
        profile_id: params.profile_id,
        pub_id: params.pub_id,
        root_profile_id: root.profile_id,
        root_pub_id: root.pub_id,
        token_id,
        timestamp: clock.unix_timestamp,
    });
    msg!(
        "{} collected {}/{} (root {}/{}) as token #{}",
        collector,
        params.profile_id,
        params.pub_id,
        root.profile_id,
        root.pub_id,
        token_id
    );
    Ok(token_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ProtocolState;
    use crate::test_utils::{comment, error_code, hub_config, mirror, post, MemoryStore};

    fn load_copy(publication: &Publication, profile_id: u64, pub_id: u64) -> Result<Publication> {
        if publication.id() == (profile_id, pub_id) {
            Ok(publication.clone())
        } else {
            err!(HubError::PublicationDoesNotExist)
        }
    }

    fn collect_through(
        entry: &Publication,
        expected_root: (u64, u64),
        root: &Publication,
        hops: &[Publication],
    ) -> Result<CollectTarget> {
        resolve_collect_target(
            entry.clone(),
            expected_root,
            chain_loader(expected_root, root, hops.iter(), load_copy),
        )
    }

    #[test]
    fn collecting_through_nested_mirrors_lands_on_the_root() {
        let module = Pubkey::new_unique();
        let root = post(1, 1, module);
        let inner = mirror(2, 1, (1, 1));
        let outer = mirror(3, 1, (2, 1));

        let target = collect_through(&outer, (1, 1), &root, &[inner]).unwrap();
        assert_eq!(target.root.id(), (1, 1));
        assert_eq!(target.collect_module, module);
        // the referral goes to the mirror actually collected
        assert_eq!(target.referrer_profile_id, 3);
    }

    #[test]
    fn direct_collects_refer_the_root_profile() {
        let module = Pubkey::new_unique();
        let root = comment(4, 2, (1, 1), module);
        let target = collect_through(&root, (4, 2), &root, &[]).unwrap();
        assert_eq!(target.referrer_profile_id, 4);
        assert_eq!(target.root.id(), (4, 2));
    }

    #[test]
    fn wrong_expected_root_is_rejected() {
        let module = Pubkey::new_unique();
        let root = post(1, 1, module);
        let other = post(9, 9, module);
        let entry = mirror(2, 1, (1, 1));

        // the chain resolves to 1/1 from the supplied hop, not the named root
        assert_eq!(
            error_code(collect_through(&entry, (9, 9), &other, &[root.clone()])),
            u32::from(HubError::CollectRootMismatch)
        );
        assert_eq!(
            error_code(collect_through(&root, (9, 9), &other, &[])),
            u32::from(HubError::CollectRootMismatch)
        );
    }

    #[test]
    fn missing_or_misordered_hops_are_rejected() {
        let module = Pubkey::new_unique();
        let root = post(1, 1, module);
        let inner = mirror(2, 1, (1, 1));
        let middle = mirror(3, 1, (2, 1));
        let outer = mirror(4, 1, (3, 1));

        assert_eq!(
            error_code(collect_through(&outer, (1, 1), &root, &[middle.clone()])),
            u32::from(HubError::CollectRootMismatch)
        );
        assert_eq!(
            error_code(collect_through(&outer, (1, 1), &root, &[inner.clone(), middle.clone()])),
            u32::from(HubError::PublicationDoesNotExist)
        );
        assert!(collect_through(&outer, (1, 1), &root, &[middle, inner]).is_ok());
    }

    #[test]
    fn a_mirror_cannot_be_named_as_root() {
        let module = Pubkey::new_unique();
        let root = post(1, 1, module);
        let inner = mirror(2, 1, (1, 1));
        let outer = mirror(3, 1, (2, 1));

        // naming the inner mirror still walks past it
        assert_eq!(
            error_code(collect_through(&outer, (2, 1), &inner, &[root])),
            u32::from(HubError::CollectRootMismatch)
        );
    }

    #[test]
    fn collecting_continues_while_publishing_is_paused() {
        let mut hub = hub_config();
        hub.state = ProtocolState::PublishingPaused;
        assert!(hub.check_gate(HubAction::Collect).is_ok());
        hub.state = ProtocolState::Paused;
        assert_eq!(
            error_code(hub.check_gate(HubAction::Collect)),
            u32::from(HubError::Paused)
        );
    }

    #[test]
    fn reverting_collect_module_leaves_no_token() {
        let mut store = MemoryStore::default();
        let mut registry = CollectRegistry::new(1, 1, 255);
        let collector = Pubkey::new_unique();

        let result = mint_collect(&mut registry, &mut store, collector, 0, || {
            Err(ProgramError::Custom(6001).into())
        });
        assert!(result.is_err());
        assert_eq!(registry.ledger.minted, 0);
        assert_eq!(store.token_count(), 0);

        let token_id = mint_collect(&mut registry, &mut store, collector, 5, || Ok(())).unwrap();
        assert_eq!(token_id, 1);
        assert_eq!(registry.ledger.owner_of(&store, 1).unwrap(), collector);
    }
}
