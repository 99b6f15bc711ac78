use anchor_lang::prelude::*;

#[error_code]
pub enum HubError {
    // === Authorization ===
    #[msg("Caller is not the governance authority")]
    NotGovernance,

    #[msg("Caller is neither governance nor the emergency admin")]
    NotGovernanceOrEmergencyAdmin,

    #[msg("Caller is not the profile owner")]
    NotProfileOwner,

    #[msg("Caller is neither the profile owner nor its dispatcher")]
    NotProfileOwnerOrDispatcher,

    #[msg("Caller is neither the token owner nor approved for it")]
    NotOwnerOrApproved,

    #[msg("Direct calls must be made by the principal itself")]
    CallerNotPrincipal,

    #[msg("Account is not the follow registry of this profile")]
    NotFollowRegistry,

    #[msg("Account is not the collect registry of this publication")]
    NotCollectRegistry,

    #[msg("Only the program upgrade authority may initialize the hub")]
    NotUpgradeAuthority,

    // === Signature ===
    #[msg("Signature is invalid for this principal, payload and nonce")]
    SignatureInvalid,

    #[msg("Signature deadline has passed")]
    SignatureExpired,

    // === Protocol state ===
    #[msg("Protocol is paused")]
    Paused,

    #[msg("Publishing is paused")]
    PublishingPaused,

    // === Existence ===
    #[msg("Profile does not exist")]
    ProfileNotFound,

    #[msg("Publication does not exist")]
    PublicationDoesNotExist,

    #[msg("Token does not exist")]
    TokenDoesNotExist,

    // === Validation ===
    #[msg("Parameter arrays differ in length")]
    ArrayMismatch,

    #[msg("Follow module is not whitelisted")]
    FollowModuleNotWhitelisted,

    #[msg("Collect module is not whitelisted")]
    CollectModuleNotWhitelisted,

    #[msg("Reference module is not whitelisted")]
    ReferenceModuleNotWhitelisted,

    #[msg("Profile creator is not whitelisted")]
    ProfileCreatorNotWhitelisted,

    #[msg("Handle must be between 1 and 31 bytes")]
    HandleLengthInvalid,

    #[msg("Handle may only contain a-z, 0-9, '.', '_' and '-'")]
    HandleContainsInvalidCharacters,

    #[msg("Handle may not start with '.'")]
    HandleFirstCharInvalid,

    #[msg("Handle is already taken")]
    HandleTaken,

    #[msg("URI exceeds 256 bytes")]
    UriTooLong,

    #[msg("Module program or state account missing")]
    ModuleAccountsMissing,

    #[msg("Module program does not match the configured module")]
    ModuleProgramMismatch,

    #[msg("Pointer chain does not resolve to the supplied root publication")]
    CollectRootMismatch,

    #[msg("Recipient cannot be the default address")]
    InvalidRecipient,

    #[msg("A profile or registry record account was not supplied")]
    AccountsMissing,

    #[msg("Account is not a valid registry record")]
    RecordInvalid,

    // === Ledger ===
    #[msg("Block number is in the future")]
    BlockNumberInvalid,
}
