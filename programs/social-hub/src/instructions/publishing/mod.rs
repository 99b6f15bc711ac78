pub mod post;
pub mod comment;
pub mod mirror;
pub mod get_pub_type;

pub use post::*;
pub use comment::*;
pub use mirror::*;
pub use get_pub_type::*;

use anchor_lang::prelude::*;

use crate::gateway::{self, ModuleCall};
use crate::errors::HubError;
use crate::state::{ModuleWhitelist, Publication};

/// Signer, payer and target of the module callbacks run while a
/// publication is created.
pub struct PublishingModules<'a, 'info> {
    pub hub_authority: &'a AccountInfo<'info>,
    pub authority_bump: u8,
    /// `[payer, system_program]`, appended to every initialization CPI
    pub payer: &'a [AccountInfo<'info>],
    pub profile_id: u64,
    pub pub_id: u64,
}

impl<'a, 'info> PublishingModules<'a, 'info> {
    pub fn collect(
        &self,
        module: &Pubkey,
        whitelist: Option<&ModuleWhitelist>,
        program: Option<&AccountInfo<'info>>,
        state: Option<&AccountInfo<'info>>,
        data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let call = ModuleCall::InitializeCollect {
            profile_id: self.profile_id,
            pub_id: self.pub_id,
            data,
        };
        let accounts = gateway::bind_module(&call, module, whitelist, program, state)?;
        gateway::dispatch(&call, &accounts, self.hub_authority, self.authority_bump, self.payer)
    }

    /// No-op without a reference module.
    pub fn reference(
        &self,
        module: Option<&Pubkey>,
        whitelist: Option<&ModuleWhitelist>,
        program: Option<&AccountInfo<'info>>,
        state: Option<&AccountInfo<'info>>,
        data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let Some(module) = module else {
            return Ok(Vec::new());
        };
        let call = ModuleCall::InitializeReference {
            profile_id: self.profile_id,
            pub_id: self.pub_id,
            data,
        };
        let accounts = gateway::bind_module(&call, module, whitelist, program, state)?;
        gateway::dispatch(&call, &accounts, self.hub_authority, self.authority_bump, self.payer)
    }

    /// Let the pointed publication's reference module veto a comment or
    /// mirror. `follow_record` is the acting profile owner's holder record
    /// in the pointed profile's follow registry.
    pub fn validate_reference(
        &self,
        pointed: &Publication,
        call: ModuleCall,
        program: Option<&AccountInfo<'info>>,
        state: Option<&AccountInfo<'info>>,
        profile: &AccountInfo<'info>,
        follow_record: Option<&AccountInfo<'info>>,
    ) -> Result<()> {
        let Some(module) = pointed.reference_module else {
            return Ok(());
        };
        let accounts = gateway::bind_module(&call, &module, None, program, state)?;
        let follow_record = follow_record.ok_or_else(|| error!(HubError::ModuleAccountsMissing))?;
        gateway::dispatch(
            &call,
            &accounts,
            self.hub_authority,
            self.authority_bump,
            &[profile.clone(), follow_record.clone()],
        )?;
        Ok(())
    }
}
