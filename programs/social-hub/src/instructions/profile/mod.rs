pub mod create_profile;
pub mod set_follow_module;
pub mod settings;
pub mod transfer_profile;
pub mod burn_profile;

pub use create_profile::*;
pub use set_follow_module::*;
pub use settings::*;
pub use transfer_profile::*;
pub use burn_profile::*;
