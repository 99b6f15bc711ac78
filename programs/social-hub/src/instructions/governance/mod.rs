pub mod initialize;
pub mod set_governance;
pub mod set_state;
pub mod whitelist;

pub use initialize::*;
pub use set_governance::*;
pub use set_state::*;
pub use whitelist::*;
