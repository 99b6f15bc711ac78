pub mod follow_tokens;
pub mod collect_tokens;
pub mod views;

pub use follow_tokens::*;
pub use collect_tokens::*;
pub use views::*;
