pub mod follow;
pub mod collect;
pub mod delegate;
pub mod power_views;

pub use follow::*;
pub use collect::*;
pub use delegate::*;
pub use power_views::*;
