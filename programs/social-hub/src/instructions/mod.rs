pub mod increment_nonce;

pub mod governance;
pub mod profile;
pub mod publishing;
pub mod graph;
pub mod receipts;

pub use increment_nonce::*;
pub use governance::*;
pub use profile::*;
pub use publishing::*;
pub use graph::*;
pub use receipts::*;
