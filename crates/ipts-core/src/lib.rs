pub mod error;
pub mod filter;
pub mod model;
pub mod profile;
pub mod profile_loader;
pub mod report;

pub use error::*;
pub use filter::*;
pub use model::*;
pub use profile::*;
pub use profile_loader::*;
pub use report::*;
