pub mod diff;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod serializer;

pub use diff::*;
pub use error::*;
pub use parser::*;
pub use pipeline::*;
pub use serializer::*;
