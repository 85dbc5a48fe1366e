//! Schema metadata records and the store they are read from

mod metadata;
mod store;

pub use metadata::*;
pub use store::*;
