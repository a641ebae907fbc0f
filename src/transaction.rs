//! Transaction module; the record types live in `types`

pub mod types;

pub use types::*;
