//! Shared types for the relay core.

pub mod errors;

pub use errors::{RelayError, RelayResult};
