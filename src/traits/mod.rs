//! Public traits for container participants.

pub mod dispose;

pub use dispose::{AsyncDispose, Dispose};
