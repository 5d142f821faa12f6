//! Public runtime API surface.
//!
//! Errors shared by the bot aggregate, the runner and the transport seam live
//! here so the binary only needs one import.

pub mod errors;

pub use errors::{Result, RuntimeError};
