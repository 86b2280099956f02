//! Support code for the `pg-idempotent` command-line tool.
//!
//! The binary wires these helpers to [`pg_idempotent_core`]; they are kept
//! in a library so they can be tested without spawning the process.

pub mod error;
pub mod files;
pub mod report;

pub use error::{CliError, Result};
