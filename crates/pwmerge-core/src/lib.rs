//! pwmerge-core - Core library for pwmerge
//!
//! This crate contains the account models, snapshot sources, and the merge
//! and emit logic used to fold another host's passwd/group/shadow tables into
//! the local account database.

pub mod emit;
pub mod error;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod snapshot;
pub mod source;

pub use error::{Error, Result};
pub use merge::{merge_databases, MergeOutcome, MergePolicy, MergeReport, SystemEntryPolicy};
pub use models::{Account, AgingRecord, Group, GroupRef, IdClass};
pub use snapshot::{Database, Table};
