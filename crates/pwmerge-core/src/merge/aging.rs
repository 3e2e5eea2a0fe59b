//! Merge password-aging records once account names and ids are final.

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::IdClass;
use crate::snapshot::Database;

/// Result of [`merge_aging`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgingMerge {
    pub inserted: Vec<String>,
    /// Names whose local record differs from the remote one (local kept)
    pub divergences: Vec<String>,
}

/// Merge `source.shadow` into `destination.shadow`.
///
/// Records owned by system accounts (judged by the source uid) are skipped.
/// A local record always stays; a differing remote record is only reported.
pub fn merge_aging(source: &Database, destination: &mut Database) -> Result<AgingMerge> {
    let mut outcome = AgingMerge::default();

    for record in &source.shadow {
        let name = record.name.as_str();
        let owner = source
            .passwd
            .get(name)
            .ok_or_else(|| Error::lookup("user", format!("name '{name}' (owner of aging record)")))?;

        if IdClass::of(owner.uid).is_system() {
            continue;
        }

        match destination.shadow.get(name) {
            None => {
                info!(name, "adding aging record for '{name}'");
                destination.shadow.insert(record.clone());
                outcome.inserted.push(name.to_string());
            }
            Some(existing) if existing != record => {
                warn!(name, "aging record for '{name}' differs between hosts, keeping local");
                outcome.divergences.push(name.to_string());
            }
            Some(_) => {}
        }
    }

    Ok(outcome)
}
