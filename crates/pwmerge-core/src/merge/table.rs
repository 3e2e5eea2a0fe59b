//! Merge one keyed table into another, deferring id collisions.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{IdClass, Identified};
use crate::snapshot::Table;

/// A source record whose id is already held by another name locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub id: u32,
    /// Name of the source record waiting for a new id
    pub incoming: String,
    /// Name of the destination record holding the id
    pub existing: String,
}

/// Result of [`merge_table`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableMerge {
    /// Names inserted under their original id
    pub inserted: Vec<String>,
    /// Records left for [`super::resolve_collisions`]
    pub collisions: Vec<Collision>,
}

/// Merge `source` into `destination`.
///
/// A name already present in the destination keeps the destination record.
/// Unknown names with a system id are left out; they are reported by
/// [`missing_system_entries`]. Unknown names whose id is taken are returned as
/// collisions. Everything else is inserted unchanged.
pub fn merge_table<T: Identified>(source: &Table<T>, destination: &mut Table<T>) -> TableMerge {
    let mut outcome = TableMerge::default();

    for entry in source {
        let name = entry.name();
        let id = entry.id();

        if destination.contains(name) {
            continue;
        }

        if IdClass::of(id).is_system() {
            debug!(kind = T::KIND, name, id, "skipping missing system entry");
            continue;
        }

        if let Some(existing) = destination.find_by_id(id) {
            warn!(
                kind = T::KIND,
                id,
                incoming = name,
                existing = existing.name(),
                "{} id {id} of '{name}' is already used by '{}', deferring",
                T::KIND,
                existing.name()
            );
            outcome.collisions.push(Collision {
                id,
                incoming: name.to_string(),
                existing: existing.name().to_string(),
            });
            continue;
        }

        info!(kind = T::KIND, name, id, "adding {} '{name}'", T::KIND);
        destination.insert(entry.clone());
        outcome.inserted.push(name.to_string());
    }

    outcome
}

/// Names with a system id in `source` that `destination` lacks, sorted.
pub fn missing_system_entries<T: Identified>(
    source: &Table<T>,
    destination: &Table<T>,
) -> Vec<String> {
    source
        .iter()
        .filter(|entry| IdClass::of(entry.id()).is_system() && !destination.contains(entry.name()))
        .map(|entry| entry.name().to_string())
        .collect()
}
