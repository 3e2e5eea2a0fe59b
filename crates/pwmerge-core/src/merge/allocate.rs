//! Place deferred records under the lowest free id of their range.

use serde::Serialize;
use tracing::info;

use super::table::Collision;
use crate::error::{Error, Result};
use crate::models::{IdClass, Identified, REGULAR_ID_MAX};
use crate::snapshot::Table;

/// A record inserted under a new id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    pub name: String,
    pub original_id: u32,
    pub assigned_id: u32,
}

/// Lowest id not used in `table`, scanning up from 500 when `original_id` is
/// a system id and from 1000 otherwise.
///
/// Regular ids never leave the regular range; a full range is
/// [`Error::IdSpaceExhausted`].
pub fn allocate_free_id<T: Identified>(table: &Table<T>, original_id: u32) -> Result<u32> {
    let class = IdClass::of(original_id);
    let start = class.allocation_start();
    let end = if class.is_system() {
        u32::MAX
    } else {
        REGULAR_ID_MAX
    };
    let used = table.used_ids();

    (start..=end)
        .find(|id| !used.contains(id))
        .ok_or(Error::IdSpaceExhausted { start })
}

/// Insert a copy of each colliding source record under a freshly allocated id.
///
/// The source record is found again by its name, since several source records
/// may share one id. A miss means the collision list does not belong to
/// `source`.
pub fn resolve_collisions<T: Identified>(
    source: &Table<T>,
    destination: &mut Table<T>,
    collisions: &[Collision],
) -> Result<Vec<Reassignment>> {
    let mut reassignments = Vec::with_capacity(collisions.len());

    for collision in collisions {
        let original = source
            .get(&collision.incoming)
            .filter(|entry| entry.id() == collision.id)
            .ok_or_else(|| {
                Error::lookup(
                    T::KIND,
                    format!("name '{}' and id {}", collision.incoming, collision.id),
                )
            })?;

        let assigned_id = allocate_free_id(destination, collision.id)?;
        let mut entry = original.clone();
        entry.set_id(assigned_id);

        info!(
            kind = T::KIND,
            name = entry.name(),
            original_id = collision.id,
            assigned_id,
            "adding {} '{}' under id {assigned_id} (was {})",
            T::KIND,
            entry.name(),
            collision.id
        );

        reassignments.push(Reassignment {
            name: entry.name().to_string(),
            original_id: collision.id,
            assigned_id,
        });
        destination.insert(entry);
    }

    Ok(reassignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Group, REGULAR_ID_START};
    use pretty_assertions::assert_eq;

    fn groups(ids: &[u32]) -> Table<Group> {
        ids.iter()
            .map(|gid| Group::new(format!("g{gid}"), *gid, &[]))
            .collect()
    }

    #[test]
    fn regular_collision_takes_lowest_free_regular_id() {
        let table = groups(&[1000, 1001, 1003]);
        assert_eq!(allocate_free_id(&table, 1001).unwrap(), 1002);
    }

    #[test]
    fn system_collision_takes_lowest_free_id_from_500() {
        let table = groups(&[500, 501]);
        assert_eq!(allocate_free_id(&table, 42).unwrap(), 502);
    }

    #[test]
    fn regular_scan_ignores_system_range_holes() {
        let table = groups(&[0, 1, 1000]);
        assert_eq!(allocate_free_id(&table, 5000).unwrap(), 1001);
    }

    #[test]
    fn empty_table_yields_range_start() {
        assert_eq!(allocate_free_id(&groups(&[]), 2000).unwrap(), 1000);
        assert_eq!(allocate_free_id(&groups(&[]), 65_534).unwrap(), 500);
    }

    #[test]
    fn resolves_collision_with_independent_copy() {
        let source: Table<Account> = [Account::new("carol", 1500, 100, "/home/carol", "/bin/sh")]
            .into_iter()
            .collect();
        let mut destination: Table<Account> = [
            Account::new("alice", 1000, 100, "/home/alice", "/bin/sh"),
            Account::new("dave", 1500, 100, "/home/dave", "/bin/sh"),
        ]
        .into_iter()
        .collect();
        let collisions = vec![Collision {
            id: 1500,
            incoming: "carol".to_string(),
            existing: "dave".to_string(),
        }];

        let reassignments = resolve_collisions(&source, &mut destination, &collisions).unwrap();

        assert_eq!(
            reassignments,
            vec![Reassignment {
                name: "carol".to_string(),
                original_id: 1500,
                assigned_id: 1001,
            }]
        );
        let carol = destination.get("carol").unwrap();
        assert_eq!(carol.uid, 1001);
        assert_eq!(carol.dir, "/home/carol");
        assert_eq!(source.get("carol").unwrap().uid, 1500);
    }

    #[test]
    fn consecutive_collisions_get_distinct_ids() {
        let source: Table<Group> = [
            Group::new("remote1000", 1000, &[]),
            Group::new("remote1001", 1001, &[]),
        ]
        .into_iter()
        .collect();
        let mut destination = groups(&[1000, 1001]);
        let collisions = [1000, 1001]
            .iter()
            .map(|id| Collision {
                id: *id,
                incoming: format!("remote{id}"),
                existing: format!("g{id}"),
            })
            .collect::<Vec<_>>();

        let reassignments = resolve_collisions(&source, &mut destination, &collisions).unwrap();

        let assigned = reassignments
            .iter()
            .map(|r| r.assigned_id)
            .collect::<Vec<_>>();
        assert_eq!(assigned, vec![1002, 1003]);
        assert_eq!(destination.used_ids().len(), destination.len());
    }

    #[test]
    fn regular_range_full_is_exhausted() {
        let table = groups(&(REGULAR_ID_START..=REGULAR_ID_MAX).collect::<Vec<_>>());

        let error = allocate_free_id(&table, 1500).unwrap_err();
        assert!(matches!(error, Error::IdSpaceExhausted { start: 1000 }));
    }

    #[test]
    fn regular_scan_does_not_spill_into_system_range() {
        let mut table = groups(&(REGULAR_ID_START..=REGULAR_ID_MAX).collect::<Vec<_>>());
        table.insert(Group::new("high", 60_100, &[]));

        assert!(allocate_free_id(&table, 2000).is_err());
        assert_eq!(allocate_free_id(&table, 60_100).unwrap(), 500);
    }

    #[test]
    fn records_sharing_an_id_are_each_placed() {
        let source: Table<Account> = [
            Account::new("anna", 1500, 100, "/home/anna", "/bin/sh"),
            Account::new("zed", 1500, 100, "/home/zed", "/bin/sh"),
        ]
        .into_iter()
        .collect();
        let mut destination: Table<Account> =
            [Account::new("dave", 1500, 100, "/home/dave", "/bin/sh")]
                .into_iter()
                .collect();
        let collisions = ["anna", "zed"]
            .iter()
            .map(|name| Collision {
                id: 1500,
                incoming: (*name).to_string(),
                existing: "dave".to_string(),
            })
            .collect::<Vec<_>>();

        let reassignments = resolve_collisions(&source, &mut destination, &collisions).unwrap();

        let placed = reassignments
            .iter()
            .map(|r| (r.name.as_str(), r.assigned_id))
            .collect::<Vec<_>>();
        assert_eq!(placed, vec![("anna", 1000), ("zed", 1001)]);
        assert_eq!(destination.get("zed").unwrap().dir, "/home/zed");
        assert_eq!(destination.len(), 3);
    }

    #[test]
    fn unknown_collision_entry_is_a_lookup_failure() {
        let collisions = vec![Collision {
            id: 4000,
            incoming: "ghost".to_string(),
            existing: "g4000".to_string(),
        }];
        let mut destination = groups(&[4000]);

        let error = resolve_collisions(&groups(&[]), &mut destination, &collisions).unwrap_err();
        assert!(matches!(error, Error::Lookup { table: "group", .. }));
    }
}
