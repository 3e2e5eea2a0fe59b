//! Fold a remote snapshot into the local one.
//!
//! The steps run in dependency order: group references are normalized to
//! names, groups are merged before accounts, deferred group collisions are
//! placed before deferred account collisions, aging records follow once
//! account names are final, and group references are finally mapped back to
//! the merged gids.

mod aging;
mod allocate;
mod table;

pub use aging::{merge_aging, AgingMerge};
pub use allocate::{allocate_free_id, resolve_collisions, Reassignment};
pub use table::{merge_table, missing_system_entries, Collision, TableMerge};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::normalize::{denormalize, normalize};
use crate::snapshot::Database;

/// What to do when remote system accounts or groups are absent locally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemEntryPolicy {
    /// Log them and continue
    #[default]
    Warn,
    /// Abort before any table is changed
    Fail,
}

/// Knobs for [`merge_databases`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergePolicy {
    pub missing_system_entries: SystemEntryPolicy,
}

/// Every diagnostic a merge produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub missing_system_users: Vec<String>,
    pub missing_system_groups: Vec<String>,
    pub added_groups: Vec<String>,
    pub added_users: Vec<String>,
    pub group_collisions: Vec<Collision>,
    pub user_collisions: Vec<Collision>,
    pub group_reassignments: Vec<Reassignment>,
    pub user_reassignments: Vec<Reassignment>,
    pub added_aging: Vec<String>,
    pub aging_divergences: Vec<String>,
}

impl MergeReport {
    /// True when the merge left the local database untouched
    pub fn is_noop(&self) -> bool {
        self.added_groups.is_empty()
            && self.added_users.is_empty()
            && self.group_reassignments.is_empty()
            && self.user_reassignments.is_empty()
            && self.added_aging.is_empty()
    }
}

/// Merged database plus the diagnostics gathered on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub database: Database,
    pub report: MergeReport,
}

/// Merge `remote` into `local`, local records winning on name matches.
///
/// Fails on lookup failures (an inconsistent snapshot) and, under
/// [`SystemEntryPolicy::Fail`], when remote system entries are missing
/// locally. `remote` is never modified.
pub fn merge_databases(
    local: Database,
    remote: &Database,
    policy: &MergePolicy,
) -> Result<MergeOutcome> {
    debug!(
        users = local.passwd.len(),
        groups = local.group.len(),
        aging = local.shadow.len(),
        "local snapshot"
    );
    debug!(
        users = remote.passwd.len(),
        groups = remote.group.len(),
        aging = remote.shadow.len(),
        "remote snapshot"
    );

    let source = normalize(remote.clone())?;
    let mut destination = normalize(local)?;
    let mut report = MergeReport {
        missing_system_users: missing_system_entries(&source.passwd, &destination.passwd),
        missing_system_groups: missing_system_entries(&source.group, &destination.group),
        ..MergeReport::default()
    };
    check_missing_system_entries(&report, policy.missing_system_entries)?;

    let groups = merge_table(&source.group, &mut destination.group);
    let users = merge_table(&source.passwd, &mut destination.passwd);

    report.group_reassignments =
        resolve_collisions(&source.group, &mut destination.group, &groups.collisions)?;
    report.user_reassignments =
        resolve_collisions(&source.passwd, &mut destination.passwd, &users.collisions)?;

    let aging = merge_aging(&source, &mut destination)?;
    let database = denormalize(destination)?;

    report.added_groups = groups.inserted;
    report.group_collisions = groups.collisions;
    report.added_users = users.inserted;
    report.user_collisions = users.collisions;
    report.added_aging = aging.inserted;
    report.aging_divergences = aging.divergences;

    info!(
        added_groups = report.added_groups.len() + report.group_reassignments.len(),
        added_users = report.added_users.len() + report.user_reassignments.len(),
        added_aging = report.added_aging.len(),
        "merge complete"
    );

    Ok(MergeOutcome { database, report })
}

fn check_missing_system_entries(report: &MergeReport, policy: SystemEntryPolicy) -> Result<()> {
    let users = &report.missing_system_users;
    let groups = &report.missing_system_groups;

    if !users.is_empty() {
        warn!(
            "missing system users (install the packages that provide them): {}",
            users.join(", ")
        );
    }
    if !groups.is_empty() {
        warn!(
            "missing system groups (install the packages that provide them): {}",
            groups.join(", ")
        );
    }

    if policy == SystemEntryPolicy::Fail && !(users.is_empty() && groups.is_empty()) {
        return Err(Error::MissingSystemEntries(format!(
            "users [{}], groups [{}]",
            users.join(", "),
            groups.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AgingRecord, Group, GroupRef, Identified, Named};
    use crate::snapshot::Table;
    use pretty_assertions::assert_eq;

    fn local() -> Database {
        Database {
            passwd: [
                Account::new("root", 0, 0, "/root", "/bin/sh"),
                Account::new("alice", 1000, 100, "/home/alice", "/bin/bash"),
                Account::new("dave", 1500, 100, "/home/dave", "/bin/bash"),
            ]
            .into_iter()
            .collect(),
            group: [
                Group::new("root", 0, &[]),
                Group::new("staff", 100, &["alice", "dave"]),
                Group::new("dave", 1500, &[]),
            ]
            .into_iter()
            .collect(),
            shadow: [
                AgingRecord::new("root", "*", 18_000),
                AgingRecord::new("alice", "$6$a", 19_000),
                AgingRecord::new("dave", "$6$d", 19_000),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn remote() -> Database {
        Database {
            passwd: [
                Account::new("root", 0, 0, "/root", "/bin/zsh"),
                Account::new("daemon2", 50, 50, "/", "/usr/sbin/nologin"),
                Account::new("bob", 2000, 100, "/home/bob", "/bin/bash"),
                Account::new("carol", 1500, 1500, "/home/carol", "/bin/bash"),
            ]
            .into_iter()
            .collect(),
            group: [
                Group::new("root", 0, &[]),
                Group::new("daemon2", 50, &[]),
                Group::new("staff", 100, &["bob"]),
                Group::new("carol", 1500, &[]),
            ]
            .into_iter()
            .collect(),
            shadow: [
                AgingRecord::new("root", "$6$other-root", 18_500),
                AgingRecord::new("daemon2", "*", 18_000),
                AgingRecord::new("bob", "$6$b", 19_100),
                AgingRecord::new("carol", "$6$c", 19_200),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn assert_unique_ids<T: Identified>(table: &Table<T>) {
        assert_eq!(table.used_ids().len(), table.len(), "duplicate {} id", T::KIND);
    }

    fn assert_referential_integrity(database: &Database) {
        for account in &database.passwd {
            let GroupRef::Id(gid) = account.gid else {
                panic!("{} still has a named group reference", account.name);
            };
            assert!(
                database.group.find_by_id(gid).is_some(),
                "{} references missing gid {gid}",
                account.name
            );
        }
        for record in &database.shadow {
            assert!(
                database.passwd.contains(record.name()),
                "aging record for unknown user {}",
                record.name
            );
        }
    }

    #[test]
    fn merging_a_snapshot_into_itself_changes_nothing() {
        let outcome = merge_databases(local(), &local(), &MergePolicy::default()).unwrap();

        assert_eq!(outcome.database, local());
        assert!(outcome.report.is_noop());
        assert_eq!(outcome.report, MergeReport::default());
    }

    #[test]
    fn clean_new_account_keeps_its_uid() {
        let outcome = merge_databases(local(), &remote(), &MergePolicy::default()).unwrap();

        let bob = outcome.database.passwd.get("bob").unwrap();
        assert_eq!(bob, remote().passwd.get("bob").unwrap());
        assert!(outcome.report.added_users.contains(&"bob".to_string()));
    }

    #[test]
    fn colliding_uid_and_gid_are_reallocated() {
        let outcome = merge_databases(local(), &remote(), &MergePolicy::default()).unwrap();
        let report = &outcome.report;

        assert_eq!(
            report.user_collisions,
            vec![Collision {
                id: 1500,
                incoming: "carol".to_string(),
                existing: "dave".to_string(),
            }]
        );
        assert_eq!(
            report.group_reassignments,
            vec![Reassignment {
                name: "carol".to_string(),
                original_id: 1500,
                assigned_id: 1000,
            }]
        );
        assert_eq!(
            report.user_reassignments,
            vec![Reassignment {
                name: "carol".to_string(),
                original_id: 1500,
                assigned_id: 1001,
            }]
        );

        let carol = outcome.database.passwd.get("carol").unwrap();
        assert_eq!(carol.uid, 1001);
        assert_eq!(carol.gid, GroupRef::Id(1000));
    }

    #[test]
    fn account_follows_its_group_to_the_local_gid() {
        let mut remote = remote();
        remote.group.insert(Group::new("staff", 4000, &["bob"]));
        remote
            .passwd
            .insert(Account::new("bob", 2000, 4000, "/home/bob", "/bin/bash"));

        let outcome = merge_databases(local(), &remote, &MergePolicy::default()).unwrap();

        assert_eq!(outcome.database.group.get("staff").unwrap().gid, 100);
        assert_eq!(
            outcome.database.passwd.get("bob").unwrap().gid,
            GroupRef::Id(100)
        );
    }

    #[test]
    fn system_account_gap_is_reported_not_merged() {
        let outcome = merge_databases(local(), &remote(), &MergePolicy::default()).unwrap();

        assert!(!outcome.database.passwd.contains("daemon2"));
        assert!(!outcome.database.shadow.contains("daemon2"));
        assert_eq!(outcome.report.missing_system_users, vec!["daemon2"]);
        assert_eq!(outcome.report.missing_system_groups, vec!["daemon2"]);
    }

    #[test]
    fn fail_policy_aborts_on_missing_system_entries() {
        let policy = MergePolicy {
            missing_system_entries: SystemEntryPolicy::Fail,
        };

        let error = merge_databases(local(), &remote(), &policy).unwrap_err();
        assert!(matches!(error, Error::MissingSystemEntries(ref message) if message.contains("daemon2")));
    }

    #[test]
    fn fail_policy_passes_when_nothing_is_missing() {
        let policy = MergePolicy {
            missing_system_entries: SystemEntryPolicy::Fail,
        };

        assert!(merge_databases(local(), &local(), &policy).is_ok());
    }

    #[test]
    fn local_entries_are_never_changed() {
        let before = local();
        let outcome = merge_databases(before.clone(), &remote(), &MergePolicy::default()).unwrap();

        for account in &before.passwd {
            assert_eq!(outcome.database.passwd.get(&account.name), Some(account));
        }
        for group in &before.group {
            assert_eq!(outcome.database.group.get(&group.name), Some(group));
        }
        for record in &before.shadow {
            assert_eq!(outcome.database.shadow.get(&record.name), Some(record));
        }
    }

    #[test]
    fn aging_divergence_keeps_local_record() {
        let mut remote = remote();
        remote.passwd.insert(Account::new("alice", 1000, 100, "/home/alice", "/bin/bash"));
        remote.shadow.insert(AgingRecord::new("alice", "$6$a", 19_999));

        let outcome = merge_databases(local(), &remote, &MergePolicy::default()).unwrap();

        assert_eq!(outcome.report.aging_divergences, vec!["alice"]);
        assert_eq!(
            outcome.database.shadow.get("alice").unwrap().last_change,
            19_000
        );
    }

    #[test]
    fn merged_database_is_consistent() {
        let outcome = merge_databases(local(), &remote(), &MergePolicy::default()).unwrap();

        assert_unique_ids(&outcome.database.passwd);
        assert_unique_ids(&outcome.database.group);
        assert_referential_integrity(&outcome.database);
        assert_eq!(outcome.report.added_aging, vec!["bob", "carol"]);
    }

    #[test]
    fn remote_is_not_modified() {
        let remote = remote();
        let before = remote.clone();

        merge_databases(local(), &remote, &MergePolicy::default()).unwrap();
        assert_eq!(remote, before);
    }

    #[test]
    fn remote_accounts_sharing_a_uid_are_all_merged() {
        let mut remote = local();
        remote
            .passwd
            .insert(Account::new("anna", 1500, 100, "/home/anna", "/bin/sh"));
        remote
            .passwd
            .insert(Account::new("zed", 1500, 100, "/home/zed", "/bin/sh"));

        let outcome = merge_databases(local(), &remote, &MergePolicy::default()).unwrap();

        let merged = &outcome.database.passwd;
        assert_eq!(merged.get("anna").unwrap().uid, 1001);
        assert_eq!(merged.get("zed").unwrap().uid, 1002);
        assert_eq!(merged.get("zed").unwrap().dir, "/home/zed");
        assert_unique_ids(merged);
        let names = outcome
            .report
            .user_reassignments
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["anna", "zed"]);
    }

    #[test]
    fn inconsistent_remote_is_a_lookup_failure() {
        let mut remote = remote();
        remote
            .passwd
            .insert(Account::new("eve", 3000, 7777, "/home/eve", "/bin/sh"));

        assert!(matches!(
            merge_databases(local(), &remote, &MergePolicy::default()),
            Err(Error::Lookup { .. })
        ));
    }
}
