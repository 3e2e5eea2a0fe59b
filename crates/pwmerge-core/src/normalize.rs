//! Rewrite account group references between gid and group name.
//!
//! A merge moves group ids around, so accounts refer to their primary group
//! by name while it runs. [`normalize`] swaps every numeric gid for the name
//! of the matching group; [`denormalize`] maps names back to the gid the
//! group holds in the merged table. Each is total over a consistent snapshot
//! and the two are inverses there.

use crate::error::{Error, Result};
use crate::models::GroupRef;
use crate::snapshot::Database;

/// Replace each account's numeric gid with the owning group's name.
///
/// References that are already names are left as they are.
pub fn normalize(mut database: Database) -> Result<Database> {
    let Database { passwd, group, .. } = &mut database;

    for account in passwd.iter_mut() {
        if let GroupRef::Id(gid) = account.gid {
            let owner = group.find_by_id(gid).ok_or_else(|| {
                Error::lookup("group", format!("gid {gid} (primary group of '{}')", account.name))
            })?;
            account.gid = GroupRef::Name(owner.name.clone());
        }
    }

    Ok(database)
}

/// Replace each account's group name with that group's gid.
pub fn denormalize(mut database: Database) -> Result<Database> {
    let Database { passwd, group, .. } = &mut database;

    for account in passwd.iter_mut() {
        if let GroupRef::Name(name) = &account.gid {
            let owner = group.get(name).ok_or_else(|| {
                Error::lookup(
                    "group",
                    format!("name '{name}' (primary group of '{}')", account.name),
                )
            })?;
            account.gid = GroupRef::Id(owner.gid);
        }
    }

    Ok(database)
}
