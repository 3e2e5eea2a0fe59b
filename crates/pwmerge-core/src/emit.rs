//! Render merged tables as colon-delimited passwd/group/shadow files.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{Account, AgingRecord, Group, UNSET_COUNTER};
use crate::snapshot::{Database, Table};

pub const PASSWD_FILE: &str = "passwd.new";
pub const GROUP_FILE: &str = "group.new";
pub const SHADOW_FILE: &str = "shadow.new";

/// Paths written by [`write_snapshot`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub passwd: PathBuf,
    pub group: PathBuf,
    pub shadow: PathBuf,
}

/// `name:passwd:uid:gid:gecos:dir:shell`, ordered by uid.
#[must_use]
pub fn render_passwd(accounts: &Table<Account>) -> String {
    let mut rows = accounts.iter().collect::<Vec<_>>();
    rows.sort_by(|a, b| (a.uid, &a.name).cmp(&(b.uid, &b.name)));

    let mut output = String::new();
    for account in rows {
        let _ = writeln!(
            output,
            "{}:{}:{}:{}:{}:{}:{}",
            account.name,
            account.passwd,
            account.uid,
            account.gid,
            account.gecos,
            account.dir,
            account.shell
        );
    }
    output
}

/// `name:passwd:gid:member,member`, ordered by gid.
#[must_use]
pub fn render_group(groups: &Table<Group>) -> String {
    let mut rows = groups.iter().collect::<Vec<_>>();
    rows.sort_by(|a, b| (a.gid, &a.name).cmp(&(b.gid, &b.name)));

    let mut output = String::new();
    for group in rows {
        let _ = writeln!(
            output,
            "{}:{}:{}:{}",
            group.name,
            group.passwd,
            group.gid,
            group.members.join(",")
        );
    }
    output
}

/// `name:hash:lastchg:min:max:warn:inact:expire:flag` in account order,
/// records without an account last.
#[must_use]
pub fn render_shadow(aging: &Table<AgingRecord>, accounts: &Table<Account>) -> String {
    let mut rows = aging
        .iter()
        .map(|record| (accounts.get(&record.name).map(|account| account.uid), record))
        .collect::<Vec<_>>();
    rows.sort_by(|(a_uid, a), (b_uid, b)| {
        (a_uid.is_none(), a_uid, &a.name).cmp(&(b_uid.is_none(), b_uid, &b.name))
    });

    let mut output = String::new();
    for (_, record) in rows {
        let _ = write!(output, "{}:{}", record.name, record.hash);
        for counter in record.counters() {
            output.push(':');
            if counter != UNSET_COUNTER {
                let _ = write!(output, "{counter}");
            }
        }
        output.push('\n');
    }
    output
}

/// Write `passwd.new`, `group.new` and `shadow.new` into `dir`, creating it.
///
/// Each body is staged in a temporary file inside `dir` and renamed into
/// place only once all three are on disk. When a rename fails, the files
/// already renamed are removed again, so `dir` never holds a partial set.
pub fn write_snapshot(dir: &Path, database: &Database) -> Result<WrittenFiles> {
    let bodies = [
        (PASSWD_FILE, render_passwd(&database.passwd)),
        (GROUP_FILE, render_group(&database.group)),
        (SHADOW_FILE, render_shadow(&database.shadow, &database.passwd)),
    ];

    std::fs::create_dir_all(dir)?;

    let mut staged = Vec::with_capacity(bodies.len());
    for (file, body) in &bodies {
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(body.as_bytes())?;
        temp.as_file().sync_all()?;
        staged.push((dir.join(file), temp));
    }

    let mut committed: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (target, temp) in staged {
        if let Err(error) = temp.persist(&target) {
            for path in &committed {
                if let Err(cleanup) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), %cleanup, "could not remove partial output");
                }
            }
            return Err(error.error.into());
        }
        committed.push(target);
    }

    info!(dir = %dir.display(), "wrote merged database");
    Ok(WrittenFiles {
        passwd: dir.join(PASSWD_FILE),
        group: dir.join(GROUP_FILE),
        shadow: dir.join(SHADOW_FILE),
    })
}
