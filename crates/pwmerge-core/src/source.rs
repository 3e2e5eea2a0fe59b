//! Where snapshots come from: the local flat files or an interchange JSON
//! file exported on another host.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Account, AgingRecord, Group, GroupRef, UNSET_COUNTER};
use crate::snapshot::{Database, Table};

/// Default root of the live account files
pub const DEFAULT_ETC_DIR: &str = "/etc";

/// Trait for loading a complete snapshot
pub trait SnapshotSource {
    /// Read all three tables
    fn load(&self) -> Result<Database>;
}

/// `passwd`, `group` and `shadow` flat files under one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtcFiles {
    root: PathBuf,
}

impl EtcFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, file: &str) -> Result<(PathBuf, String)> {
        let path = self.root.join(file);
        let raw = std::fs::read_to_string(&path).map_err(|source| Error::ReadFile {
            path: path.clone(),
            source,
        })?;
        Ok((path, raw))
    }
}

impl Default for EtcFiles {
    fn default() -> Self {
        Self::new(DEFAULT_ETC_DIR)
    }
}

impl SnapshotSource for EtcFiles {
    fn load(&self) -> Result<Database> {
        let (path, raw) = self.read("passwd")?;
        let passwd = parse_passwd(&raw, &path.display().to_string())?;
        let (path, raw) = self.read("group")?;
        let group = parse_group(&raw, &path.display().to_string())?;
        let (path, raw) = self.read("shadow")?;
        let shadow = parse_shadow(&raw, &path.display().to_string())?;

        debug!(
            root = %self.root.display(),
            users = passwd.len(),
            groups = group.len(),
            aging = shadow.len(),
            "loaded local account files"
        );
        Ok(Database {
            passwd,
            group,
            shadow,
        })
    }
}

/// Interchange JSON written by `pwmerge export`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for JsonSnapshotFile {
    fn load(&self) -> Result<Database> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| Error::ReadFile {
            path: self.path.clone(),
            source,
        })?;
        Database::from_json_str(&raw).map_err(|error| match error {
            Error::MalformedInput(message) => {
                Error::MalformedInput(format!("{}: {message}", self.path.display()))
            }
            other => other,
        })
    }
}

/// Parse passwd lines: `name:passwd:uid:gid:gecos:dir:shell`
pub fn parse_passwd(raw: &str, origin: &str) -> Result<Table<Account>> {
    records(raw, origin, 7)
        .map(|record| -> Result<Account> {
            let (line, fields) = record?;
            Ok(Account {
                name: fields[0].to_string(),
                passwd: fields[1].to_string(),
                uid: parse_id(fields[2], "uid", origin, line)?,
                gid: GroupRef::Id(parse_id(fields[3], "gid", origin, line)?),
                gecos: fields[4].to_string(),
                dir: fields[5].to_string(),
                shell: fields[6].to_string(),
            })
        })
        .collect()
}

/// Parse group lines: `name:passwd:gid:member,member`
pub fn parse_group(raw: &str, origin: &str) -> Result<Table<Group>> {
    records(raw, origin, 4)
        .map(|record| -> Result<Group> {
            let (line, fields) = record?;
            Ok(Group {
                name: fields[0].to_string(),
                passwd: fields[1].to_string(),
                gid: parse_id(fields[2], "gid", origin, line)?,
                members: fields[3]
                    .split(',')
                    .filter(|member| !member.is_empty())
                    .map(ToString::to_string)
                    .collect(),
            })
        })
        .collect()
}

/// Parse shadow lines: `name:hash:lastchg:min:max:warn:inact:expire:flag`
pub fn parse_shadow(raw: &str, origin: &str) -> Result<Table<AgingRecord>> {
    records(raw, origin, 9)
        .map(|record| -> Result<AgingRecord> {
            let (line, fields) = record?;
            let counter = |index: usize| parse_counter(fields[index], origin, line);
            Ok(AgingRecord {
                name: fields[0].to_string(),
                hash: fields[1].to_string(),
                last_change: counter(2)?,
                min_age: counter(3)?,
                max_age: counter(4)?,
                warn_period: counter(5)?,
                inactivity_period: counter(6)?,
                expire_date: counter(7)?,
                flag: counter(8)?,
            })
        })
        .collect()
}

/// Non-empty, non-comment lines split on `:`, with 1-based line numbers
fn records<'a>(
    raw: &'a str,
    origin: &'a str,
    width: usize,
) -> impl Iterator<Item = Result<(usize, Vec<&'a str>)>> + 'a {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(move |(index, line)| {
            let fields = line.split(':').collect::<Vec<_>>();
            if fields.len() == width {
                Ok((index + 1, fields))
            } else {
                Err(Error::MalformedInput(format!(
                    "{origin}:{}: expected {width} fields, found {}",
                    index + 1,
                    fields.len()
                )))
            }
        })
}

fn parse_id(field: &str, what: &str, origin: &str, line: usize) -> Result<u32> {
    field.parse().map_err(|_| {
        Error::MalformedInput(format!("{origin}:{line}: invalid {what} '{field}'"))
    })
}

fn parse_counter(field: &str, origin: &str, line: usize) -> Result<i64> {
    if field.is_empty() {
        return Ok(UNSET_COUNTER);
    }
    field.parse().map_err(|_| {
        Error::MalformedInput(format!("{origin}:{line}: invalid aging field '{field}'"))
    })
}
