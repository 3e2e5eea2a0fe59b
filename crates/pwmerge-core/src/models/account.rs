//! Account (passwd) model

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{Identified, Named};

/// An account's primary group reference
///
/// Snapshots carry the numeric gid. While a merge runs the reference is
/// rewritten to the group's name so group id reassignments cannot invalidate
/// it; see [`crate::normalize`]. Only the numeric form is accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupRef {
    Id(u32),
    Name(String),
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(gid) => write!(f, "{gid}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Login name
    #[serde(rename = "pw_name")]
    pub name: String,
    /// Credential placeholder (usually `x`)
    #[serde(rename = "pw_passwd")]
    pub passwd: String,
    #[serde(rename = "pw_uid")]
    pub uid: u32,
    /// Primary group
    #[serde(rename = "pw_gid", deserialize_with = "numeric_gid")]
    pub gid: GroupRef,
    /// Comment (GECOS) field
    #[serde(rename = "pw_gecos")]
    pub gecos: String,
    /// Home directory
    #[serde(rename = "pw_dir")]
    pub dir: String,
    /// Login shell
    #[serde(rename = "pw_shell")]
    pub shell: String,
}

fn numeric_gid<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GroupRef, D::Error> {
    u32::deserialize(deserializer).map(GroupRef::Id)
}

impl Account {
    /// Create an account with a `x` credential placeholder and empty gecos
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        uid: u32,
        gid: u32,
        dir: impl Into<String>,
        shell: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passwd: "x".to_string(),
            uid,
            gid: GroupRef::Id(gid),
            gecos: String::new(),
            dir: dir.into(),
            shell: shell.into(),
        }
    }
}

impl Named for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Identified for Account {
    const KIND: &'static str = "user";

    fn id(&self) -> u32 {
        self.uid
    }

    fn set_id(&mut self, id: u32) {
        self.uid = id;
    }
}
