//! In-memory database snapshot: three name-keyed tables.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Account, AgingRecord, Group, Identified, Named};

/// A table of records keyed by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Named> Table<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own name, returning the one it replaced
    pub fn insert(&mut self, entry: T) -> Option<T> {
        self.entries.insert(entry.name().to_string(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in name order
    pub fn iter(&self) -> btree_map::Values<'_, String, T> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> btree_map::ValuesMut<'_, String, T> {
        self.entries.values_mut()
    }

    /// Check that every map key matches the name stored in its record
    fn validate_keys(&self, table: &str) -> Result<()> {
        for (key, entry) in &self.entries {
            if key != entry.name() {
                return Err(Error::MalformedInput(format!(
                    "{table} entry keyed '{key}' is named '{}'",
                    entry.name()
                )));
            }
        }
        Ok(())
    }
}

impl<T: Identified> Table<T> {
    /// First record holding `id` (linear scan)
    pub fn find_by_id(&self, id: u32) -> Option<&T> {
        self.entries.values().find(|entry| entry.id() == id)
    }

    /// Every id in use
    pub fn used_ids(&self) -> BTreeSet<u32> {
        self.entries.values().map(Identified::id).collect()
    }
}

impl<T: Named> FromIterator<T> for Table<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = btree_map::Values<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// Accounts, groups, and password-aging records of one host
///
/// Serializes to the interchange object with `passwd`, `group` and `shadow`
/// members, each mapping a name to its record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub passwd: Table<Account>,
    pub group: Table<Group>,
    pub shadow: Table<AgingRecord>,
}

impl Database {
    /// Parse and validate an interchange document
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let database: Self = serde_json::from_str(raw)
            .map_err(|error| Error::MalformedInput(format!("invalid snapshot JSON: {error}")))?;
        database.validate()?;
        Ok(database)
    }

    /// Render the interchange document
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        self.passwd.validate_keys("passwd")?;
        self.group.validate_keys("group")?;
        self.shadow.validate_keys("shadow")
    }
}
