//! Password-aging (shadow) model

use serde::{Deserialize, Serialize};

use super::Named;

/// Value used for an empty numeric shadow field
pub const UNSET_COUNTER: i64 = -1;

/// Password-aging state for one account
///
/// Counters follow the shadow convention: days since the epoch or day
/// counts, with `-1` standing for an empty field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingRecord {
    /// Owning account name
    #[serde(rename = "sp_nam")]
    pub name: String,
    /// Credential hash
    #[serde(rename = "sp_pwd")]
    pub hash: String,
    /// Date of last change
    #[serde(rename = "sp_lstchg")]
    pub last_change: i64,
    #[serde(rename = "sp_min")]
    pub min_age: i64,
    #[serde(rename = "sp_max")]
    pub max_age: i64,
    #[serde(rename = "sp_warn")]
    pub warn_period: i64,
    #[serde(rename = "sp_inact")]
    pub inactivity_period: i64,
    #[serde(rename = "sp_expire")]
    pub expire_date: i64,
    /// Reserved flag
    #[serde(rename = "sp_flag")]
    pub flag: i64,
}

impl AgingRecord {
    /// A record with the given hash and last change, other counters unset
    #[must_use]
    pub fn new(name: impl Into<String>, hash: impl Into<String>, last_change: i64) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            last_change,
            min_age: UNSET_COUNTER,
            max_age: UNSET_COUNTER,
            warn_period: UNSET_COUNTER,
            inactivity_period: UNSET_COUNTER,
            expire_date: UNSET_COUNTER,
            flag: UNSET_COUNTER,
        }
    }

    /// Counters in shadow field order
    #[must_use]
    pub const fn counters(&self) -> [i64; 7] {
        [
            self.last_change,
            self.min_age,
            self.max_age,
            self.warn_period,
            self.inactivity_period,
            self.expire_date,
            self.flag,
        ]
    }
}

impl Named for AgingRecord {
    fn name(&self) -> &str {
        &self.name
    }
}
