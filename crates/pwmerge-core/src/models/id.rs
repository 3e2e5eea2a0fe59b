//! Numeric id classification

use serde::{Deserialize, Serialize};

/// Highest id of the regular range; everything above is platform-managed.
pub const REGULAR_ID_MAX: u32 = 60_000;
/// First regular id, and the allocation start for regular collisions.
pub const REGULAR_ID_START: u32 = 1_000;
/// Allocation start for system collisions.
pub const SYSTEM_ID_START: u32 = 500;

/// Whether a uid/gid belongs to the platform or to ordinary users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdClass {
    /// Below 1000 or above 60000
    System,
    /// 1000 through 60000
    Regular,
}

impl IdClass {
    /// Classify an id
    #[must_use]
    pub const fn of(id: u32) -> Self {
        if id < REGULAR_ID_START || id > REGULAR_ID_MAX {
            Self::System
        } else {
            Self::Regular
        }
    }

    /// Where the free-id scan starts for a collision in this class
    #[must_use]
    pub const fn allocation_start(self) -> u32 {
        match self {
            Self::System => SYSTEM_ID_START,
            Self::Regular => REGULAR_ID_START,
        }
    }

    #[must_use]
    pub const fn is_system(self) -> bool {
        matches!(self, Self::System)
    }
}
