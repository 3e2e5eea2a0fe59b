//! Data models for pwmerge

mod account;
mod aging;
mod group;
mod id;

pub use account::{Account, GroupRef};
pub use aging::{AgingRecord, UNSET_COUNTER};
pub use group::Group;
pub use id::{IdClass, REGULAR_ID_MAX, REGULAR_ID_START, SYSTEM_ID_START};

/// A record keyed by its name within a table
pub trait Named {
    /// Primary key
    fn name(&self) -> &str;
}

/// A record that also carries a numeric id unique within its table
pub trait Identified: Named + Clone {
    /// Table label used in diagnostics ("user", "group")
    const KIND: &'static str;

    /// Secondary key (uid or gid)
    fn id(&self) -> u32;

    /// Replace the secondary key
    fn set_id(&mut self, id: u32);
}
