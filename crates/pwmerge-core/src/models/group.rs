//! Group model

use serde::{Deserialize, Serialize};

use super::{Identified, Named};

/// A group and its supplementary members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "gr_name")]
    pub name: String,
    /// Credential placeholder
    #[serde(rename = "gr_passwd")]
    pub passwd: String,
    #[serde(rename = "gr_gid")]
    pub gid: u32,
    /// Member account names (order is not significant)
    #[serde(rename = "gr_mem", default)]
    pub members: Vec<String>,
}

impl Group {
    /// Create a group with a `x` credential placeholder
    #[must_use]
    pub fn new(name: impl Into<String>, gid: u32, members: &[&str]) -> Self {
        Self {
            name: name.into(),
            passwd: "x".to_string(),
            gid,
            members: members.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Named for Group {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Identified for Group {
    const KIND: &'static str = "group";

    fn id(&self) -> u32 {
        self.gid
    }

    fn set_id(&mut self, id: u32) {
        self.gid = id;
    }
}
