use super::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    #[serde(rename = "x86_64")]
    X86_64,
    Arm64,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86_64 => f.write_str("x86_64"),
            Self::Arm64 => f.write_str("arm64"),
        }
    }
}

/// A machine image available in one region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub description: String,
    pub family: String,
    pub version: String,
    pub architecture: Architecture,
    pub region: Region,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

impl Image {
    /// Key under which regional variants of the same image are grouped
    pub fn group_key(&self) -> (&str, &str, &str, Architecture) {
        (
            &self.family,
            &self.description,
            &self.version,
            self.architecture,
        )
    }
}
