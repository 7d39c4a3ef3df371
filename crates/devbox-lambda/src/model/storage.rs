use super::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account user who created a filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemCreator {
    pub id: String,
    pub email: String,
    pub status: String,
}

/// A persistent network filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filesystem {
    pub id: String,
    pub name: String,
    pub mount_point: String,
    pub created: DateTime<Utc>,
    pub created_by: FilesystemCreator,
    pub is_in_use: bool,
    pub region: Region,
    /// Raw bytes; absent while the provider has not measured usage yet
    #[serde(default)]
    pub bytes_used: Option<u64>,
}

/// A registered SSH public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshKey {
    pub id: String,
    pub name: String,
    pub public_key: String,
    /// Only returned when the provider generated the key pair
    #[serde(default)]
    pub private_key: Option<String>,
}
