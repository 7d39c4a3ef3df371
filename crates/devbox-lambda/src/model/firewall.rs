use super::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    All,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
            Self::All => "all",
        };
        f.write_str(s)
    }
}

/// One inbound rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    pub protocol: Protocol,
    /// Inclusive `[low, high]`; absent for icmp and all
    #[serde(default)]
    pub port_range: Option<[u16; 2]>,
    pub source_network: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRuleset {
    pub id: String,
    pub name: String,
    pub region: Region,
    #[serde(default)]
    pub rules: Vec<FirewallRule>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub instance_ids: Vec<String>,
}

impl FirewallRuleset {
    pub fn is_in_use(&self) -> bool {
        !self.instance_ids.is_empty()
    }
}
