use super::Region;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

/// Instance lifecycle status
///
/// Any other value on the wire is a decode error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Booting,
    Active,
    Unhealthy,
    Terminated,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booting => "booting",
            Self::Active => "active",
            Self::Unhealthy => "unhealthy",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware of an instance type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpecs {
    pub vcpus: u32,
    pub memory_gib: u32,
    pub storage_gib: u32,
    pub gpus: u32,
}

/// An instance type as referenced by instances and the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceType {
    pub name: String,
    pub description: String,
    pub gpu_description: String,
    pub price_cents_per_hour: u64,
    pub specs: InstanceSpecs,
}

/// A running (or recently running) instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Public IPv4, present once the instance is reachable
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
    pub status: InstanceStatus,
    #[serde(default)]
    pub ssh_key_names: Vec<String>,
    #[serde(default)]
    pub file_system_names: Vec<String>,
    pub region: Region,
    pub instance_type: InstanceType,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub jupyter_token: Option<String>,
    #[serde(default)]
    pub jupyter_url: Option<String>,
}

impl Instance {
    /// Public address, if one has been allocated
    pub fn public_ip(&self) -> Option<&str> {
        self.ip.as_deref().filter(|ip| !ip.is_empty())
    }

    /// Usable for SSH: booting or active, with a public address
    ///
    /// `booting` counts because the address is allocated before boot
    /// finishes.
    pub fn is_ready(&self) -> bool {
        matches!(self.status, InstanceStatus::Booting | InstanceStatus::Active)
            && self.public_ip().is_some()
    }
}

/// Catalog entry: an instance type plus the regions with spare capacity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTypeAvailability {
    pub instance_type: InstanceType,
    pub regions_with_capacity_available: Vec<Region>,
}

impl InstanceTypeAvailability {
    pub fn has_capacity(&self) -> bool {
        !self.regions_with_capacity_available.is_empty()
    }
}

/// The instance type catalog keyed by type name
///
/// Capacity is a point-in-time answer; fetch again for fresh data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceTypes(pub BTreeMap<String, InstanceTypeAvailability>);

impl InstanceTypes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&InstanceTypeAvailability> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InstanceTypeAvailability)> {
        self.0.iter()
    }

    /// Entries that currently report capacity somewhere
    pub fn with_capacity(&self) -> impl Iterator<Item = &InstanceTypeAvailability> {
        self.0.values().filter(|item| item.has_capacity())
    }

    /// Names of every region where at least one type has capacity
    pub fn regions_with_capacity(&self) -> BTreeSet<String> {
        self.with_capacity()
            .flat_map(|item| item.regions_with_capacity_available.iter())
            .map(|region| region.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance_json(status: &str, ip: Option<&str>) -> serde_json::Value {
        json!({
            "id": "0920582c7ff041399e34823a0be62549",
            "name": "trainer",
            "ip": ip,
            "status": status,
            "ssh_key_names": ["laptop"],
            "file_system_names": [],
            "region": {"name": "us-east-1", "description": "Virginia, USA"},
            "instance_type": {
                "name": "gpu_1x_a100",
                "description": "1x A100 (40 GB SXM4)",
                "gpu_description": "A100 (40 GB SXM4)",
                "price_cents_per_hour": 129,
                "specs": {"vcpus": 30, "memory_gib": 200, "storage_gib": 512, "gpus": 1}
            }
        })
    }

    #[test]
    fn test_instance_decode() {
        let instance: Instance =
            serde_json::from_value(instance_json("active", Some("198.51.100.2"))).unwrap();

        assert_eq!(instance.status, InstanceStatus::Active);
        assert_eq!(instance.public_ip(), Some("198.51.100.2"));
        assert_eq!(instance.instance_type.price_cents_per_hour, 129);
        assert!(instance.hostname.is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = serde_json::from_value::<Instance>(instance_json("rebooting", None));
        assert!(result.is_err());
    }

    #[test]
    fn test_readiness_predicate() {
        let booting: Instance =
            serde_json::from_value(instance_json("booting", Some("198.51.100.2"))).unwrap();
        let no_ip: Instance = serde_json::from_value(instance_json("active", None)).unwrap();
        let empty_ip: Instance =
            serde_json::from_value(instance_json("active", Some(""))).unwrap();
        let unhealthy: Instance =
            serde_json::from_value(instance_json("unhealthy", Some("198.51.100.2"))).unwrap();

        assert!(booting.is_ready());
        assert!(!no_ip.is_ready());
        assert!(!empty_ip.is_ready());
        assert!(!unhealthy.is_ready());
    }

    #[test]
    fn test_catalog_capacity_regions() {
        let catalog: InstanceTypes = serde_json::from_value(json!({
            "gpu_1x_a10": {
                "instance_type": {
                    "name": "gpu_1x_a10",
                    "description": "1x A10 (24 GB PCIe)",
                    "gpu_description": "A10 (24 GB PCIe)",
                    "price_cents_per_hour": 75,
                    "specs": {"vcpus": 30, "memory_gib": 200, "storage_gib": 1400, "gpus": 1}
                },
                "regions_with_capacity_available": [
                    {"name": "us-west-1", "description": "California, USA"}
                ]
            },
            "gpu_8x_h100_sxm5": {
                "instance_type": {
                    "name": "gpu_8x_h100_sxm5",
                    "description": "8x H100 (80 GB SXM5)",
                    "gpu_description": "H100 (80 GB SXM5)",
                    "price_cents_per_hour": 2392,
                    "specs": {"vcpus": 208, "memory_gib": 1800, "storage_gib": 24780, "gpus": 8}
                },
                "regions_with_capacity_available": []
            }
        }))
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.with_capacity().count(), 1);
        assert_eq!(
            catalog.regions_with_capacity().into_iter().collect::<Vec<_>>(),
            vec!["us-west-1".to_string()]
        );
    }
}
