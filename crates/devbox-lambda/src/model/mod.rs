//! Lambda Cloud domain model
//!
//! Plain values decoded from the provider. Nothing here is cached: every
//! client call returns a fresh snapshot. Units are kept as the provider
//! reports them (cents per hour, raw bytes, GiB); scaling for display is the
//! caller's business.

mod firewall;
mod image;
mod instance;
mod request;
mod storage;

pub use firewall::{FirewallRule, FirewallRuleset, Protocol};
pub use image::{Architecture, Image};
pub use instance::{
    Instance, InstanceSpecs, InstanceStatus, InstanceType, InstanceTypeAvailability, InstanceTypes,
};
pub use request::{
    ImageSpec, LaunchRequest, LaunchResponse, ModifyRequest, RequestError, RestartRequest,
    RestartResponse, TerminateRequest, TerminateResponse, UserData,
};
pub use storage::{Filesystem, FilesystemCreator, SshKey};

use serde::{Deserialize, Serialize};

/// A provider region, e.g. `us-east-1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub description: String,
}
