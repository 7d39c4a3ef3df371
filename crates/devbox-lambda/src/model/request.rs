use super::Instance;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Invalid request built on the client side
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("at least one SSH key name is required")]
    NoSshKeys,

    #[error("user_data is not valid base64: {0}")]
    InvalidUserData(String),
}

/// Boot-time payload, base64-encoded for transport
///
/// `Debug` never prints the payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserData(String);

impl UserData {
    pub fn encode(bytes: impl AsRef<[u8]>) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Wrap an already-encoded payload, checking that it decodes
    pub fn from_encoded(encoded: impl Into<String>) -> Result<Self, RequestError> {
        let encoded = encoded.into();
        STANDARD
            .decode(&encoded)
            .map_err(|e| RequestError::InvalidUserData(e.to_string()))?;
        Ok(Self(encoded))
    }

    pub fn decode(&self) -> Result<Vec<u8>, RequestError> {
        STANDARD
            .decode(&self.0)
            .map_err(|e| RequestError::InvalidUserData(e.to_string()))
    }

    pub fn as_encoded(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserData(<{} bytes redacted>)", self.0.len())
    }
}

/// Image selection for a launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImageSpec {
    Id { id: String },
    Family { family: String },
}

/// Body of `POST /instance-operations/launch`
///
/// Optional fields are left out of the JSON entirely when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchRequest {
    region_name: String,
    instance_type_name: String,
    ssh_key_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_system_names: Option<Vec<String>>,
    quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImageSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<UserData>,
}

impl LaunchRequest {
    pub fn new(
        region_name: impl Into<String>,
        instance_type_name: impl Into<String>,
        ssh_key_names: Vec<String>,
    ) -> Result<Self, RequestError> {
        if ssh_key_names.is_empty() {
            return Err(RequestError::NoSshKeys);
        }

        Ok(Self {
            region_name: region_name.into(),
            instance_type_name: instance_type_name.into(),
            ssh_key_names,
            file_system_names: None,
            quantity: 1,
            name: None,
            image: None,
            user_data: None,
        })
    }

    pub fn with_quantity(mut self, quantity: u32) -> Result<Self, RequestError> {
        if quantity == 0 {
            return Err(RequestError::ZeroQuantity);
        }
        self.quantity = quantity;
        Ok(self)
    }

    pub fn with_file_systems(mut self, names: Vec<String>) -> Self {
        self.file_system_names = Some(names);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: ImageSpec) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn region_name(&self) -> &str {
        &self.region_name
    }

    pub fn instance_type_name(&self) -> &str {
        &self.instance_type_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchResponse {
    pub instance_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminateRequest {
    pub instance_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TerminateResponse {
    pub terminated_instances: Vec<Instance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartRequest {
    pub instance_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestartResponse {
    pub restarted_instances: Vec<Instance>,
}

/// Body of `POST /instances/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModifyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
