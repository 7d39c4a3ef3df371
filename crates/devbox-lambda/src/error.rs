//! Lambda Cloud error types
//!
//! Provider errors are modelled as one closed union per endpoint category.
//! Every union is deserialized from the `error` object of a failed response
//! and keyed by its wire `code`. A code that is not part of the union fails
//! to parse, which the pipeline reports as [`ApiError::Status`].

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Message and optional remediation hint attached to every provider error
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suggestion {
            Some(suggestion) => write!(f, "{} ({})", self.message, suggestion),
            None => f.write_str(&self.message),
        }
    }
}

/// A closed set of structured errors an endpoint category may return
pub trait ErrorUnion:
    for<'de> Deserialize<'de> + std::error::Error + Send + Sync + 'static
{
    /// Stable taxonomy code, e.g. `instance-not-found`
    fn code(&self) -> &'static str;

    /// Provider message and suggestion
    fn detail(&self) -> &ErrorDetail;
}

/// Errors any endpoint may return
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "code")]
pub enum CommonError {
    #[serde(rename = "global/invalid-api-key")]
    #[error("unauthorized: {0}")]
    Unauthorized(ErrorDetail),

    #[serde(rename = "global/account-inactive")]
    #[error("account inactive: {0}")]
    AccountInactive(ErrorDetail),

    #[serde(rename = "global/unknown")]
    #[error("internal provider error: {0}")]
    Internal(ErrorDetail),
}

impl ErrorUnion for CommonError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::AccountInactive(_) => "account-inactive",
            Self::Internal(_) => "internal",
        }
    }

    fn detail(&self) -> &ErrorDetail {
        match self {
            Self::Unauthorized(d) | Self::AccountInactive(d) | Self::Internal(d) => d,
        }
    }
}

/// Errors returned by `POST /instance-operations/launch`
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "code")]
pub enum LaunchError {
    #[serde(rename = "global/invalid-api-key")]
    #[error("unauthorized: {0}")]
    Unauthorized(ErrorDetail),

    #[serde(rename = "global/account-inactive")]
    #[error("account inactive: {0}")]
    AccountInactive(ErrorDetail),

    #[serde(rename = "global/unknown")]
    #[error("internal provider error: {0}")]
    Internal(ErrorDetail),

    #[serde(rename = "global/object-does-not-exist")]
    #[error("resource not found: {0}")]
    ResourceNotFound(ErrorDetail),

    #[serde(rename = "global/invalid-parameters")]
    #[error("invalid parameters: {0}")]
    InvalidParameters(ErrorDetail),

    #[serde(rename = "global/invalid-address")]
    #[error("invalid billing address: {0}")]
    InvalidBillingAddress(ErrorDetail),

    #[serde(rename = "instance-operations/launch/file-system-in-wrong-region")]
    #[error("filesystem is in a different region: {0}")]
    FilesystemInWrongRegion(ErrorDetail),

    #[serde(rename = "instance-operations/launch/insufficient-capacity")]
    #[error("insufficient capacity: {0}")]
    InsufficientCapacity(ErrorDetail),

    #[serde(rename = "global/quota-exceeded")]
    #[error("quota exceeded: {0}")]
    QuotaExceeded(ErrorDetail),
}

impl ErrorUnion for LaunchError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::AccountInactive(_) => "account-inactive",
            Self::Internal(_) => "internal",
            Self::ResourceNotFound(_) => "resource-not-found",
            Self::InvalidParameters(_) => "invalid-parameters",
            Self::InvalidBillingAddress(_) => "invalid-billing-address",
            Self::FilesystemInWrongRegion(_) => "filesystem-in-wrong-region",
            Self::InsufficientCapacity(_) => "insufficient-capacity",
            Self::QuotaExceeded(_) => "quota-exceeded",
        }
    }

    fn detail(&self) -> &ErrorDetail {
        match self {
            Self::Unauthorized(d)
            | Self::AccountInactive(d)
            | Self::Internal(d)
            | Self::ResourceNotFound(d)
            | Self::InvalidParameters(d)
            | Self::InvalidBillingAddress(d)
            | Self::FilesystemInWrongRegion(d)
            | Self::InsufficientCapacity(d)
            | Self::QuotaExceeded(d) => d,
        }
    }
}

/// Errors returned by get/terminate/restart/modify instance endpoints
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "code")]
pub enum InstanceError {
    #[serde(rename = "global/invalid-api-key")]
    #[error("unauthorized: {0}")]
    Unauthorized(ErrorDetail),

    #[serde(rename = "global/account-inactive")]
    #[error("account inactive: {0}")]
    AccountInactive(ErrorDetail),

    #[serde(rename = "global/unknown")]
    #[error("internal provider error: {0}")]
    Internal(ErrorDetail),

    #[serde(rename = "global/object-does-not-exist")]
    #[error("instance not found: {0}")]
    InstanceNotFound(ErrorDetail),

    #[serde(rename = "global/invalid-parameters")]
    #[error("invalid parameters: {0}")]
    InvalidParameters(ErrorDetail),
}

impl ErrorUnion for InstanceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::AccountInactive(_) => "account-inactive",
            Self::Internal(_) => "internal",
            Self::InstanceNotFound(_) => "instance-not-found",
            Self::InvalidParameters(_) => "invalid-parameters",
        }
    }

    fn detail(&self) -> &ErrorDetail {
        match self {
            Self::Unauthorized(d)
            | Self::AccountInactive(d)
            | Self::Internal(d)
            | Self::InstanceNotFound(d)
            | Self::InvalidParameters(d) => d,
        }
    }
}

/// Errors returned by filesystem endpoints
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "code")]
pub enum FilesystemError {
    #[serde(rename = "global/invalid-api-key")]
    #[error("unauthorized: {0}")]
    Unauthorized(ErrorDetail),

    #[serde(rename = "global/account-inactive")]
    #[error("account inactive: {0}")]
    AccountInactive(ErrorDetail),

    #[serde(rename = "global/unknown")]
    #[error("internal provider error: {0}")]
    Internal(ErrorDetail),

    #[serde(rename = "global/object-does-not-exist")]
    #[error("filesystem not found: {0}")]
    FilesystemNotFound(ErrorDetail),

    #[serde(rename = "global/object-in-use")]
    #[error("filesystem in use: {0}")]
    FilesystemInUse(ErrorDetail),

    #[serde(rename = "global/duplicate")]
    #[error("duplicate filesystem: {0}")]
    Duplicate(ErrorDetail),
}

impl ErrorUnion for FilesystemError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::AccountInactive(_) => "account-inactive",
            Self::Internal(_) => "internal",
            Self::FilesystemNotFound(_) => "filesystem-not-found",
            Self::FilesystemInUse(_) => "filesystem-in-use",
            Self::Duplicate(_) => "duplicate",
        }
    }

    fn detail(&self) -> &ErrorDetail {
        match self {
            Self::Unauthorized(d)
            | Self::AccountInactive(d)
            | Self::Internal(d)
            | Self::FilesystemNotFound(d)
            | Self::FilesystemInUse(d)
            | Self::Duplicate(d) => d,
        }
    }
}

/// Errors returned by firewall ruleset endpoints
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "code")]
pub enum FirewallError {
    #[serde(rename = "global/invalid-api-key")]
    #[error("unauthorized: {0}")]
    Unauthorized(ErrorDetail),

    #[serde(rename = "global/account-inactive")]
    #[error("account inactive: {0}")]
    AccountInactive(ErrorDetail),

    #[serde(rename = "global/unknown")]
    #[error("internal provider error: {0}")]
    Internal(ErrorDetail),

    #[serde(rename = "global/object-does-not-exist")]
    #[error("firewall ruleset not found: {0}")]
    RulesetNotFound(ErrorDetail),

    #[serde(rename = "global/object-in-use")]
    #[error("firewall ruleset in use: {0}")]
    RulesetInUse(ErrorDetail),

    #[serde(rename = "global/duplicate")]
    #[error("duplicate firewall ruleset: {0}")]
    Duplicate(ErrorDetail),
}

impl ErrorUnion for FirewallError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::AccountInactive(_) => "account-inactive",
            Self::Internal(_) => "internal",
            Self::RulesetNotFound(_) => "ruleset-not-found",
            Self::RulesetInUse(_) => "ruleset-in-use",
            Self::Duplicate(_) => "duplicate",
        }
    }

    fn detail(&self) -> &ErrorDetail {
        match self {
            Self::Unauthorized(d)
            | Self::AccountInactive(d)
            | Self::Internal(d)
            | Self::RulesetNotFound(d)
            | Self::RulesetInUse(d)
            | Self::Duplicate(d) => d,
        }
    }
}

/// Failure of a single API call, generic over the endpoint's error union
#[derive(Error, Debug)]
pub enum ApiError<E: ErrorUnion> {
    /// The provider answered with a recognized structured error
    #[error(transparent)]
    Api(E),

    /// Non-success status whose body is not a recognized structured error
    #[error("{method} {path} failed with {status}: {body}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        /// At most 200 characters of the raw response body
        body: String,
    },

    /// Success status, but the payload does not match the expected shape
    #[error("{method} {path} returned an unexpected payload: {source}")]
    ResponseShape {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// No HTTP response was received (connection, TLS, timeout)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl<E: ErrorUnion> ApiError<E> {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Api(_) => FailureKind::Structured,
            Self::Status { .. } | Self::Transport(_) => FailureKind::Transport,
            Self::ResponseShape { .. } => FailureKind::ResponseShape,
        }
    }

    /// The structured provider error, if that is what this is
    pub fn structured(&self) -> Option<&E> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure of a readiness wait
#[derive(Error, Debug)]
pub enum WaitError {
    #[error("instances not ready before the deadline: {}", .pending.join(", "))]
    Timeout { pending: Vec<String> },

    #[error(transparent)]
    Api(#[from] ApiError<CommonError>),
}

impl WaitError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::WaitTimeout,
            Self::Api(e) => e.kind(),
        }
    }
}

/// Coarse failure category, distinguishable at the process boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Structured,
    Transport,
    ResponseShape,
    WaitTimeout,
}
