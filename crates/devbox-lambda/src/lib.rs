//! Lambda Cloud API client for devbox
//!
//! This crate talks to the Lambda Cloud REST API and turns every response
//! into either a strongly-typed domain value or a typed error.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 devbox CLI                    │
//! │        (list / up / wait / down / ssh)        │
//! └───────────────┬──────────────────────────────┘
//!                 │
//! ┌───────────────▼──────────────────────────────┐
//! │               devbox-lambda                   │
//! │  ┌────────────────┐   ┌───────────────────┐  │
//! │  │  LambdaClient  │◄──│  ReadinessWaiter  │  │
//! │  └───────┬────────┘   └───────────────────┘  │
//! │  ┌───────▼────────┐   ┌───────────────────┐  │
//! │  │    Session     │──►│   error unions    │  │
//! │  │ (typed execute)│   │  (per endpoint)   │  │
//! │  └────────────────┘   └───────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Each client method declares the success shape it expects and the closed
//! set of provider errors its endpoint can return, so callers can `match`
//! exhaustively on exactly the failures a call can produce.
//!
//! # Example
//!
//! ```ignore
//! use devbox_lambda::{ClientConfig, LambdaClient, WaitPolicy};
//!
//! let client = LambdaClient::new(ClientConfig::new("secret_xxx"))?;
//!
//! for instance in client.list_instances().await? {
//!     println!("{} {}", instance.id, instance.status);
//! }
//!
//! let ready = devbox_lambda::wait_for_instance(
//!     &client,
//!     "0920582c7ff041399e34823a0be62549",
//!     &WaitPolicy::default(),
//!     &mut (),
//! )
//! .await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod model;
pub mod waiter;

// Re-exports
pub use reqwest::{Method, StatusCode};

pub use api::{ENVELOPE_FIELD, MAX_ERROR_BODY_CHARS};
pub use client::{ClientConfig, DEFAULT_BASE_URL, LambdaClient};
pub use error::{
    ApiError, CommonError, ErrorDetail, ErrorUnion, FailureKind, FilesystemError, FirewallError,
    InstanceError, LaunchError, WaitError,
};
pub use model::{
    Architecture, Filesystem, FilesystemCreator, FirewallRule, FirewallRuleset, Image, ImageSpec,
    Instance, InstanceSpecs, InstanceStatus, InstanceType, InstanceTypeAvailability,
    InstanceTypes, LaunchRequest, LaunchResponse, ModifyRequest, Protocol, Region, RequestError,
    RestartRequest, RestartResponse, SshKey, TerminateRequest, TerminateResponse, UserData,
};
pub use waiter::{
    BACKOFF_FACTOR, Backoff, InstanceSource, MAX_BACKOFF, ReadinessWaiter, WaitObserver,
    WaitPolicy, wait_for_instance, wait_for_instances,
};
