//! Lambda Cloud API client
//!
//! One thin method per endpoint. Each binds a success shape and an error
//! union to the pipeline; none of them loop, retry or combine calls.

use crate::api::Session;
use crate::error::{
    ApiError, CommonError, FilesystemError, FirewallError, InstanceError, LaunchError,
};
use crate::model::{
    Filesystem, FirewallRuleset, Image, Instance, InstanceTypes, LaunchRequest, LaunchResponse,
    ModifyRequest, RestartRequest, RestartResponse, SshKey, TerminateRequest, TerminateResponse,
};
use crate::waiter::InstanceSource;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://cloud.lambda.ai/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`LambdaClient`]
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Lambda Cloud API client
///
/// Owns the connection pool for its whole lifetime; dropping the client
/// releases it, on every exit path.
pub struct LambdaClient {
    session: Session,
}

impl LambdaClient {
    pub fn new(config: ClientConfig) -> reqwest::Result<Self> {
        let session = Session::new(&config.base_url, config.api_key, config.timeout)?;
        tracing::debug!(base_url = session.base_url(), "Opened Lambda Cloud session");
        Ok(Self { session })
    }

    // Instance operations

    pub async fn list_instances(&self) -> Result<Vec<Instance>, ApiError<CommonError>> {
        self.session.get("/instances").await
    }

    pub async fn get_instance(&self, id: &str) -> Result<Instance, ApiError<InstanceError>> {
        self.session.get(&format!("/instances/{}", id)).await
    }

    /// Launch instances; the provider either creates all of them or none
    pub async fn launch_instances(
        &self,
        request: &LaunchRequest,
    ) -> Result<LaunchResponse, ApiError<LaunchError>> {
        self.session
            .post("/instance-operations/launch", request)
            .await
    }

    pub async fn terminate_instances(
        &self,
        request: &TerminateRequest,
    ) -> Result<TerminateResponse, ApiError<InstanceError>> {
        self.session
            .post("/instance-operations/terminate", request)
            .await
    }

    pub async fn restart_instances(
        &self,
        request: &RestartRequest,
    ) -> Result<RestartResponse, ApiError<InstanceError>> {
        self.session
            .post("/instance-operations/restart", request)
            .await
    }

    pub async fn modify_instance(
        &self,
        id: &str,
        request: &ModifyRequest,
    ) -> Result<Instance, ApiError<InstanceError>> {
        self.session
            .patch(&format!("/instances/{}", id), request)
            .await
    }

    // Catalog

    pub async fn list_instance_types(&self) -> Result<InstanceTypes, ApiError<CommonError>> {
        self.session.get("/instance-types").await
    }

    pub async fn list_images(&self) -> Result<Vec<Image>, ApiError<CommonError>> {
        self.session.get("/images").await
    }

    // Account resources

    pub async fn list_filesystems(&self) -> Result<Vec<Filesystem>, ApiError<FilesystemError>> {
        self.session.get("/file-systems").await
    }

    pub async fn list_ssh_keys(&self) -> Result<Vec<SshKey>, ApiError<CommonError>> {
        self.session.get("/ssh-keys").await
    }

    pub async fn list_firewall_rulesets(
        &self,
    ) -> Result<Vec<FirewallRuleset>, ApiError<FirewallError>> {
        self.session.get("/firewall-rulesets").await
    }
}

impl Drop for LambdaClient {
    fn drop(&mut self) {
        tracing::debug!(base_url = self.session.base_url(), "Closed Lambda Cloud session");
    }
}

#[async_trait]
impl InstanceSource for LambdaClient {
    async fn list_instances(&self) -> Result<Vec<Instance>, ApiError<CommonError>> {
        LambdaClient::list_instances(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("secret_abc");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_config_debug_hides_key() {
        let config = ClientConfig::new("secret_abc").with_base_url("http://localhost:1");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret_abc"));
        assert!(debug.contains("localhost"));
    }
}
