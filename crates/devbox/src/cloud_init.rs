//! cloud-init rendering
//!
//! The template is compiled into the binary and rendered with Tera. When a
//! persistent filesystem is attached, `/nix` and `/home` are bind-mounted
//! onto it so the toolchain and dotfiles survive instance termination.

use devbox_lambda::UserData;
use serde::Serialize;
use tera::{Context, Tera};

const TEMPLATE: &str = include_str!("../templates/cloud-init.yaml.tera");

/// Where Lambda Cloud mounts attached filesystems
pub const NFS_ROOT: &str = "/lambda/nfs";

/// Template variables
#[derive(Debug, Clone, Serialize)]
pub struct CloudInitContext {
    pub filesystem_name: Option<String>,
    pub filesystem_mount: Option<String>,
    pub ssh_username: String,
}

impl CloudInitContext {
    pub fn new(ssh_username: impl Into<String>, filesystem_name: Option<String>) -> Self {
        let filesystem_mount = filesystem_name.as_deref().map(filesystem_mount);
        Self {
            filesystem_name,
            filesystem_mount,
            ssh_username: ssh_username.into(),
        }
    }
}

pub fn filesystem_mount(name: &str) -> String {
    format!("{}/{}", NFS_ROOT, name)
}

pub fn render(context: &CloudInitContext) -> anyhow::Result<String> {
    let context = Context::from_serialize(context)?;
    let rendered = Tera::one_off(TEMPLATE, &context, false)?;
    tracing::debug!(bytes = rendered.len(), "Rendered cloud-init");
    Ok(rendered)
}

/// Render and encode for the launch request
pub fn user_data(context: &CloudInitContext) -> anyhow::Result<UserData> {
    Ok(UserData::encode(render(context)?))
}
