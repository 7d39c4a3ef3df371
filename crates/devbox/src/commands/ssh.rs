use crate::output::{self, with_spinner};
use colored::Colorize;
use devbox_config::Settings;
use devbox_lambda::{Instance, LambdaClient};

pub async fn handle(
    client: &LambdaClient,
    settings: &Settings,
    instance_id: &str,
) -> anyhow::Result<()> {
    let instances = with_spinner(
        format!("Fetching instance {}...", instance_id),
        client.list_instances(),
    )
    .await?;

    let command = ssh_target(&instances, instance_id, &settings.ssh.username)?;
    println!("{}", command.bold());
    Ok(())
}

/// The SSH command for `instance_id`, if it exists and has an address
pub fn ssh_target(
    instances: &[Instance],
    instance_id: &str,
    username: &str,
) -> anyhow::Result<String> {
    let instance = instances
        .iter()
        .find(|i| i.id == instance_id)
        .ok_or_else(|| anyhow::anyhow!("Instance not found: {}", instance_id))?;

    let ip = instance
        .public_ip()
        .ok_or_else(|| anyhow::anyhow!("Instance {} has no IP address yet", instance_id))?;

    Ok(output::ssh_command(username, ip))
}
