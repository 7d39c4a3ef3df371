use crate::output::{self, ConsoleObserver};
use colored::Colorize;
use devbox_config::{Settings, validate_poll_interval};
use devbox_lambda::{LambdaClient, WaitPolicy, wait_for_instances};
use std::time::Duration;

pub async fn handle(
    client: &LambdaClient,
    settings: &Settings,
    instance_ids: Vec<String>,
    timeout_secs: Option<u64>,
    poll_interval_secs: Option<f64>,
) -> anyhow::Result<()> {
    let policy = policy(settings, timeout_secs, poll_interval_secs)?;

    let ready = {
        let mut observer = ConsoleObserver::new(instance_ids.len());
        wait_for_instances(client, &instance_ids, &policy, &mut observer).await?
    };

    for instance in &ready {
        let ip = instance.public_ip().unwrap_or("-");
        println!(
            "{} Ready: {} {} ({})",
            "✓".green(),
            instance.id.cyan(),
            ip.green(),
            instance.status.as_str().magenta()
        );
        println!(
            "  {}",
            output::ssh_command(&settings.ssh.username, ip).bold()
        );
    }

    Ok(())
}

/// Flag values override the configured wait settings
fn policy(
    settings: &Settings,
    timeout_secs: Option<u64>,
    poll_interval_secs: Option<f64>,
) -> anyhow::Result<WaitPolicy> {
    let poll_interval = match poll_interval_secs {
        Some(secs) => validate_poll_interval(secs)?,
        None => settings.poll_interval()?,
    };

    Ok(WaitPolicy {
        timeout: timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| settings.wait_timeout()),
        poll_interval,
    })
}
