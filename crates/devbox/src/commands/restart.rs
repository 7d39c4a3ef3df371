use crate::output::{self, with_spinner};
use colored::Colorize;
use devbox_lambda::{LambdaClient, RestartRequest};

pub async fn handle(client: &LambdaClient, instance_ids: Vec<String>) -> anyhow::Result<()> {
    let request = RestartRequest { instance_ids };

    let response = with_spinner(
        format!("Restarting {}...", request.instance_ids.join(", ")),
        client.restart_instances(&request),
    )
    .await?;

    for instance in &response.restarted_instances {
        println!(
            "{} Restarted: {} ({})",
            "✓".green(),
            instance.id.cyan(),
            output::status_colored(instance.status)
        );
    }

    Ok(())
}
