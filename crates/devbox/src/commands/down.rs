use crate::output::{self, with_spinner};
use colored::Colorize;
use devbox_lambda::{LambdaClient, TerminateRequest};

pub async fn handle(client: &LambdaClient, instance_ids: Vec<String>) -> anyhow::Result<()> {
    let request = TerminateRequest { instance_ids };

    let response = with_spinner(
        format!("Terminating {}...", request.instance_ids.join(", ")),
        client.terminate_instances(&request),
    )
    .await?;

    for instance in &response.terminated_instances {
        println!(
            "{} Terminated: {} ({})",
            "✓".green(),
            instance.id.cyan(),
            output::status_colored(instance.status)
        );
    }

    if response.terminated_instances.is_empty() {
        println!("{}", "No instances were terminated".dimmed());
    }

    Ok(())
}
