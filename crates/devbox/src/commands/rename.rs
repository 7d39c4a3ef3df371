use crate::output::with_spinner;
use colored::Colorize;
use devbox_lambda::{LambdaClient, ModifyRequest};

pub async fn handle(client: &LambdaClient, instance_id: &str, name: String) -> anyhow::Result<()> {
    let request = ModifyRequest { name: Some(name) };

    let instance = with_spinner(
        format!("Renaming {}...", instance_id),
        client.modify_instance(instance_id, &request),
    )
    .await?;

    println!(
        "{} Renamed: {} → {}",
        "✓".green(),
        instance.id.cyan(),
        instance.name.as_deref().unwrap_or("").bold()
    );

    Ok(())
}
