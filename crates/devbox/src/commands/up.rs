use crate::cloud_init::{self, CloudInitContext};
use crate::output::{self, ConsoleObserver, with_spinner};
use anyhow::Context;
use clap::Args;
use colored::Colorize;
use devbox_config::Settings;
use devbox_lambda::{
    ImageSpec, Instance, LambdaClient, LaunchRequest, RequestError, UserData, WaitPolicy,
    wait_for_instances,
};

#[derive(Args, Debug, Clone, Default)]
pub struct UpArgs {
    /// Region to launch in, e.g. us-east-1 (default: launch.region)
    #[arg(long)]
    pub region: Option<String>,

    /// Instance type, e.g. gpu_1x_a10 (default: launch.instance_type)
    #[arg(long)]
    pub instance_type: Option<String>,

    /// SSH key name registered with Lambda Cloud (default: ssh.key_name)
    #[arg(long)]
    pub ssh_key: Option<String>,

    /// Persistent filesystem to attach; /nix and /home live on it
    #[arg(long)]
    pub filesystem: Option<String>,

    /// Instance name
    #[arg(long)]
    pub name: Option<String>,

    /// Image ID (default: provider default image)
    #[arg(long)]
    pub image_id: Option<String>,

    /// Number of instances
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub quantity: u32,

    /// Return after launch without waiting for readiness
    #[arg(long)]
    pub no_wait: bool,
}

/// Launch parameters after applying settings defaults
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchPlan {
    pub region: String,
    pub instance_type: String,
    pub ssh_key: String,
    pub filesystem: Option<String>,
    pub name: Option<String>,
    pub image_id: Option<String>,
    pub quantity: u32,
}

impl LaunchPlan {
    pub fn resolve(args: &UpArgs, settings: &Settings) -> anyhow::Result<Self> {
        let defaults = &settings.launch;

        Ok(Self {
            region: args
                .region
                .clone()
                .or_else(|| defaults.region.clone())
                .context("--region is required (or set launch.region)")?,
            instance_type: args
                .instance_type
                .clone()
                .or_else(|| defaults.instance_type.clone())
                .context("--instance-type is required (or set launch.instance_type)")?,
            ssh_key: args
                .ssh_key
                .clone()
                .or_else(|| settings.ssh.key_name.clone())
                .context("--ssh-key is required (or set ssh.key_name)")?,
            filesystem: args
                .filesystem
                .clone()
                .or_else(|| defaults.filesystem_name.clone()),
            name: args.name.clone(),
            image_id: args.image_id.clone().or_else(|| defaults.image_id.clone()),
            quantity: args.quantity,
        })
    }

    pub fn to_request(&self, user_data: UserData) -> Result<LaunchRequest, RequestError> {
        let mut request = LaunchRequest::new(
            &self.region,
            &self.instance_type,
            vec![self.ssh_key.clone()],
        )?
        .with_quantity(self.quantity)?
        .with_user_data(user_data);

        if let Some(filesystem) = &self.filesystem {
            request = request.with_file_systems(vec![filesystem.clone()]);
        }
        if let Some(name) = &self.name {
            request = request.with_name(name);
        }
        if let Some(id) = &self.image_id {
            request = request.with_image(ImageSpec::Id { id: id.clone() });
        }
        Ok(request)
    }
}

pub async fn handle(
    client: &LambdaClient,
    settings: &Settings,
    args: UpArgs,
) -> anyhow::Result<()> {
    let plan = LaunchPlan::resolve(&args, settings)?;

    let context = CloudInitContext::new(&settings.ssh.username, plan.filesystem.clone());
    let user_data = cloud_init::user_data(&context)?;
    let request = plan.to_request(user_data)?;

    let response = with_spinner(
        format!(
            "Launching {} × {} in {}...",
            plan.quantity, plan.instance_type, plan.region
        ),
        client.launch_instances(&request),
    )
    .await?;

    if response.instance_ids.is_empty() {
        tracing::warn!("Launch returned no instance IDs");
        println!("{}", "⚠ Launch returned no instance IDs".yellow());
        return Ok(());
    }

    for id in &response.instance_ids {
        println!("{} Launched: {}", "✓".green(), id.cyan());
    }

    if args.no_wait {
        println!();
        println!(
            "{}",
            format!("Run `devbox wait {}` to wait for readiness", response.instance_ids.join(" "))
                .dimmed()
        );
        return Ok(());
    }

    println!();
    println!(
        "{}",
        format!(
            "Waiting for {} instance(s) to be ready...",
            response.instance_ids.len()
        )
        .cyan()
        .bold()
    );

    let policy = WaitPolicy {
        timeout: settings.wait_timeout(),
        poll_interval: settings.poll_interval()?,
    };
    let ready = {
        let mut observer = ConsoleObserver::new(response.instance_ids.len());
        wait_for_instances(client, &response.instance_ids, &policy, &mut observer).await?
    };

    print_summary(&ready, &settings.ssh.username, plan.filesystem.as_deref());
    Ok(())
}

fn print_summary(instances: &[Instance], username: &str, filesystem: Option<&str>) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{}", "Launch Complete!".green().bold());
    println!();

    output::print_header(&format!(
        "{:<34} {:<16} {:<10} {}",
        "INSTANCE ID", "IP ADDRESS", "STATUS", "SSH COMMAND"
    ));
    for instance in instances {
        let ip = instance.public_ip().unwrap_or("-");
        println!(
            "{:<34} {:<16} {:<10} {}",
            instance.id.cyan(),
            ip.green(),
            instance.status.as_str().magenta(),
            output::ssh_command(username, ip)
        );
    }

    if let Some(name) = filesystem {
        println!();
        println!(
            "{} {}",
            "Persistent Storage:".bold(),
            cloud_init::filesystem_mount(name)
        );
        println!("  • {} → Nix store", "/nix".cyan());
        println!("  • {} → User home directories", "/home".cyan());
    }

    println!();
    println!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> UpArgs {
        UpArgs {
            region: Some("us-east-1".to_string()),
            instance_type: Some("gpu_1x_a10".to_string()),
            ssh_key: Some("laptop".to_string()),
            quantity: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_from_flags() {
        let plan = LaunchPlan::resolve(&args(), &Settings::default()).unwrap();
        assert_eq!(plan.region, "us-east-1");
        assert_eq!(plan.ssh_key, "laptop");
        assert!(plan.filesystem.is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_settings() {
        let mut settings = Settings::default();
        settings.launch.region = Some("us-west-1".to_string());
        settings.launch.filesystem_name = Some("devbox-home".to_string());
        settings.ssh.key_name = Some("workstation".to_string());

        let plan = LaunchPlan::resolve(
            &UpArgs {
                region: None,
                ssh_key: None,
                ..args()
            },
            &settings,
        )
        .unwrap();

        assert_eq!(plan.region, "us-west-1");
        assert_eq!(plan.ssh_key, "workstation");
        assert_eq!(plan.filesystem.as_deref(), Some("devbox-home"));
    }

    #[test]
    fn test_resolve_requires_region() {
        let err = LaunchPlan::resolve(
            &UpArgs {
                region: None,
                ..args()
            },
            &Settings::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("--region"));
    }

    #[test]
    fn test_request_carries_filesystem_and_image() {
        let plan = LaunchPlan::resolve(
            &UpArgs {
                filesystem: Some("devbox-home".to_string()),
                image_id: Some("img-1".to_string()),
                name: Some("trainer".to_string()),
                quantity: 2,
                ..args()
            },
            &Settings::default(),
        )
        .unwrap();

        let request = plan.to_request(UserData::encode("#cloud-config\n")).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["file_system_names"], json!(["devbox-home"]));
        assert_eq!(body["image"], json!({"id": "img-1"}));
        assert_eq!(body["name"], json!("trainer"));
        assert_eq!(body["quantity"], json!(2));
        assert_eq!(body["user_data"], json!("I2Nsb3VkLWNvbmZpZwo="));
    }

    #[test]
    fn test_request_omits_unset_optionals() {
        let plan = LaunchPlan::resolve(&args(), &Settings::default()).unwrap();
        let request = plan.to_request(UserData::encode("x")).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert!(body.get("file_system_names").is_none());
        assert!(body.get("image").is_none());
        assert!(body.get("name").is_none());
    }
}
