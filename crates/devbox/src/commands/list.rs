use crate::output::{
    self, format_bytes, format_ports, format_price, print_field, print_header, with_spinner,
};
use clap::ValueEnum;
use colored::Colorize;
use devbox_lambda::{
    Architecture, Filesystem, FirewallRuleset, Image, Instance, InstanceTypeAvailability,
    InstanceTypes, LambdaClient, SshKey,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListResource {
    Instances,
    InstanceTypes,
    Images,
    Filesystems,
    SshKeys,
    FirewallRulesets,
}

pub async fn handle(
    client: &LambdaClient,
    resource: ListResource,
    available_only: bool,
) -> anyhow::Result<()> {
    match resource {
        ListResource::Instances => {
            let instances = with_spinner("Fetching instances...", client.list_instances()).await?;
            print_instances(&instances);
        }
        ListResource::InstanceTypes => {
            let types =
                with_spinner("Fetching instance types...", client.list_instance_types()).await?;
            print_instance_types(&types, available_only);
        }
        ListResource::Images => {
            let images = with_spinner("Fetching images...", client.list_images()).await?;
            let regions = capacity_filter(client, available_only).await?;
            print_images(&images, regions.as_ref());
        }
        ListResource::Filesystems => {
            let filesystems =
                with_spinner("Fetching filesystems...", client.list_filesystems()).await?;
            let regions = capacity_filter(client, available_only).await?;
            print_filesystems(&filesystems, regions.as_ref());
        }
        ListResource::SshKeys => {
            let keys = with_spinner("Fetching SSH keys...", client.list_ssh_keys()).await?;
            print_ssh_keys(&keys);
        }
        ListResource::FirewallRulesets => {
            let rulesets = with_spinner(
                "Fetching firewall rulesets...",
                client.list_firewall_rulesets(),
            )
            .await?;
            let regions = capacity_filter(client, available_only).await?;
            print_firewall_rulesets(&rulesets, regions.as_ref());
        }
    }

    Ok(())
}

/// Regions with capacity right now, when filtering was requested
async fn capacity_filter(
    client: &LambdaClient,
    available_only: bool,
) -> anyhow::Result<Option<BTreeSet<String>>> {
    if !available_only {
        return Ok(None);
    }

    let types = with_spinner("Checking capacity...", client.list_instance_types()).await?;
    Ok(Some(types.regions_with_capacity()))
}

fn in_regions(regions: Option<&BTreeSet<String>>, region: &str) -> bool {
    regions.is_none_or(|regions| regions.contains(region))
}

fn filter_note(regions: Option<&BTreeSet<String>>) -> String {
    match regions {
        Some(regions) => format!(
            " (filtered to {} regions with available instances)",
            regions.len()
        ),
        None => String::new(),
    }
}

fn print_instances(instances: &[Instance]) {
    if instances.is_empty() {
        println!("{}", "No instances found".dimmed());
        return;
    }

    print_header(&format!(
        "{:<34} {:<12} {:<16} {:<16} {:<22} {}",
        "ID", "STATUS", "IP", "REGION", "TYPE", "NAME"
    ));

    for instance in instances {
        println!(
            "{:<34} {:<12} {:<16} {:<16} {:<22} {}",
            instance.id.cyan(),
            output::status_colored(instance.status),
            instance.public_ip().unwrap_or("-").green(),
            instance.region.name.blue(),
            instance.instance_type.name.yellow(),
            instance.name.as_deref().unwrap_or("")
        );
    }
}

/// Available first, then most expensive, then by name
pub fn sorted_instance_types(
    types: &InstanceTypes,
    available_only: bool,
) -> Vec<(&str, &InstanceTypeAvailability)> {
    let mut items: Vec<(&str, &InstanceTypeAvailability)> = types
        .iter()
        .map(|(name, item)| (name.as_str(), item))
        .filter(|(_, item)| !available_only || item.has_capacity())
        .collect();

    items.sort_by(|(a_name, a), (b_name, b)| {
        b.has_capacity()
            .cmp(&a.has_capacity())
            .then(
                b.instance_type
                    .price_cents_per_hour
                    .cmp(&a.instance_type.price_cents_per_hour),
            )
            .then(a_name.cmp(b_name))
    });

    items
}

fn print_instance_types(types: &InstanceTypes, available_only: bool) {
    for (_, item) in sorted_instance_types(types, available_only) {
        let it = &item.instance_type;
        let specs = &it.specs;

        println!();
        println!("{} - {}", it.name.cyan().bold(), it.description);

        print_field("GPU Type:", &it.gpu_description);
        if specs.gpus > 0 {
            print_field("GPUs:", specs.gpus);
        } else {
            print_field("GPUs:", "0 (CPU only)");
        }
        print_field("vCPUs:", specs.vcpus);
        print_field("RAM:", format!("{} GiB", specs.memory_gib));
        print_field("Storage:", format!("{} GiB", specs.storage_gib));
        print_field("Price:", format_price(it.price_cents_per_hour));

        if item.has_capacity() {
            let regions: Vec<&str> = item
                .regions_with_capacity_available
                .iter()
                .map(|r| r.name.as_str())
                .collect();
            print_field("Available:", format!("{} {}", "✓".green(), regions.join(", ")));
        } else {
            print_field("Available:", "None".dimmed());
        }
    }

    println!();
    println!(
        "{} of {} instance types have capacity available",
        types.with_capacity().count().to_string().bold(),
        types.len()
    );
}

pub type ImageGroupKey<'a> = (&'a str, &'a str, &'a str, Architecture);

/// Regional variants grouped by `Image::group_key`, each sorted by region
pub fn group_images<'a>(
    images: &'a [Image],
    regions: Option<&BTreeSet<String>>,
) -> BTreeMap<ImageGroupKey<'a>, Vec<&'a Image>> {
    let mut groups: BTreeMap<ImageGroupKey<'a>, Vec<&'a Image>> = BTreeMap::new();
    for image in images {
        if in_regions(regions, &image.region.name) {
            groups.entry(image.group_key()).or_default().push(image);
        }
    }

    for variants in groups.values_mut() {
        variants.sort_by(|a, b| a.region.name.cmp(&b.region.name));
    }
    groups
}

fn print_images(images: &[Image], regions: Option<&BTreeSet<String>>) {
    let groups = group_images(images, regions);
    if groups.is_empty() {
        println!("{}", "No images found".dimmed());
        return;
    }

    for ((family, description, version, architecture), variants) in &groups {
        let Some(first) = variants.first() else {
            continue;
        };

        println!();
        println!("{}", first.name.cyan().bold());
        println!("{} {}", "Description:".dimmed(), description);
        println!("{} {}", "Family:".dimmed(), family);
        println!("{} {}", "Version:".dimmed(), version);
        println!("{} {}", "Architecture:".dimmed(), architecture);

        println!(
            "  {}",
            format!("{:<38} {:<16} {:<12} {}", "ID", "REGION", "CREATED", "UPDATED").bold()
        );
        for image in variants {
            println!(
                "  {:<38} {:<16} {:<12} {}",
                image.id.yellow(),
                image.region.name.cyan(),
                image.created_time.format("%Y-%m-%d").to_string().dimmed(),
                image.updated_time.format("%Y-%m-%d").to_string().dimmed()
            );
        }
    }

    let variants: usize = groups.values().map(Vec::len).sum();
    println!();
    println!(
        "{} unique images with {} regional variants{}",
        groups.len().to_string().bold(),
        variants,
        filter_note(regions)
    );
}

fn print_filesystems(filesystems: &[Filesystem], regions: Option<&BTreeSet<String>>) {
    let filesystems: Vec<&Filesystem> = filesystems
        .iter()
        .filter(|fs| in_regions(regions, &fs.region.name))
        .collect();

    if filesystems.is_empty() {
        println!("{}", "No filesystems found".dimmed());
        return;
    }

    for fs in &filesystems {
        println!();
        println!("{}", fs.name.cyan().bold());
        print_field("ID:", &fs.id);
        print_field("Region:", &fs.region.name);
        print_field("Mount Point:", &fs.mount_point);
        if fs.is_in_use {
            print_field("Status:", "In use".green());
        } else {
            print_field("Status:", "Not in use".dimmed());
        }
        print_field("Size:", format_bytes(fs.bytes_used));
        print_field("Created:", fs.created.format("%Y-%m-%d %H:%M:%S"));
        print_field("Created By:", &fs.created_by.email);
    }

    println!();
    println!(
        "{} filesystems{}",
        filesystems.len().to_string().bold(),
        filter_note(regions)
    );
}

fn print_ssh_keys(keys: &[SshKey]) {
    if keys.is_empty() {
        println!("{}", "No SSH keys found".dimmed());
        return;
    }

    for key in keys {
        println!();
        println!("{}", key.name.cyan().bold());
        print_field("ID:", &key.id);
        print_field("Public Key:", &key.public_key);
    }

    println!();
    println!("{} SSH keys", keys.len().to_string().bold());
}

fn print_firewall_rulesets(rulesets: &[FirewallRuleset], regions: Option<&BTreeSet<String>>) {
    let rulesets: Vec<&FirewallRuleset> = rulesets
        .iter()
        .filter(|rs| in_regions(regions, &rs.region.name))
        .collect();

    if rulesets.is_empty() {
        println!("{}", "No firewall rulesets found".dimmed());
        return;
    }

    for ruleset in &rulesets {
        println!();
        println!("{}", ruleset.name.cyan().bold());
        print_field("ID:", &ruleset.id);
        print_field("Region:", &ruleset.region.name);
        if ruleset.is_in_use() {
            print_field(
                "Status:",
                format!("{} ({} instances)", "In use".green(), ruleset.instance_ids.len()),
            );
        } else {
            print_field("Status:", "Not in use".dimmed());
        }
        print_field("Created:", ruleset.created.format("%Y-%m-%d %H:%M:%S"));
        print_field("Rules:", format!("{} rule(s)", ruleset.rules.len()));

        if !ruleset.rules.is_empty() {
            println!(
                "  {}",
                format!("{:<10} {:<13} {:<20} {}", "PROTOCOL", "PORTS", "SOURCE", "DESCRIPTION")
                    .bold()
            );
            for rule in &ruleset.rules {
                println!(
                    "  {:<10} {:<13} {:<20} {}",
                    rule.protocol.to_string().cyan(),
                    format_ports(rule.port_range).yellow(),
                    rule.source_network.green(),
                    rule.description
                );
            }
        }
    }

    println!();
    println!(
        "{} firewall rulesets{}",
        rulesets.len().to_string().bold(),
        filter_note(regions)
    );
}
