use colored::{ColoredString, Colorize};
use devbox_lambda::{Instance, InstanceStatus, WaitObserver};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

const HOURS_PER_DAY: f64 = 24.0;
const HOURS_PER_MONTH: f64 = 730.0;

pub fn ssh_command(username: &str, ip: &str) -> String {
    format!("ssh {}@{}", username, ip)
}

/// `$1.29/hour ($30.96/day, $941.70/month)`
pub fn format_price(cents_per_hour: u64) -> String {
    let dollars = cents_per_hour as f64 / 100.0;
    format!(
        "${:.2}/hour (${:.2}/day, ${:.2}/month)",
        dollars,
        dollars * HOURS_PER_DAY,
        dollars * HOURS_PER_MONTH
    )
}

/// Filesystem usage in MB below 1 GB, GB above
pub fn format_bytes(bytes: Option<u64>) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    match bytes {
        None => "Unknown".to_string(),
        Some(bytes) => {
            let bytes = bytes as f64;
            if bytes < GIB {
                format!("{:.1} MB", bytes / MIB)
            } else {
                format!("{:.1} GB", bytes / GIB)
            }
        }
    }
}

/// Firewall port range: `22`, `8000-8100`, or `-` when the rule has no ports
pub fn format_ports(port_range: Option<[u16; 2]>) -> String {
    match port_range {
        Some([low, high]) if low == high => low.to_string(),
        Some([low, high]) => format!("{}-{}", low, high),
        None => "-".to_string(),
    }
}

pub fn status_colored(status: InstanceStatus) -> ColoredString {
    match status {
        InstanceStatus::Active => status.as_str().green().bold(),
        InstanceStatus::Booting => status.as_str().yellow().bold(),
        InstanceStatus::Unhealthy => status.as_str().red().bold(),
        InstanceStatus::Terminated => status.as_str().dimmed(),
    }
}

/// Header row followed by a rule
pub fn print_header(header: &str) {
    println!("{}", header.bold());
    println!("{}", "─".repeat(header.chars().count()).dimmed());
}

/// Two-column detail row: `   Label: value`
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:>13} {}", label.dimmed(), value);
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Show a spinner on stderr while `future` runs
pub async fn with_spinner<F: Future>(message: impl Into<String>, future: F) -> F::Output {
    let spinner = spinner(message);
    let output = future.await;
    spinner.finish_and_clear();
    output
}

/// Reports waiter progress on the terminal
pub struct ConsoleObserver {
    spinner: ProgressBar,
}

impl ConsoleObserver {
    pub fn new(count: usize) -> Self {
        Self {
            spinner: spinner(format!("Waiting for {} instance(s) to be ready...", count)),
        }
    }
}

impl WaitObserver for ConsoleObserver {
    fn on_ready(&mut self, instance: &Instance) {
        let line = format!(
            "{} Ready: {} → {} ({})",
            "✓".green(),
            instance.id.cyan(),
            instance.public_ip().unwrap_or("-").green(),
            instance.status.as_str().magenta()
        );
        // println is a no-op on a hidden bar; suspend prints either way
        self.spinner.suspend(|| println!("{}", line));
    }

    fn on_pending(&mut self, pending: &[String], next_delay: Duration) {
        self.spinner.set_message(format!(
            "Waiting for {} instance(s), next check in {:.1}s",
            pending.len(),
            next_delay.as_secs_f64()
        ));
    }
}

impl Drop for ConsoleObserver {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
    }
}
