//! Deploy a GPU droplet from a snapshot.
//!
//! Reads its settings from flags or the environment (`DIGITALOCEAN_API_TOKEN`,
//! `SNAPSHOT_ID`, `DROPLET_NAME`, ...), creates the droplet and by default
//! waits for it to become active. Exits 1 on any failure.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use digitalocean::config::is_informational;
use digitalocean::deploy::{deploy, ipv4_addresses, DeployProgress};
use digitalocean::wait::TokioClock;
use digitalocean::{DeployArgs, DeployConfig, DigitalOcean, DoError};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match DeployArgs::try_parse() {
        Ok(args) => args,
        Err(e) if is_informational(&e) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let provider = match DigitalOcean::with_base_url(&config.api_token, &config.api_url) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("\n✗ Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    print_plan(&config);

    match deploy(&provider, &TokioClock, &config, &ConsoleProgress).await {
        Ok(report) => {
            print_json(&report.droplet);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("\n✗ Error: {e}");
            if let Some(droplet) = &e.droplet {
                print_json(droplet);
            }
            ExitCode::FAILURE
        }
    }
}

/// Prints each workflow step to stdout as it completes.
struct ConsoleProgress;

impl DeployProgress for ConsoleProgress {
    fn snapshot_found(&self, snapshot: &Value) {
        println!(
            "\n📦 Snapshot found: {} ({})",
            field(snapshot, "name"),
            field(snapshot, "id")
        );
    }

    fn gpu_sizes(&self, sizes: Result<&[Value], &DoError>) {
        match sizes {
            Ok([]) => {
                println!("\n⚠️  No GPU sizes found. Make sure you're using a GPU-enabled size slug.");
            }
            Ok(sizes) => {
                println!("\nAvailable GPU sizes:");
                for size in sizes {
                    println!(
                        "  - {}: {}",
                        field(size, "slug"),
                        field(size, "description")
                    );
                }
            }
            Err(e) => println!("\n⚠️  Could not list GPU sizes: {e}"),
        }
    }

    fn droplet_created(&self, droplet: &Value) {
        println!("\n✅ Droplet created successfully!");
        println!("   Droplet ID: {}", field(droplet, "id"));
        println!("   Name:       {}", field(droplet, "name"));
        println!("   Status:     {}", field(droplet, "status"));
    }

    fn waiting(&self, droplet_id: u64, timeout: Duration) {
        println!(
            "\n⏳ Waiting up to {}s for droplet {droplet_id} to become active...",
            timeout.as_secs()
        );
    }

    fn droplet_active(&self, droplet: &Value) {
        println!("\n✅ Droplet is now active!");
        let addresses = ipv4_addresses(droplet);
        if !addresses.is_empty() {
            println!("\n📡 Network Information:");
            for (kind, ip) in addresses {
                println!("   {}: {ip}", kind.to_uppercase());
            }
        }
    }
}

fn print_plan(config: &DeployConfig) {
    println!("🚀 Deploying droplet '{}'", config.request.name);
    println!("   Region:   {}", config.request.region);
    println!("   Size:     {}", config.request.size);
    println!("   Snapshot: {}", config.snapshot_id);
}

fn print_json(droplet: &Value) {
    println!("\n{}", "=".repeat(50));
    println!("Droplet Information (JSON):");
    println!(
        "{}",
        serde_json::to_string_pretty(droplet).unwrap_or_else(|_| droplet.to_string())
    );
}

fn field(doc: &Value, key: &str) -> String {
    match doc.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "N/A".to_string(),
        Some(other) => other.to_string(),
    }
}
