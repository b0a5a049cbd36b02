use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use fritz_watchdog::config::{load_config, WatchdogConfig};
use fritz_watchdog::device::{DeviceApi, Tr064Client};
use fritz_watchdog::health::{classify, ProbeResult, StatusProbe};
use fritz_watchdog::observability::logging;

#[derive(Parser)]
#[command(name = "fritz-cli")]
#[command(about = "One-shot TR-064 commands for the FRITZ!Box watchdog", long_about = None)]
struct Cli {
    /// TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the external IPv4 and its health verdict
    Status,
    /// Force the WAN connection to reconnect
    Reconnect,
    /// Reboot the router (returns as soon as the command is accepted)
    Reboot,
    /// Validate the configuration and print it (password redacted)
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    logging::init(&config.observability);

    match cli.command {
        Commands::Status => {
            let client = std::sync::Arc::new(Tr064Client::new(&config.device)?);
            let probe = StatusProbe::new(client, config.device.timeout());
            let result = probe.probe().await;
            print_status(&config, &result)?;
        }
        Commands::Reconnect => {
            let client = Tr064Client::new(&config.device)?;
            client.force_termination().await?;
            println!("Reconnect requested on {}", config.device.service);
        }
        Commands::Reboot => {
            let client = Tr064Client::new(&config.device)?;
            client.reboot().await?;
            println!("Reboot requested on {}", config.device.host);
        }
        Commands::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn print_status(
    config: &WatchdogConfig,
    result: &ProbeResult,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = json!({
        "host": config.device.host,
        "service": config.device.service,
        "address": result.address(),
        "error": result.error().map(|e| e.to_string()),
        "verdict": classify(result),
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
