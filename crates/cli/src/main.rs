//! wedo CLI: list WeDo hubs, watch their ports, and drive outputs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::thread;
use std::time::Duration;
use tracing::warn;
use wedo_core::hidapi_backend::HidApiBackend;
use wedo_core::{find_hubs_with, Hub, Slot};

#[derive(Clone, Copy, ValueEnum)]
enum BackendKind {
    /// hidapi (all platforms).
    Hidapi,
    /// Linux hiddev nodes under /dev/usb.
    Hiddev,
}

#[derive(Parser)]
#[command(name = "wedo", version, about = "LEGO WeDo hub tool")]
struct Cli {
    /// Device backend; defaults to the one selected at build time.
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected hubs and the devices on their ports.
    List {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Poll both ports of a hub and print type and value.
    Watch {
        /// Hub index from `list`, or its path.
        #[arg(long)]
        hub: Option<String>,
        /// Delay between polls.
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,
        /// Stop after this many polls.
        #[arg(long)]
        count: Option<u64>,
    },
    /// Write an output byte to a port.
    Set {
        /// Port: A or B.
        port: String,
        /// Output value (0-255).
        value: u8,
        /// Hub index from `list`, or its path.
        #[arg(long)]
        hub: Option<String>,
    },
}

fn discover(backend: Option<BackendKind>) -> Result<Vec<Hub>> {
    let hubs = match backend {
        None => wedo_core::find_hubs()?,
        Some(BackendKind::Hidapi) => find_hubs_with(&mut HidApiBackend::new()?)?,
        #[cfg(target_os = "linux")]
        Some(BackendKind::Hiddev) => find_hubs_with(&mut wedo_core::hiddev::HiddevBackend::new()?)?,
        #[cfg(not(target_os = "linux"))]
        Some(BackendKind::Hiddev) => {
            anyhow::bail!("the hiddev backend is only available on Linux")
        }
    };
    Ok(hubs)
}

/// Pick one hub by index or path; the first one when no selector is given.
fn select_hub(mut hubs: Vec<Hub>, selector: Option<&str>) -> Result<Hub> {
    if hubs.is_empty() {
        anyhow::bail!("No WeDo hub found. Ensure the hub is connected and readable.");
    }
    let Some(selector) = selector else {
        return Ok(hubs.swap_remove(0));
    };

    if let Ok(index) = selector.parse::<usize>() {
        anyhow::ensure!(
            index < hubs.len(),
            "hub index {index} out of range ({} found)",
            hubs.len()
        );
        return Ok(hubs.swap_remove(index));
    }
    hubs.into_iter()
        .find(|h| h.path() == selector)
        .with_context(|| format!("no hub at path '{selector}'"))
}

fn list(hubs: &[Hub], json: bool) -> Result<()> {
    // Keep the discovery index so `--hub <index>` still matches.
    let mut infos = Vec::with_capacity(hubs.len());
    for (i, hub) in hubs.iter().enumerate() {
        match hub.info() {
            Ok(info) => infos.push((i, info)),
            Err(e) => warn!(path = %hub.path(), error = %e, "Failed to read hub ports"),
        }
    }

    if json {
        let infos: Vec<_> = infos.iter().map(|(_, info)| info).collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }
    if hubs.is_empty() {
        println!("No WeDo hubs found.");
        println!("Ensure your hub is connected and you have access to the device node.");
    }
    for (i, info) in &infos {
        println!("[{i}] {} (path: {})", info.name, info.path);
        for port in &info.ports {
            println!(
                "    Port {}: {} (raw 0x{:02X})",
                port.slot, port.device_type, port.raw_type
            );
        }
    }
    Ok(())
}

fn watch(hub: &Hub, interval: Duration, count: Option<u64>) -> Result<()> {
    println!("Watching {} ({})", hub.name(), hub.path());
    let mut polls = 0u64;
    loop {
        let mut line = String::new();
        for port in hub.ports() {
            let ty = port.read_type()?;
            let value = port.read_value()?;
            line.push_str(&format!("{}: {:<15} {:>3}   ", port.slot(), ty.label(), value));
        }
        println!("{}", line.trim_end());

        polls += 1;
        if count.is_some_and(|c| polls >= c) {
            return Ok(());
        }
        thread::sleep(interval);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let hubs = discover(cli.backend).context("hub discovery failed")?;

    match cli.command {
        Commands::List { json } => list(&hubs, json)?,
        Commands::Watch {
            hub,
            interval_ms,
            count,
        } => {
            let hub = select_hub(hubs, hub.as_deref())?;
            watch(&hub, Duration::from_millis(interval_ms), count)?;
        }
        Commands::Set { port, value, hub } => {
            let slot = Slot::from_name(&port)
                .ok_or_else(|| anyhow::anyhow!("Unknown port '{port}'. Valid ports: A, B"))?;
            let hub = select_hub(hubs, hub.as_deref())?;
            let port = hub.port(slot);

            let attached = port.read_type()?;
            if !attached.is_output() {
                warn!(
                    port = %slot,
                    device = %attached,
                    "Writing to a port without an output device"
                );
            }
            port.write_value(value)?;
            println!("Port {slot} of {} set to {value}", hub.name());
        }
    }

    Ok(())
}
