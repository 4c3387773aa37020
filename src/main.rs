use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dxl_pwm_rig::config::SessionConfig;
use dxl_pwm_rig::error::RigError;
use dxl_pwm_rig::runtime;

/// Oscillate Dynamixel actuators between two positions with PWM commands.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Serial port of the actuator bus
    #[arg(short, long)]
    port: Option<String>,

    /// Bus baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Actuator ids, comma separated
    #[arg(long, value_delimiter = ',')]
    ids: Option<Vec<u8>>,

    /// JSON session config (defaults describe the X-series bench rig)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read-only bus check: ping and read state, never write
    #[arg(long)]
    scan: bool,
}

fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();
    let result = build_config(&args).and_then(|cfg| {
        if args.scan {
            runtime::scan(&cfg)
        } else {
            runtime::run(&cfg)
        }
    });

    if let Err(e) = result {
        eprintln!("Rig error: {e}");
        std::process::exit(1);
    }
}

fn build_config(args: &Args) -> Result<SessionConfig, RigError> {
    let mut cfg = match &args.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(port) = &args.port {
        cfg.port = port.clone();
    }
    if let Some(baud) = args.baud {
        cfg.baud_rate = baud;
    }
    if let Some(ids) = &args.ids {
        cfg.ids = ids.clone();
    }
    Ok(cfg)
}
