//! # Kerf topology checker
//!
//! Loads a machine configuration, resolves the axis/motor/pin topology
//! and reports it. Configuration mistakes — bad pin specs, double-claimed
//! lines, unknown backends — surface here as errors instead of faults in
//! the pulse path.
//!
//! # Usage
//!
//! ```bash
//! # Resolve and report a machine file
//! kerf --config machine.toml
//!
//! # Validate only (exit nonzero on any configuration error)
//! kerf --config machine.toml --check
//!
//! # Verbose logging, JSON output
//! kerf --config machine.toml -v --json
//! ```

#![deny(warnings)]

use clap::Parser;
use kerf_common::config::MachineConfig;
use kerf_motion::builder::resolve_standard;
use std::path::PathBuf;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Kerf - axis/motor topology checker
#[derive(Parser, Debug)]
#[command(name = "kerf")]
#[command(version)]
#[command(about = "Resolve and report a kerf machine topology")]
#[command(long_about = None)]
struct Args {
    /// Path to the machine configuration file.
    #[arg(short, long, default_value = "machine.toml")]
    config: PathBuf,

    /// Resolve the topology and exit without reporting details.
    #[arg(long)]
    check: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    info!("kerf v{}", env!("CARGO_PKG_VERSION"));

    let config = MachineConfig::load(&args.config)?;
    if let Some(name) = &config.name {
        info!("Machine: {name}");
    }

    let (mut axes, _banks) = resolve_standard(&config)?;
    axes.init();
    axes.read_settings();

    if args.check {
        info!("Configuration OK");
        return Ok(());
    }

    for index in 0..axes.n_axis() {
        let axis = axes.axis(index);
        for gang in 0..kerf_common::mask::MAX_GANGS {
            let slot = axis.gang(gang);
            if slot.motor().is_real() {
                info!(
                    "{} axis gang {}: {} (motor {})",
                    axis.name(),
                    gang,
                    slot.motor().name(),
                    slot.motor_id(),
                );
            }
        }
    }
    info!("motor mask     0x{:08x}", axes.motor_mask());
    info!("limit mask     0x{:08x}", axes.limit_mask());
    info!("homing mask    0x{:08x}", axes.homing_mask());
    info!("pos limit mask 0x{:08x}", axes.pos_limit_mask());
    info!("neg limit mask 0x{:08x}", axes.neg_limit_mask());

    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
