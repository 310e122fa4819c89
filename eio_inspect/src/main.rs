//! # EIO Inspect Binary
//!
//! Command-line inspector for robot controller I/O configuration files.
//! Parses an `EIO.cfg` file (or searches a controller backup directory for
//! one), rebuilds the device hierarchy, and prints devices, submodules,
//! signals, and the exchange buffer layout.
//!
//! # Usage
//!
//! ```bash
//! # Inspect a configuration file directly
//! eio_inspect backup/SYSPAR/EIO.cfg
//!
//! # Search a backup directory for the configuration
//! eio_inspect backup/
//!
//! # Show the exchange buffer sizes for a given exchange config
//! eio_inspect backup/ --exchange-config exchange.toml
//! ```

#![deny(warnings)]

use clap::Parser;
use eio_cfg::{CfgTree, ParseReport};
use eio_io::{DeviceModel, ExchangeConfig, IoDevice, SignalRegistry, layout_bytes};
use std::path::PathBuf;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// EIO Inspect - robot controller I/O configuration inspector
#[derive(Parser, Debug)]
#[command(name = "eio_inspect")]
#[command(version)]
#[command(about = "Parses EIO.cfg files and prints the reconstructed I/O model")]
#[command(long_about = None)]
struct Args {
    /// Configuration file, or a directory searched recursively for EIO.cfg
    path: PathBuf,

    /// Exchange configuration (TOML) used to report buffer sizes
    #[arg(long, value_name = "FILE")]
    exchange_config: Option<PathBuf>,

    /// List every signal of every device
    #[arg(short = 'l', long)]
    list_signals: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    // Issues were already logged by the parser as they were recorded.
    let (tree, report) = load_tree(&args);
    if report.has_errors() {
        return Err("configuration could not be parsed".into());
    }

    match &tree.root {
        Some(root) => {
            info!(
                "parsed {} (domain {}, version {})",
                root.file_name, root.name, root.version
            );
        }
        None => {
            warn!("no recognizable configuration header, model will be empty");
        }
    }

    let model = DeviceModel::build(&tree);
    if !model.issues.is_empty() {
        warn!("{} record(s) had issues, see the log above", model.issues.len());
    }

    for device in &model.devices {
        print_device(device, 0, args.list_signals);
    }

    let registry = SignalRegistry::from_devices(&model.devices);
    println!(
        "{} signals total ({} inputs, {} outputs)",
        registry.len(),
        registry.inputs().len(),
        registry.outputs().len()
    );

    let exchange = match &args.exchange_config {
        Some(path) => ExchangeConfig::load(path)?,
        None => ExchangeConfig::default(),
    };
    println!(
        "exchange layout: {} input bytes, {} output bytes, {} ms cycle",
        exchange.input_offset + layout_bytes(registry.inputs()),
        exchange.output_offset + layout_bytes(registry.outputs()),
        exchange.cycle_time_ms
    );

    Ok(())
}

fn load_tree(args: &Args) -> (CfgTree, ParseReport) {
    if args.path.is_dir() {
        eio_cfg::find_and_parse(&args.path)
    } else {
        eio_cfg::parse_file(&args.path)
    }
}

fn print_device(device: &IoDevice, depth: usize, list_signals: bool) {
    let indent = "  ".repeat(depth);
    let d = &device.descriptor;
    let product = d.product_name.as_deref().unwrap_or("-");
    println!(
        "{indent}{} [{product}] in:{} out:{}",
        d.name,
        device.inputs.len(),
        device.outputs.len()
    );

    if list_signals {
        for signal in device.inputs.iter().chain(&device.outputs) {
            let s = signal.descriptor();
            println!(
                "{indent}  {:<24} {} bits {}..{}",
                s.name,
                s.signal_type,
                s.index,
                s.index + s.length
            );
        }
    }

    for sub in &device.sub_modules {
        print_device(sub, depth + 1, list_signals);
    }
}

fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
