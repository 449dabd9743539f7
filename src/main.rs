/*
 * This file is part of Busmap.
 *
 * Copyright (C) 2025 Busmap contributors
 *
 * Busmap is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Busmap is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Busmap. If not, see <https://www.gnu.org/licenses/>.
 */

use std::path::PathBuf;

use anyhow::Context;
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use busmap::config::{self, OutputFormat};
use busmap::constants::paths::I2C_BUS_DEVICES_DISPLAY;
use busmap::error::BusmapError;
use busmap::{logger, parse_bus_arg, release, render, render_scan, resolve_topology, scan_buses};
use busmap::{Depth, I2cSysInfo, ScanEntry, Sysfs};

const USAGE: &str = "Usage: busmap [--json] [--trace] [--logging] [--root DIR] [BUSNO ...]";

#[derive(Debug, Default)]
struct Args {
    json: bool,
    trace: bool,
    logging: bool,
    root: Option<PathBuf>,
    buses: Vec<u32>,
}

fn parse_args(args: &[String]) -> Result<Args, BusmapError> {
    let mut parsed = Args::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => parsed.json = true,
            "--trace" => parsed.trace = true,
            "--logging" => parsed.logging = true,
            "--root" => {
                i += 1;
                let dir = args
                    .get(i)
                    .ok_or_else(|| BusmapError::InvalidArgument("--root requires a directory".to_string()))?;
                parsed.root = Some(PathBuf::from(dir));
            }
            flag if flag.starts_with("--") => {
                return Err(BusmapError::InvalidArgument(format!("unknown option {}", flag)));
            }
            bus => parsed.buses.push(parse_bus_arg(bus)?),
        }
        i += 1;
    }
    Ok(parsed)
}

fn init_tracing(config_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config_level.unwrap_or("warn")));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn log_resolution(logging: bool, busno: u32, info: Option<&I2cSysInfo>) {
    if !logging {
        return;
    }
    logger::log_event(
        "resolve",
        json!({
            "busno": busno,
            "found": info.is_some(),
            "connector": info.and_then(|i| i.connector.clone()),
            "is_display_port": info.map(|i| i.is_display_port).unwrap_or(false),
        }),
    );
}

/// One `resolve` event per bus the scan found, vanished ones included
fn log_scan(logging: bool, entries: &[ScanEntry]) {
    for entry in entries {
        match entry {
            ScanEntry::Resolved { info, .. } => log_resolution(logging, info.busno, Some(info)),
            ScanEntry::Vanished(busno) => log_resolution(logging, *busno, None),
            ScanEntry::Ignored(_) => {}
        }
    }
}

fn run(args: &Args, cfg: &config::Config) -> anyhow::Result<()> {
    let root = args.root.clone().unwrap_or_else(|| cfg.sysfs_root.clone());
    if !root.is_dir() {
        anyhow::bail!("sysfs root {} is not a directory", root.display());
    }
    let sysfs = Sysfs::new(root);
    let depth: Depth = if args.trace { 0 } else { -1 };
    let json_out = args.json || cfg.format == OutputFormat::Json;
    debug!(root = %sysfs.root().display(), json = json_out, trace = args.trace, "Starting");

    if args.buses.is_empty() {
        // JSON output carries no trace lines
        let trace_depth = if json_out { -1 } else { depth };
        let entries = scan_buses(&sysfs, trace_depth);
        log_scan(args.logging, &entries);
        if json_out {
            let records: Vec<&I2cSysInfo> = entries.iter().filter_map(ScanEntry::info).collect();
            let out = serde_json::to_string_pretty(&records).context("Failed to serialize records")?;
            println!("{}", out);
        } else {
            print!("{}", render_scan(&entries, 0));
        }
        return Ok(());
    }

    if json_out {
        let records: Vec<I2cSysInfo> = args
            .buses
            .iter()
            .filter_map(|&busno| {
                let info = resolve_topology(&sysfs, busno, -1);
                log_resolution(args.logging, busno, info.as_ref());
                info
            })
            .collect();
        let out = serde_json::to_string_pretty(&records).context("Failed to serialize records")?;
        println!("{}", out);
        return Ok(());
    }

    for &busno in &args.buses {
        let info = resolve_topology(&sysfs, busno, depth);
        log_resolution(args.logging, busno, info.as_ref());
        for line in sysfs.take_trace() {
            println!("{}", line);
        }
        match &info {
            Some(record) => print!("{}", render(record, 0)),
            None => println!("No sysfs node for {}/i2c-{}", I2C_BUS_DEVICES_DISPLAY, busno),
        }
        release(info);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let argv: Vec<String> = std::env::args().collect();

    let args = match parse_args(&argv) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {} ({})", e, config::config_path().display());
            std::process::exit(1);
        }
    };

    init_tracing(cfg.log_level.as_deref());

    if args.logging {
        logger::init_logging(cfg.event_log.as_deref());
        logger::log_event("startup", json!({ "args": argv }));
    }
    info!("busmap {} starting", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(&args, &cfg) {
        eprintln!("error: {err:#}");
        if args.logging {
            logger::log_event("fatal_error", json!({ "error": err.to_string() }));
        }
        std::process::exit(1);
    }
    Ok(())
}
