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

//! Indented text reports.

use std::fmt::Write as _;
use std::path::Path;

use crate::constants::paths::I2C_BUS_DEVICES_DISPLAY;
use crate::constants::report::INDENT_WIDTH;
use crate::sysfs::{Depth, Sysfs};
use crate::topology::{scan_buses, I2cSysInfo, ScanEntry};

const ABSENT: &str = "(not found)";

/// Line-oriented report; negative depths render at the left margin
#[derive(Debug, Default)]
pub struct Report {
    out: String,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, depth: Depth, text: impl AsRef<str>) {
        let indent = depth.max(0) as usize * INDENT_WIDTH;
        let _ = writeln!(self.out, "{:indent$}{}", "", text.as_ref(), indent = indent);
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Lines that already carry their own indentation
    pub fn raw_lines(&mut self, lines: &[String]) {
        for line in lines {
            self.out.push_str(line);
            self.out.push('\n');
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(ABSENT)
}

fn path_text(value: &Option<std::path::PathBuf>) -> String {
    value
        .as_deref()
        .map(Path::display)
        .map(|p| p.to_string())
        .unwrap_or_else(|| ABSENT.to_string())
}

/// Render one record as the indented block shown by the detect report
pub fn render(info: &I2cSysInfo, depth: Depth) -> String {
    let mut report = Report::new();
    render_into(&mut report, info, depth);
    report.into_string()
}

fn render_into(report: &mut Report, info: &I2cSysInfo, depth: Depth) {
    let d1 = depth.max(0) + 1;
    let d2 = d1 + 1;
    let busno = info.busno;
    // keeps the value column aligned for one- and two-digit buses
    let pad = if busno < 10 { " " } else { "" };

    report.line(
        depth,
        format!("Extended information for {}/i2c-{}...", I2C_BUS_DEVICES_DISPLAY, busno),
    );
    report.line(d1, format!("PCI device path:     {}", path_text(&info.pci_device_path)));
    report.line(d1, format!("name:                {}", text(&info.device_name)));
    report.line(d1, format!("i2c-dev/i2c-{}/dev: {} {}", busno, pad, text(&info.i2c_dev_dev)));
    report.line(d1, format!("i2c-dev/i2c-{}/name:{} {}", busno, pad, text(&info.i2c_dev_name)));
    report.line(d1, format!("Connector:           {}", text(&info.connector)));
    report.line(d1, format!("Driver:              {}", text(&info.driver)));
    if info.connector.is_some() {
        report.line(d1, format!("Connector status:    {}", text(&info.connector_status)));
        report.line(d1, format!("Connector enabled:   {}", text(&info.connector_enabled)));
        let edid = info
            .connector_edid
            .as_ref()
            .map(|e| e.summary())
            .unwrap_or_else(|| ABSENT.to_string());
        report.line(d1, format!("EDID:                {}", edid));
    }

    if info.is_display_port {
        let linked = text(&info.linked_ddc_filename);
        report.line(d1, "DisplayPort only attributes:");
        report.line(d2, format!("ddc path:                {}", path_text(&info.ddc_path)));
        report.line(d2, format!("ddc name:                {}", text(&info.ddc_name)));
        report.line(d2, format!("ddc i2c-dev/{}/dev:  {} {}", linked, pad, text(&info.ddc_i2c_dev_dev)));
        report.line(d2, format!("ddc i2c-dev/{}/name: {} {}", linked, pad, text(&info.ddc_i2c_dev_name)));
        report.line(d2, format!("DP Aux channel dev:      {}", text(&info.drm_dp_aux_dev)));
        report.line(d2, format!("DP Aux channel name:     {}", text(&info.drm_dp_aux_name)));
    } else {
        report.line(d1, "Not a DisplayPort connection");
    }
}

/// Walk every bus under `/sys/bus/i2c/devices` and report each one.
///
/// With a non-negative `trace_depth` the attribute reads made while resolving
/// a bus are listed before its report.
pub fn report_all_buses(sysfs: &Sysfs, depth: Depth, trace_depth: Depth) -> String {
    render_scan(&scan_buses(sysfs, trace_depth), depth)
}

/// Render entries already collected by [`scan_buses`]
pub fn render_scan(entries: &[ScanEntry], depth: Depth) -> String {
    let mut report = Report::new();
    report.line(
        depth,
        format!("Examining {} for MST, duplicate EDIDs:", I2C_BUS_DEVICES_DISPLAY),
    );
    report.blank();

    for entry in entries {
        match entry {
            ScanEntry::Ignored(name) => {
                report.line(depth, format!("Ignoring: {}/{}", I2C_BUS_DEVICES_DISPLAY, name));
            }
            ScanEntry::Vanished(busno) => {
                report.blank();
                report.line(depth, format!("No sysfs node for {}/i2c-{}", I2C_BUS_DEVICES_DISPLAY, busno));
            }
            ScanEntry::Resolved { info, trace } => {
                report.blank();
                report.line(
                    depth,
                    format!("Examining device {}/i2c-{}...", I2C_BUS_DEVICES_DISPLAY, info.busno),
                );
                report.raw_lines(trace);
                render_into(&mut report, info, depth.max(0) + 1);
            }
        }
    }
    report.into_string()
}
