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

//! Resolve which display controller, connector and DisplayPort AUX channel
//! an I2C bus belongs to.
//!
//! The bus's device node sits in one of two places:
//!
//! ```text
//! DisplayPort:  <controller>/drm/cardN/cardN-DP-1/i2c-13     (next to drm_dp_auxM)
//! otherwise:    <controller>/i2c-5                            (connector links to it via ddc)
//! ```
//!
//! In the first case the parent is the connector. In the second the parent is
//! the controller, and the connector is found by looking for the one whose
//! `ddc/i2c-dev/i2c-<N>` exists.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::constants::{attrs, names, CONNECTOR_TO_CONTROLLER_LEVELS};
use crate::edid::ParsedEdid;
use crate::i2c_util::{bus_device_name, bus_number_from_device_name, i2c_compare};
use crate::sysfs::{basename, nested, Depth, Sysfs};
use crate::walker::for_each_ordered;

/// What sysfs says about one I2C bus.
///
/// Paths are as the kernel names them (`/sys/devices/...`), independent of
/// the root the tree was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct I2cSysInfo {
    pub busno: u32,
    /// Real path of `/sys/bus/i2c/devices/i2c-N`
    pub pci_device_path: Option<PathBuf>,
    pub device_name: Option<String>,
    pub i2c_dev_name: Option<String>,
    pub i2c_dev_dev: Option<String>,

    pub is_display_port: bool,
    /// Set at most once per resolution
    pub connector: Option<String>,
    pub linked_ddc_filename: Option<String>,
    pub ddc_path: Option<PathBuf>,
    pub ddc_name: Option<String>,
    pub ddc_i2c_dev_name: Option<String>,
    pub ddc_i2c_dev_dev: Option<String>,
    pub drm_dp_aux_name: Option<String>,
    pub drm_dp_aux_dev: Option<String>,
    pub connector_edid: Option<ParsedEdid>,
    pub connector_enabled: Option<String>,
    pub connector_status: Option<String>,

    pub controller_path: Option<PathBuf>,
    pub controller_vendor: Option<String>,
    pub controller_device: Option<String>,
    pub controller_boot_vga: Option<String>,
    pub driver: Option<String>,
}

/// Accumulates an [`I2cSysInfo`] during one tree walk.
///
/// The connector can only be claimed once; later candidates are refused.
#[derive(Debug)]
pub struct TopologyBuilder {
    info: I2cSysInfo,
}

impl TopologyBuilder {
    pub fn new(busno: u32) -> Self {
        Self {
            info: I2cSysInfo {
                busno,
                ..Default::default()
            },
        }
    }

    pub fn busno(&self) -> u32 {
        self.info.busno
    }

    pub fn has_connector(&self) -> bool {
        self.info.connector.is_some()
    }

    /// Record the owning connector. Returns false if one was already recorded.
    pub fn claim_connector(&mut self, connector: &str) -> bool {
        match &self.info.connector {
            Some(existing) if existing == connector => true,
            Some(existing) => {
                debug!(busno = self.info.busno, existing = %existing, candidate = connector, "Connector already recorded");
                false
            }
            None => {
                self.info.connector = Some(connector.to_string());
                true
            }
        }
    }

    pub fn finish(self) -> I2cSysInfo {
        self.info
    }
}

fn is_dp_aux(name: &str) -> bool {
    name.starts_with(names::DP_AUX_PREFIX)
}

fn starts_with_card(name: &str) -> bool {
    name.starts_with(names::CARD_PREFIX)
}

/// Resolve bus `busno`. `None` only if `/sys/bus/i2c/devices/i2c-<busno>`
/// does not exist; anything missing further down leaves fields unset.
pub fn resolve_topology(sysfs: &Sysfs, busno: u32, depth: Depth) -> Option<I2cSysInfo> {
    let d1 = nested(depth);
    let bus_path = sysfs.bus_device_path(busno);
    if !bus_path.is_dir() {
        debug!(busno, path = %bus_path.display(), "No sysfs node for bus");
        return None;
    }

    let mut builder = TopologyBuilder::new(busno);

    // real path is in the /sys/devices tree
    let Some(device_path) = sysfs.read_realpath(d1, &bus_path, &[]) else {
        return Some(builder.finish());
    };
    builder.info.pci_device_path = Some(sysfs.kernel_path(&device_path));
    read_bus_device_node(sysfs, &device_path, &mut builder, d1);

    if let Some(parent) = sysfs.read_realpath(d1, &device_path, &[attrs::PARENT]) {
        if sysfs.has_subdir(d1, &parent, &[], is_dp_aux) {
            read_dp_connector_parent(sysfs, &parent, &mut builder, d1);
        } else {
            read_pci_display_controller_node(sysfs, &parent, &mut builder, d1);
        }
    }

    let info = builder.finish();
    info!(
        busno,
        connector = info.connector.as_deref().unwrap_or("-"),
        display_port = info.is_display_port,
        driver = info.driver.as_deref().unwrap_or("-"),
        "Resolved I2C bus topology"
    );
    Some(info)
}

/// Give a record back. Dropping it is all there is to do; `None` is fine.
pub fn release(info: Option<I2cSysInfo>) {
    drop(info);
}

/// Attributes of the `i2c-N` node itself, wherever it lives
fn read_bus_device_node(sysfs: &Sysfs, device_path: &Path, builder: &mut TopologyBuilder, depth: Depth) {
    let i2c_n = basename(device_path).unwrap_or_else(|| bus_device_name(builder.busno()));
    let info = &mut builder.info;
    info.device_name = sysfs.read_text(depth, device_path, &[attrs::NAME]);
    info.i2c_dev_dev = sysfs.read_text(depth, device_path, &[attrs::I2C_DEV, i2c_n.as_str(), attrs::DEV]);
    info.i2c_dev_name = sysfs.read_text(depth, device_path, &[attrs::I2C_DEV, i2c_n.as_str(), attrs::NAME]);
}

/// The bus sits next to an AUX channel, so its parent is a DisplayPort connector.
fn read_dp_connector_parent(sysfs: &Sysfs, connector_path: &Path, builder: &mut TopologyBuilder, depth: Depth) {
    builder.info.is_display_port = true;
    read_connector_node(sysfs, connector_path, builder, depth);

    let up: Vec<&str> = vec![attrs::PARENT; CONNECTOR_TO_CONTROLLER_LEVELS];
    if let Some(controller) = sysfs.read_realpath(depth, connector_path, &up) {
        builder.info.controller_path = Some(sysfs.kernel_path(&controller));
        read_controller_driver(sysfs, &controller, builder, depth);
    }
}

/// Connector attributes, shared by both tree shapes.
///
/// The connector is claimed once its `ddc` link resolves. The AUX channel is
/// read if present; the caller decides what that means for `is_display_port`.
fn read_connector_node(sysfs: &Sysfs, connector_path: &Path, builder: &mut TopologyBuilder, depth: Depth) {
    if let Some(ddc_path) = sysfs.read_realpath(depth, connector_path, &[attrs::DDC]) {
        let Some(connector) = basename(connector_path) else {
            return;
        };
        if !builder.claim_connector(&connector) {
            return;
        }
        let linked = basename(&ddc_path);
        let info = &mut builder.info;
        info.ddc_name = sysfs.read_text(depth, &ddc_path, &[attrs::NAME]);
        if let Some(linked) = &linked {
            info.ddc_i2c_dev_name = sysfs.read_text(depth, &ddc_path, &[attrs::I2C_DEV, linked.as_str(), attrs::NAME]);
            info.ddc_i2c_dev_dev = sysfs.read_text(depth, &ddc_path, &[attrs::I2C_DEV, linked.as_str(), attrs::DEV]);
        }
        info.ddc_path = Some(sysfs.kernel_path(&ddc_path));
        info.linked_ddc_filename = linked;
    }

    if let Some(aux) = sysfs.find_single_subdir(depth, connector_path, &[], is_dp_aux) {
        let info = &mut builder.info;
        info.drm_dp_aux_name = sysfs.read_text(depth, connector_path, &[aux.as_str(), attrs::NAME]);
        info.drm_dp_aux_dev = sysfs.read_text(depth, connector_path, &[aux.as_str(), attrs::DEV]);
    }

    let info = &mut builder.info;
    info.connector_edid = sysfs.read_edid(depth, connector_path, &[attrs::EDID]);
    info.connector_enabled = sysfs.read_text(depth, connector_path, &[attrs::ENABLED]);
    info.connector_status = sysfs.read_text(depth, connector_path, &[attrs::STATUS]);
}

fn read_controller_driver(sysfs: &Sysfs, controller_path: &Path, builder: &mut TopologyBuilder, depth: Depth) {
    if let Some(driver_path) = sysfs.read_realpath(depth, controller_path, &[attrs::DRIVER]) {
        builder.info.driver = basename(&driver_path);
    }
}

/// Parent of a non-DisplayPort bus. Only PCI class 0x03 nodes are display
/// controllers; anything else yields no connector.
fn read_pci_display_controller_node(sysfs: &Sysfs, nodepath: &Path, builder: &mut TopologyBuilder, depth: Depth) {
    let d1 = nested(depth);

    let class = sysfs.read_text(depth, nodepath, &[attrs::CLASS]);
    match class.as_deref() {
        Some(class) if class.starts_with(names::DISPLAY_CLASS_PREFIX) => {}
        other => {
            debug!(
                busno = builder.busno(),
                path = %nodepath.display(),
                class = other.unwrap_or("<absent>"),
                "Bus parent is not a display controller"
            );
            return;
        }
    }

    let info = &mut builder.info;
    info.controller_path = Some(sysfs.kernel_path(nodepath));
    info.controller_boot_vga = sysfs.read_text(depth, nodepath, &[attrs::BOOT_VGA]);
    info.controller_vendor = sysfs.read_text(depth, nodepath, &[attrs::VENDOR]);
    info.controller_device = sysfs.read_text(depth, nodepath, &[attrs::DEVICE]);
    read_controller_driver(sysfs, nodepath, builder, depth);

    for_each_ordered(
        &nodepath.join(attrs::DRM),
        Some(&starts_with_card),
        i2c_compare,
        |drm_dir, card, builder: &mut TopologyBuilder, depth| {
            read_drm_card(sysfs, &drm_dir.join(card), builder, depth)
        },
        builder,
        d1,
    );
}

/// `<controller>/drm/cardN`: try each `cardN-<connector>` child in order
fn read_drm_card(sysfs: &Sysfs, card_path: &Path, builder: &mut TopologyBuilder, depth: Depth) {
    for_each_ordered(
        card_path,
        Some(&starts_with_card),
        i2c_compare,
        |card_dir, connector, builder: &mut TopologyBuilder, depth| {
            read_candidate_connector(sysfs, card_dir, connector, builder, depth)
        },
        builder,
        depth,
    );
}

/// A connector of a display controller whose bus hangs off the controller.
/// First one in order whose `ddc/i2c-dev/i2c-<N>` exists wins.
fn read_candidate_connector(
    sysfs: &Sysfs,
    card_dir: &Path,
    connector: &str,
    builder: &mut TopologyBuilder,
    depth: Depth,
) {
    if builder.has_connector() {
        debug!(connector, "Connector already found, skipping");
        return;
    }

    // DisplayPort connectors own their bus directly, never via the controller
    if sysfs.has_subdir(depth, card_dir, &[connector], is_dp_aux) {
        debug!(connector, "DisplayPort connector, skipping");
        return;
    }

    let i2c_n = bus_device_name(builder.busno());
    let owns_bus = sysfs.has_subdir(depth, card_dir, &[connector, attrs::DDC, attrs::I2C_DEV], |name| {
        name == i2c_n
    });
    if !owns_bus {
        return;
    }

    builder.claim_connector(connector);
    read_connector_node(sysfs, &card_dir.join(connector), builder, nested(depth));
}

/// One entry of `/sys/bus/i2c/devices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    /// An adapter node, with the report lines traced while resolving it
    Resolved { info: I2cSysInfo, trace: Vec<String> },
    /// An adapter that disappeared between listing and resolving
    Vanished(u32),
    /// A client node such as `1-0050`
    Ignored(String),
}

impl ScanEntry {
    pub fn info(&self) -> Option<&I2cSysInfo> {
        match self {
            ScanEntry::Resolved { info, .. } => Some(info),
            _ => None,
        }
    }
}

/// Resolve every adapter under `/sys/bus/i2c/devices`, in bus order.
pub fn scan_buses(sysfs: &Sysfs, depth: Depth) -> Vec<ScanEntry> {
    let mut entries = Vec::new();
    for_each_ordered(
        &sysfs.bus_devices_dir(),
        None,
        i2c_compare,
        |_, name, entries: &mut Vec<ScanEntry>, depth| match bus_number_from_device_name(name) {
            Some(busno) => {
                let entry = match resolve_topology(sysfs, busno, depth) {
                    Some(info) => ScanEntry::Resolved {
                        info,
                        trace: sysfs.take_trace(),
                    },
                    None => ScanEntry::Vanished(busno),
                };
                entries.push(entry);
            }
            None => {
                debug!(name, "Ignoring non-adapter node");
                entries.push(ScanEntry::Ignored(name.to_string()));
            }
        },
        &mut entries,
        depth,
    );
    entries
}
