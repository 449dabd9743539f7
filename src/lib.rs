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

//! Busmap - map Linux I2C buses to the DRM connectors and GPUs behind them
//!
//! Given a bus number, [`resolve_topology`] follows `/sys/bus/i2c/devices/i2c-N`
//! into the device tree and reports the owning connector, whether the bus is a
//! DisplayPort AUX channel, and the PCI display controller and its driver.

pub mod config;
pub mod constants;
pub mod edid;
pub mod error;
pub mod i2c_util;
pub mod logger;
pub mod report;
pub mod sysfs;
pub mod topology;
pub mod walker;

#[cfg(test)]
pub mod test_utils;

pub use error::{BusmapError, Result};
pub use i2c_util::{i2c_compare, parse_bus_arg};
pub use report::{render, render_scan, report_all_buses};
pub use sysfs::{Depth, Sysfs};
pub use topology::{release, resolve_topology, scan_buses, I2cSysInfo, ScanEntry};
pub use walker::for_each_ordered;
