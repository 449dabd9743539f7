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

//! Fixed sysfs paths, node-name prefixes and attribute names.
//!
//! The kernel's textual conventions are the compatibility contract here, so
//! prefixes are matched as raw strings and never parsed into richer types.

/// Kernel paths, relative to the sysfs root the accessor was built over
pub mod paths {
    /// Where every I2C adapter and client is linked by name
    pub const I2C_BUS_DEVICES: &str = "sys/bus/i2c/devices";

    /// Same location, as shown to users in reports
    pub const I2C_BUS_DEVICES_DISPLAY: &str = "/sys/bus/i2c/devices";

    /// Config directory used when neither XDG_CONFIG_HOME nor HOME is set
    pub const SYSTEM_CONFIG_DIR: &str = "/etc/busmap";

    pub const CONFIG_FILE: &str = "config.json";

    /// Event log used when the configured one cannot be opened
    pub const FALLBACK_EVENT_LOG: &str = "/tmp/busmap_events.json";
}

/// Node-name prefixes
pub mod names {
    /// Bus adapter nodes: `i2c-<N>`
    pub const I2C_PREFIX: &str = "i2c-";

    /// DisplayPort AUX channel node under a connector: `drm_dp_aux<N>`
    pub const DP_AUX_PREFIX: &str = "drm_dp_aux";

    /// DRM card nodes and their connectors: `card0`, `card0-DP-1`
    pub const CARD_PREFIX: &str = "card";

    /// PCI base class 0x03 is "display controller"
    pub const DISPLAY_CLASS_PREFIX: &str = "0x03";
}

/// Attribute and link names
pub mod attrs {
    pub const NAME: &str = "name";
    pub const DEV: &str = "dev";
    pub const I2C_DEV: &str = "i2c-dev";
    pub const DDC: &str = "ddc";
    pub const DRIVER: &str = "driver";
    pub const DRM: &str = "drm";
    pub const CLASS: &str = "class";
    pub const VENDOR: &str = "vendor";
    pub const DEVICE: &str = "device";
    pub const BOOT_VGA: &str = "boot_vga";
    pub const EDID: &str = "edid";
    pub const ENABLED: &str = "enabled";
    pub const STATUS: &str = "status";
    pub const PARENT: &str = "..";
}

/// Report layout
pub mod report {
    /// Spaces per depth level
    pub const INDENT_WIDTH: usize = 3;

    /// Column the traced value starts at, after indentation
    pub const TRACE_PATH_WIDTH: usize = 60;
}

/// Levels from a connector node up to its display controller:
/// `<controller>/drm/cardN/cardN-<connector>`
pub const CONNECTOR_TO_CONTROLLER_LEVELS: usize = 3;

/// Environment variable that overrides the configured sysfs root
pub const SYSFS_ROOT_ENV: &str = "BUSMAP_SYSFS_ROOT";
