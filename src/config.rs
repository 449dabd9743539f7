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

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{paths, SYSFS_ROOT_ENV};
use crate::error::{BusmapError, Result};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory the `sys/` tree is read from; `/` on a live system
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
    /// Default tracing filter when RUST_LOG is unset
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
    /// Where `--logging` appends JSON events
    #[serde(default)]
    pub event_log: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            log_level: None,
            format: OutputFormat::default(),
            event_log: None,
        }
    }
}

/// An unset or empty variable counts as absent
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

pub fn config_path() -> PathBuf {
    if let Some(xdg) = non_empty_var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("busmap").join(paths::CONFIG_FILE);
    }
    if let Some(home) = non_empty_var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("busmap")
            .join(paths::CONFIG_FILE);
    }
    Path::new(paths::SYSTEM_CONFIG_DIR).join(paths::CONFIG_FILE)
}

/// Read a config file. A missing file gives the defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e.into()),
    };
    let cfg: Config = serde_json::from_str(&data)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Config from the usual location, with `BUSMAP_SYSFS_ROOT` applied on top
pub fn load_config() -> Result<Config> {
    let mut cfg = load_config_from(&config_path())?;
    apply_env_overrides(&mut cfg);
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(root) = env::var(SYSFS_ROOT_ENV) {
        if !root.is_empty() {
            cfg.sysfs_root = PathBuf::from(root);
        }
    }
}

pub fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.sysfs_root.as_os_str().is_empty() || !cfg.sysfs_root.is_absolute() {
        return Err(BusmapError::invalid_config(
            "sysfs_root",
            format!("must be an absolute path, got {:?}", cfg.sysfs_root),
        ));
    }
    if let Some(level) = &cfg.log_level {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(BusmapError::invalid_config(
                "log_level",
                format!("unknown level {:?}, expected one of {}", level, LOG_LEVELS.join(", ")),
            ));
        }
    }
    if let Some(log) = &cfg.event_log {
        if log.as_os_str().is_empty() {
            return Err(BusmapError::invalid_config("event_log", "must not be empty"));
        }
    }
    Ok(())
}
