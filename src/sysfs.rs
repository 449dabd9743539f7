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

//! Attribute reads against a sysfs tree.
//!
//! Devices come and go while we walk, so every read returns `Option` and a
//! vanished file is just `None`. Each read takes a trace depth: negative
//! depths only produce `debug!` events, non-negative depths also append an
//! indented line to the trace buffer. The depth never changes what is
//! returned.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::paths;
use crate::constants::report::{INDENT_WIDTH, TRACE_PATH_WIDTH};
use crate::edid::{parse_edid, ParsedEdid};
use crate::i2c_util::{bus_device_name, i2c_compare};

/// Report depth. Negative means "debug log only".
pub type Depth = i32;

/// Depth for a nested level: stays negative, otherwise one deeper
pub fn nested(depth: Depth) -> Depth {
    if depth < 0 {
        depth
    } else {
        depth + 1
    }
}

/// Reader over a sysfs tree mounted at `root` (`/` on a live system).
#[derive(Debug)]
pub struct Sysfs {
    root: PathBuf,
    trace: RefCell<Vec<String>>,
}

impl Sysfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        // canonical so resolved link targets can be shown relative to it
        let root = fs::canonicalize(&root).unwrap_or(root);
        Self {
            root,
            trace: RefCell::new(Vec::new()),
        }
    }

    /// The live tree
    pub fn system() -> Self {
        Self::new("/")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a kernel path like `/sys/bus/i2c/devices` under the root
    pub fn path(&self, kernel_path: &str) -> PathBuf {
        self.root.join(kernel_path.trim_start_matches('/'))
    }

    pub fn bus_devices_dir(&self) -> PathBuf {
        self.path(paths::I2C_BUS_DEVICES)
    }

    /// `/sys/bus/i2c/devices/i2c-<busno>` under the root
    pub fn bus_device_path(&self, busno: u32) -> PathBuf {
        self.bus_devices_dir().join(bus_device_name(busno))
    }

    /// Trimmed text of `base/segments...`
    pub fn read_text(&self, depth: Depth, base: &Path, segments: &[&str]) -> Option<String> {
        let path = join_segments(base, segments);
        let value = read_trimmed(&path).ok();
        self.trace_read(depth, &path, value.as_deref());
        value
    }

    /// Canonical target of `base/segments...`, following every symlink
    pub fn read_realpath(&self, depth: Depth, base: &Path, segments: &[&str]) -> Option<PathBuf> {
        let path = join_segments(base, segments);
        let value = fs::canonicalize(&path).ok();
        let shown = value.as_ref().map(|p| self.kernel_path(p).display().to_string());
        self.trace_read(depth, &path, shown.as_deref());
        value
    }

    /// Decoded EDID from a binary attribute. Empty or malformed content is `None`.
    pub fn read_edid(&self, depth: Depth, base: &Path, segments: &[&str]) -> Option<ParsedEdid> {
        let path = join_segments(base, segments);
        let parsed = match fs::read(&path) {
            Ok(bytes) => match parse_edid(&bytes) {
                Ok(edid) => Some(edid),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Ignoring unusable EDID");
                    None
                }
            },
            Err(_) => None,
        };
        let shown = parsed.as_ref().map(ParsedEdid::summary);
        self.trace_read(depth, &path, shown.as_deref());
        parsed
    }

    /// First immediate subdirectory of `base/segments...` whose name satisfies
    /// `predicate`, in numeric-aware name order.
    pub fn find_single_subdir<P>(
        &self,
        depth: Depth,
        base: &Path,
        segments: &[&str],
        predicate: P,
    ) -> Option<String>
    where
        P: Fn(&str) -> bool,
    {
        let dir = join_segments(base, segments);
        let found = fs::read_dir(&dir).ok().and_then(|entries| {
            entries
                .flatten()
                .filter(|e| e.path().is_dir())
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|name| predicate(name.as_str()))
                .min_by(|a, b| i2c_compare(a.as_str(), b.as_str()))
        });
        self.trace_read(depth, &dir, found.as_deref());
        found
    }

    /// Whether any immediate subdirectory satisfies `predicate`
    pub fn has_subdir<P>(&self, depth: Depth, base: &Path, segments: &[&str], predicate: P) -> bool
    where
        P: Fn(&str) -> bool,
    {
        self.find_single_subdir(depth, base, segments, predicate).is_some()
    }

    /// Drain the report lines collected so far
    pub fn take_trace(&self) -> Vec<String> {
        std::mem::take(&mut *self.trace.borrow_mut())
    }

    /// Path as the kernel would name it, with the root stripped
    pub fn kernel_path(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(rel) => Path::new("/").join(rel),
            Err(_) => path.to_path_buf(),
        }
    }

    fn trace_read(&self, depth: Depth, path: &Path, value: Option<&str>) {
        let shown_path = self.kernel_path(path).display().to_string();
        debug!(path = %shown_path, value = value.unwrap_or("<absent>"), "sysfs read");
        if depth >= 0 {
            let indent = depth as usize * INDENT_WIDTH;
            self.trace.borrow_mut().push(format!(
                "{:indent$}{:<width$} {}",
                "",
                shown_path,
                value.unwrap_or("(not found)"),
                indent = indent,
                width = TRACE_PATH_WIDTH,
            ));
        }
    }
}

fn join_segments(base: &Path, segments: &[&str]) -> PathBuf {
    segments.iter().fold(base.to_path_buf(), |path, seg| path.join(seg))
}

pub(crate) fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

/// Last path component as an owned string
pub fn basename(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
