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

//! Optional JSON-lines event log enabled with `--logging`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serde_json::{json, Value};

use crate::constants::paths::FALLBACK_EVENT_LOG;

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Open the event log at `path`, or the /tmp fallback when it is unset or unwritable
pub fn init_logging(path: Option<&Path>) {
    let file = path
        .and_then(open_append)
        .or_else(|| open_append(Path::new(FALLBACK_EVENT_LOG)));
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = file;
    }
}

pub fn log_event(event: &str, data: Value) {
    let line = json!({
        "ts_ms": now_millis(),
        "event": event,
        "data": data,
    })
    .to_string();

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(f) = guard.as_mut() {
            let _ = writeln!(f, "{}", line);
            return;
        }
    }
    // not initialized
    if let Some(mut f) = open_append(Path::new(FALLBACK_EVENT_LOG)) {
        let _ = writeln!(f, "{}", line);
    }
}
