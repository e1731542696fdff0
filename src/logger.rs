/*
 * This file is part of odroidc-lights.
 *
 * Copyright (C) 2025 odroidc-lights contributors
 *
 * odroidc-lights is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * odroidc-lights is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with odroidc-lights. If not, see <https://www.gnu.org/licenses/>.
 */

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serde_json::{json, Value};

const LOG_TAG: &str = "lights.odroidc";
const DEFAULT_LOG_PATH: &str = "/etc/odroidc-lights/logs.json";
const FALLBACK_LOG_PATH: &str = "/tmp/odroidc_lights_logs.json";

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn open_append(path: &str) -> Option<File> {
    if let Some(parent) = Path::new(path).parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Opens the JSON-lines event log. The shim runs inside a host process
/// whose /etc may be read-only, so /tmp is the quiet fallback.
pub fn init_logging() {
    let file = open_append(DEFAULT_LOG_PATH).or_else(|| open_append(FALLBACK_LOG_PATH));
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = file;
    }
}

/// Appends one timestamped event. A no-op until init_logging has run;
/// an uninitialized logger must not touch the filesystem.
pub fn log_event(event: &str, data: Value) {
    let Ok(mut guard) = LOG_FILE.lock() else {
        return;
    };
    let Some(f) = guard.as_mut() else {
        return;
    };
    let line = json!({
        "ts_ms": now_millis(),
        "tag": LOG_TAG,
        "event": event,
        "data": data,
    })
    .to_string();
    let _ = writeln!(f, "{}", line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_without_init_is_silent() {
        // Must not panic or create files as a side effect.
        log_event("noop", json!({ "k": "v" }));
    }

    #[test]
    fn test_open_append_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sub").join("logs.json");
        let path_str = path.to_string_lossy().into_owned();
        assert!(open_append(&path_str).is_some());
        assert!(path.exists());
    }
}
