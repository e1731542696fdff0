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

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pwm::PwmCtrl;

/// A kernel module the board needs before the PWM controller exists:
/// the image file to load and the live name to unload by.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KernelModule {
    pub image: PathBuf,
    pub name: String,
}

/// Everything board-specific in one record: sysfs control paths, the
/// module images to load at bring-up, and the PWM base frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardProfile {
    pub duty_path: PathBuf,
    pub enable_path: PathBuf,
    pub freq_path: PathBuf,
    #[serde(default)]
    pub modules: Vec<KernelModule>,
    #[serde(default = "default_frequency")]
    pub frequency_hz: u32,
}

fn default_frequency() -> u32 {
    1000
}

impl Default for BoardProfile {
    /// The Odroid-C values: pwm-ctrl on pin 33, driven by the Meson PWM
    /// modules shipped under /system/lib/modules.
    fn default() -> BoardProfile {
        BoardProfile {
            duty_path: PathBuf::from("/sys/devices/platform/pwm-ctrl/duty0"),
            enable_path: PathBuf::from("/sys/devices/platform/pwm-ctrl/enable0"),
            freq_path: PathBuf::from("/sys/devices/platform/pwm-ctrl/freq0"),
            modules: vec![
                KernelModule {
                    image: PathBuf::from("/system/lib/modules/pwm-meson.ko"),
                    name: "pwm-meson".to_string(),
                },
                KernelModule {
                    image: PathBuf::from("/system/lib/modules/pwm-ctrl.ko"),
                    name: "pwm-ctrl".to_string(),
                },
            ],
            frequency_hz: default_frequency(),
        }
    }
}

impl BoardProfile {
    pub fn pwm(&self) -> PwmCtrl {
        PwmCtrl::new(&self.duty_path, &self.enable_path, &self.freq_path)
    }
}

pub fn profile_path() -> PathBuf {
    PathBuf::from("/etc/odroidc-lights/board.json")
}

/// Best-effort profile load; any read or parse problem falls back to the
/// built-in board defaults.
pub fn load_profile() -> BoardProfile {
    load_profile_from(&profile_path()).unwrap_or_default()
}

fn load_profile_from(path: &Path) -> Option<BoardProfile> {
    let data = fs::read_to_string(path).ok()?;
    let profile: BoardProfile = serde_json::from_str(&data).ok()?;
    validate_profile(&profile).ok()?;
    Some(profile)
}

/// Strict variant for tooling that wants to know why a profile was
/// rejected rather than silently running on defaults.
pub fn try_load_profile(path: &Path) -> Result<BoardProfile, String> {
    let data = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let profile: BoardProfile =
        serde_json::from_str(&data).map_err(|e| format!("parse error: {}", e))?;
    validate_profile(&profile)?;
    Ok(profile)
}

/// Dump the active profile as pretty JSON, world-readable.
pub fn write_profile(profile: &BoardProfile, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(path, json)?;
    let perms = fs::Permissions::from_mode(0o644);
    let _ = fs::set_permissions(path, perms);
    Ok(())
}

pub fn validate_profile(profile: &BoardProfile) -> Result<(), String> {
    let paths = [
        ("duty_path", &profile.duty_path),
        ("enable_path", &profile.enable_path),
        ("freq_path", &profile.freq_path),
    ];
    for (field, path) in &paths {
        if path.as_os_str().is_empty() {
            return Err(format!("{} must not be empty", field));
        }
    }
    for (i, (_, a)) in paths.iter().enumerate() {
        for (_, b) in paths.iter().skip(i + 1) {
            if a == b {
                return Err(format!(
                    "control paths must be distinct, got {} twice",
                    a.display()
                ));
            }
        }
    }
    if profile.modules.is_empty() {
        return Err("at least one kernel module is required".to_string());
    }
    for (i, m) in profile.modules.iter().enumerate() {
        if m.image.as_os_str().is_empty() {
            return Err(format!("module #{} has an empty image path", i + 1));
        }
        if m.name.is_empty() || m.name.contains('\0') {
            return Err(format!("module #{} has an invalid name", i + 1));
        }
    }
    if profile.frequency_hz == 0 {
        return Err("frequency_hz must be nonzero".to_string());
    }
    Ok(())
}
