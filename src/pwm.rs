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
use std::io;
use std::path::{Path, PathBuf};

use serde_json::json;
use thiserror::Error;

use crate::logger;

#[derive(Error, Debug)]
pub enum PwmError {
    #[error("write {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
}

/// The pwm-ctrl sysfs interface: one control file each for duty cycle,
/// enable flag, and frequency.
#[derive(Debug, Clone)]
pub struct PwmCtrl {
    duty: PathBuf,
    enable: PathBuf,
    freq: PathBuf,
}

impl PwmCtrl {
    pub fn new<P: Into<PathBuf>>(duty: P, enable: P, freq: P) -> PwmCtrl {
        PwmCtrl {
            duty: duty.into(),
            enable: enable.into(),
            freq: freq.into(),
        }
    }

    pub fn duty_path(&self) -> &Path {
        &self.duty
    }

    pub fn set_duty(&self, value: u32) -> Result<(), PwmError> {
        write_decimal(&self.duty, value)?;
        logger::log_event(
            "duty_write",
            json!({
                "path": self.duty.display().to_string(),
                "duty": value,
            }),
        );
        Ok(())
    }

    pub fn set_enabled(&self, on: bool) -> Result<(), PwmError> {
        write_decimal(&self.enable, u32::from(on))
    }

    pub fn set_frequency(&self, hz: u32) -> Result<(), PwmError> {
        write_decimal(&self.freq, hz)
    }
}

// Single open/write/close per value; the driver latches the register on
// each complete write.
fn write_decimal(path: &Path, value: u32) -> Result<(), PwmError> {
    fs::write(path, format!("{}\n", value)).map_err(|source| PwmError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Map an 8-bit intensity onto the controller's duty range. The shift and
/// the +3 offset are calibration constants from the vendor driver for this
/// panel; 0 stays 0 so the backlight turns fully off.
pub fn duty_from_intensity(level: u8) -> u32 {
    let duty = u32::from(level) << 2;
    if duty > 0 {
        duty + 3
    } else {
        duty
    }
}
