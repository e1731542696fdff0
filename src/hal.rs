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

use std::fmt;
use std::sync::{Arc, Mutex, Once, PoisonError};

use serde_json::json;
use thiserror::Error;

use crate::config::BoardProfile;
use crate::kmod::{KmodError, ModuleLoader, SysLoader};
use crate::light::{LightId, LightState};
use crate::logger;
use crate::pwm::{duty_from_intensity, PwmError};

/// 'HWMT' / 'HWDT', the tag words the host loader checks before trusting
/// a descriptor or device record.
pub const HARDWARE_MODULE_TAG: u32 = 0x4857_4d54;
pub const HARDWARE_DEVICE_TAG: u32 = 0x4857_4454;

pub const LIGHTS_MODULE_ID: &str = "lights";

/// Module descriptor the host loader discovers by its well-known symbol
/// name and matches against [`LIGHTS_MODULE_ID`].
#[derive(Debug)]
pub struct ModuleInfo {
    pub tag: u32,
    pub version_major: u16,
    pub version_minor: u16,
    pub id: &'static str,
    pub name: &'static str,
    pub author: &'static str,
}

#[no_mangle]
pub static HAL_MODULE_INFO_SYM: ModuleInfo = ModuleInfo {
    tag: HARDWARE_MODULE_TAG,
    version_major: 1,
    version_minor: 0,
    id: LIGHTS_MODULE_ID,
    name: "Odroid-C lights module",
    author: "odroidc-lights contributors",
};

#[derive(Error, Debug)]
pub enum LightsError {
    #[error("unknown light id: {0:?}")]
    UnknownLight(String),
    #[error(transparent)]
    Pwm(#[from] PwmError),
    #[error(transparent)]
    Kmod(#[from] KmodError),
}

impl LightsError {
    /// Negative errno per the host ABI convention; 0 is success.
    pub fn errno(&self) -> i32 {
        match self {
            LightsError::UnknownLight(_) => -libc::EINVAL,
            LightsError::Pwm(PwmError::Write { source, .. }) => {
                -source.raw_os_error().unwrap_or(libc::EIO)
            }
            LightsError::Kmod(KmodError::Load { source, .. })
            | LightsError::Kmod(KmodError::Unload { source, .. }) => {
                -source.raw_os_error().unwrap_or(libc::EIO)
            }
            LightsError::Kmod(KmodError::BadName(_)) => -libc::EINVAL,
        }
    }
}

/// The lights context: board profile, module loader, the run-once
/// bring-up gate and the duty-cycle lock. The host creates exactly one
/// at module load and passes it by reference to every open.
pub struct Lights {
    profile: BoardProfile,
    loader: Arc<dyn ModuleLoader>,
    init: Once,
    duty_lock: Mutex<()>,
}

impl Lights {
    pub fn new(profile: BoardProfile) -> Lights {
        Lights::with_loader(profile, Arc::new(SysLoader))
    }

    /// Constructor with a caller-supplied module loader; the seam tests
    /// use to bring the board up without touching the kernel.
    pub fn with_loader(profile: BoardProfile, loader: Arc<dyn ModuleLoader>) -> Lights {
        Lights {
            profile,
            loader,
            init: Once::new(),
            duty_lock: Mutex::new(()),
        }
    }

    pub fn profile(&self) -> &BoardProfile {
        &self.profile
    }

    /// Open one of the six fixed light identifiers. Unknown names fail
    /// with [`LightsError::UnknownLight`] before any other work happens.
    /// The first successful open (across all threads) runs board
    /// bring-up exactly once; its outcome is not surfaced here, matching
    /// the host contract that open only reports identifier problems.
    pub fn open(&self, name: &str) -> Result<LightDevice<'_>, LightsError> {
        let Some(id) = LightId::from_name(name) else {
            logger::log_event("open_rejected", json!({ "name": name }));
            return Err(LightsError::UnknownLight(name.to_string()));
        };
        self.init.call_once(|| self.init_board());
        logger::log_event("open", json!({ "light": id.name() }));
        Ok(LightDevice { ctx: self, id })
    }

    /// errno wrapper over [`Lights::open`] for hosts speaking the integer
    /// convention.
    pub fn open_raw(&self, name: &str) -> Result<LightDevice<'_>, i32> {
        self.open(name).map_err(|e| e.errno())
    }

    // One-shot board bring-up: both kernel modules in order, then PWM
    // frequency and enable. A module failure aborts the remaining steps
    // without rollback; the sysfs writes are best-effort like the vendor
    // init scripts.
    fn init_board(&self) {
        for m in &self.profile.modules {
            if let Err(e) = self.loader.load(&m.image) {
                logger::log_event(
                    "module_load_failed",
                    json!({
                        "image": m.image.display().to_string(),
                        "error": e.to_string(),
                    }),
                );
                return;
            }
        }
        let pwm = self.profile.pwm();
        if let Err(e) = pwm.set_frequency(self.profile.frequency_hz) {
            logger::log_event("init_freq_failed", json!({ "error": e.to_string() }));
        }
        if let Err(e) = pwm.set_enabled(true) {
            logger::log_event("init_enable_failed", json!({ "error": e.to_string() }));
        }
    }

    fn set_backlight(&self, state: &LightState) -> Result<(), LightsError> {
        let _guard = self
            .duty_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let duty = duty_from_intensity(state.color.intensity());
        self.profile.pwm().set_duty(duty)?;
        Ok(())
    }

    fn unload_modules(&self) -> Result<(), LightsError> {
        for m in &self.profile.modules {
            self.loader.unload(&m.name)?;
        }
        Ok(())
    }
}

/// An open light handle, bound to one light class of one context.
///
/// Dropping the handle without [`LightDevice::close`] leaves the kernel
/// modules loaded, which is what a host that never closes gets anyway.
pub struct LightDevice<'a> {
    ctx: &'a Lights,
    id: LightId,
}

impl fmt::Debug for LightDevice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightDevice").field("id", &self.id).finish()
    }
}

impl LightDevice<'_> {
    pub fn id(&self) -> LightId {
        self.id
    }

    pub const fn tag(&self) -> u32 {
        HARDWARE_DEVICE_TAG
    }

    pub fn module(&self) -> &'static ModuleInfo {
        &HAL_MODULE_INFO_SYM
    }

    /// Apply a light state. The backlight drives the PWM duty cycle under
    /// the context lock, so concurrent host notification threads never
    /// interleave their writes. The other five classes are not wired to
    /// hardware on this board: they report success and touch nothing.
    pub fn set(&self, state: &LightState) -> Result<(), LightsError> {
        match self.id {
            LightId::Backlight => self.ctx.set_backlight(state),
            LightId::Keyboard
            | LightId::Buttons
            | LightId::Battery
            | LightId::Notifications
            | LightId::Attention => Ok(()),
        }
    }

    /// errno wrapper over [`LightDevice::set`].
    pub fn set_raw(&self, state: &LightState) -> i32 {
        match self.set(state) {
            Ok(()) => 0,
            Err(e) => e.errno(),
        }
    }

    /// Release the handle and unload the board's kernel modules in order,
    /// reporting the first failure. Consuming self means cleanup errors
    /// can only surface after the last use of the device.
    pub fn close(self) -> Result<(), LightsError> {
        let result = self.ctx.unload_modules();
        logger::log_event(
            "close",
            json!({
                "light": self.id.name(),
                "ok": result.is_ok(),
            }),
        );
        result
    }
}
