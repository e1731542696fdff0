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

//! odroidc-lights - Lights HAL shim for Odroid-C boards
//!
//! This library maps the host service's symbolic light identifiers onto the
//! board's pwm-ctrl sysfs interface: the PWM kernel modules are loaded and
//! the controller configured once at first open, and each backlight request
//! translates a packed color into a duty-cycle write.

pub mod light;
pub mod pwm;
pub mod kmod;
pub mod config;
pub mod hal;
pub mod logger;

#[cfg(test)]
pub mod test_utils;
