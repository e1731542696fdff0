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

use serde::{Deserialize, Serialize};

/// The light classes the host service can ask for by name.
///
/// Only the backlight is wired to hardware on this board; the remaining
/// classes open successfully but their setters are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightId {
    Backlight,
    Keyboard,
    Buttons,
    Battery,
    Notifications,
    Attention,
}

impl LightId {
    pub const ALL: [LightId; 6] = [
        LightId::Backlight,
        LightId::Keyboard,
        LightId::Buttons,
        LightId::Battery,
        LightId::Notifications,
        LightId::Attention,
    ];

    /// Resolve one of the fixed identifier strings the host passes to open.
    pub fn from_name(name: &str) -> Option<LightId> {
        match name {
            "backlight" => Some(LightId::Backlight),
            "keyboard" => Some(LightId::Keyboard),
            "buttons" => Some(LightId::Buttons),
            "battery" => Some(LightId::Battery),
            "notifications" => Some(LightId::Notifications),
            "attention" => Some(LightId::Attention),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LightId::Backlight => "backlight",
            LightId::Keyboard => "keyboard",
            LightId::Buttons => "buttons",
            LightId::Battery => "battery",
            LightId::Notifications => "notifications",
            LightId::Attention => "attention",
        }
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A color decoded from the host's packed 0xAARRGGBB word.
///
/// The backlight path only consumes the low byte; the full decode keeps the
/// channel layout explicit instead of shifting bits at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub fn from_packed(argb: u32) -> Color {
        Color {
            alpha: (argb >> 24) as u8,
            red: (argb >> 16) as u8,
            green: (argb >> 8) as u8,
            blue: argb as u8,
        }
    }

    pub fn to_packed(self) -> u32 {
        (u32::from(self.alpha) << 24)
            | (u32::from(self.red) << 16)
            | (u32::from(self.green) << 8)
            | u32::from(self.blue)
    }

    /// Backlight level. The host encodes intensity in the low byte.
    pub fn intensity(self) -> u8 {
        self.blue
    }

    /// Any of the low 24 bits set means the light should be on.
    pub fn is_lit(self) -> bool {
        self.to_packed() & 0x00ff_ffff != 0
    }
}

/// Flash behavior requested by the host. This board has no flash-capable
/// light, so the values are carried but never acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlashMode {
    #[default]
    None,
    Timed {
        on_ms: u32,
        off_ms: u32,
    },
    Hardware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrightnessMode {
    #[default]
    User,
    Sensor,
}

/// Per-request light state as the host hands it over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightState {
    pub color: Color,
    pub flash: FlashMode,
    pub brightness_mode: BrightnessMode,
}

impl LightState {
    /// State carrying only a packed color, the common case for backlight
    /// notifications.
    pub fn with_color(argb: u32) -> LightState {
        LightState {
            color: Color::from_packed(argb),
            ..LightState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_known_ids() {
        assert_eq!(LightId::from_name("backlight"), Some(LightId::Backlight));
        assert_eq!(LightId::from_name("keyboard"), Some(LightId::Keyboard));
        assert_eq!(LightId::from_name("buttons"), Some(LightId::Buttons));
        assert_eq!(LightId::from_name("battery"), Some(LightId::Battery));
        assert_eq!(LightId::from_name("notifications"), Some(LightId::Notifications));
        assert_eq!(LightId::from_name("attention"), Some(LightId::Attention));
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(LightId::from_name(""), None);
        assert_eq!(LightId::from_name("Backlight"), None);
        assert_eq!(LightId::from_name("backlight "), None);
        assert_eq!(LightId::from_name("flashlight"), None);
    }

    #[test]
    fn test_name_round_trip() {
        for id in LightId::ALL {
            assert_eq!(LightId::from_name(id.name()), Some(id));
        }
    }

    #[test]
    fn test_color_decode() {
        let c = Color::from_packed(0x80ff_7f01);
        assert_eq!(c.alpha, 0x80);
        assert_eq!(c.red, 0xff);
        assert_eq!(c.green, 0x7f);
        assert_eq!(c.blue, 0x01);
        assert_eq!(c.to_packed(), 0x80ff_7f01);
    }

    #[test]
    fn test_color_intensity_is_low_byte() {
        assert_eq!(Color::from_packed(0x0000_0000).intensity(), 0);
        assert_eq!(Color::from_packed(0x0000_0001).intensity(), 1);
        assert_eq!(Color::from_packed(0x0000_00ff).intensity(), 255);
        assert_eq!(Color::from_packed(0xffff_ff42).intensity(), 0x42);
    }

    #[test]
    fn test_is_lit_ignores_alpha() {
        assert!(!Color::from_packed(0x0000_0000).is_lit());
        assert!(!Color::from_packed(0xff00_0000).is_lit());
        assert!(Color::from_packed(0x0000_0001).is_lit());
        assert!(Color::from_packed(0x00ff_0000).is_lit());
    }

    #[test]
    fn test_state_with_color() {
        let st = LightState::with_color(0x0000_00ff);
        assert_eq!(st.color.intensity(), 255);
        assert_eq!(st.flash, FlashMode::None);
        assert_eq!(st.brightness_mode, BrightnessMode::User);
    }
}
