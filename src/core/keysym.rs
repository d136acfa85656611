// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/keysym.rs
//!
//! X11/XKB keysym values and name lookup
//!
//! Bindings name their keys the way XKB does (`Return`, `Super_L`, `q`,
//! `XF86AudioMute`). This module owns the numeric keysym space and the
//! name table used to resolve those names, in both the exact and the
//! case-insensitive flavour XKB offers.

use serde::Serialize;
#[cfg(not(feature = "xkb"))]
use std::collections::HashMap;
use std::fmt;
#[cfg(not(feature = "xkb"))]
use std::sync::OnceLock;

/// A keysym value as defined by `xkbcommon-keysyms.h`
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Keysym(pub u32);

/// How [`Keysym::from_name`] treats letter case
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameCase {
    /// `a` and `A` are different keysyms
    Exact,
    /// Ignore case, preferring the lowercase keysym when both exist
    Insensitive,
}

impl Keysym {
    pub const NO_SYMBOL: Keysym = Keysym(0);

    pub const SPACE: Keysym = Keysym(0x0020);
    pub const BACKSPACE: Keysym = Keysym(0xff08);
    pub const TAB: Keysym = Keysym(0xff09);
    pub const RETURN: Keysym = Keysym(0xff0d);
    pub const PAUSE: Keysym = Keysym(0xff13);
    pub const SCROLL_LOCK: Keysym = Keysym(0xff14);
    pub const ESCAPE: Keysym = Keysym(0xff1b);
    pub const HOME: Keysym = Keysym(0xff50);
    pub const LEFT: Keysym = Keysym(0xff51);
    pub const UP: Keysym = Keysym(0xff52);
    pub const RIGHT: Keysym = Keysym(0xff53);
    pub const DOWN: Keysym = Keysym(0xff54);
    pub const PAGE_UP: Keysym = Keysym(0xff55);
    pub const PAGE_DOWN: Keysym = Keysym(0xff56);
    pub const END: Keysym = Keysym(0xff57);
    pub const PRINT: Keysym = Keysym(0xff61);
    pub const INSERT: Keysym = Keysym(0xff63);
    pub const MENU: Keysym = Keysym(0xff67);
    pub const NUM_LOCK: Keysym = Keysym(0xff7f);
    pub const F1: Keysym = Keysym(0xffbe);
    pub const SHIFT_L: Keysym = Keysym(0xffe1);
    pub const SHIFT_R: Keysym = Keysym(0xffe2);
    pub const CONTROL_L: Keysym = Keysym(0xffe3);
    pub const CONTROL_R: Keysym = Keysym(0xffe4);
    pub const CAPS_LOCK: Keysym = Keysym(0xffe5);
    pub const ALT_L: Keysym = Keysym(0xffe9);
    pub const ALT_R: Keysym = Keysym(0xffea);
    pub const SUPER_L: Keysym = Keysym(0xffeb);
    pub const SUPER_R: Keysym = Keysym(0xffec);
    pub const DELETE: Keysym = Keysym(0xffff);
    pub const XF86_SWITCH_VT_1: Keysym = Keysym(0x1008_fe01);
    pub const XF86_SWITCH_VT_12: Keysym = Keysym(0x1008_fe0c);

    /// Resolves an XKB keysym name.
    ///
    /// Accepts keysym names (`Return`, `Super_L`), single alphanumeric
    /// characters (`q`, `7`) and hexadecimal literals (`0xff0d`).
    /// Returns [`Keysym::NO_SYMBOL`] when the name is unknown. With the
    /// `xkb` feature the lookup goes through libxkbcommon and knows every
    /// keysym it does.
    pub fn from_name(name: &str, case: NameCase) -> Keysym {
        if name.is_empty() {
            return Keysym::NO_SYMBOL;
        }

        lookup_name(name, case)
    }

    /// Returns the canonical name of this keysym, if it has one
    pub fn name(self) -> Option<String> {
        if self.is_alphanumeric() {
            return char::from_u32(self.0).map(String::from);
        }

        NAMES
            .iter()
            .find(|(_, value)| *value == self.0)
            .map(|(name, _)| (*name).to_string())
            .or_else(|| xkb_names::name(self))
    }

    /// Uppercase counterpart for Latin-1 letters, identity otherwise
    pub fn to_upper(self) -> Keysym {
        match self.0 {
            0x61..=0x7a => Keysym(self.0 - 0x20),
            0xe0..=0xfe if self.0 != 0xf7 => Keysym(self.0 - 0x20),
            _ => self,
        }
    }

    pub fn is_no_symbol(self) -> bool {
        self == Keysym::NO_SYMBOL
    }

    /// VT number for the `XF86Switch_VT_N` range
    pub fn switch_vt_target(self) -> Option<u32> {
        if (Self::XF86_SWITCH_VT_1.0..=Self::XF86_SWITCH_VT_12.0).contains(&self.0) {
            Some(self.0 - Self::XF86_SWITCH_VT_1.0 + 1)
        } else {
            None
        }
    }

    fn is_alphanumeric(self) -> bool {
        matches!(self.0, 0x30..=0x39 | 0x41..=0x5a | 0x61..=0x7a)
    }
}

impl fmt::Display for Keysym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "0x{:x}", self.0),
        }
    }
}

#[cfg(not(feature = "xkb"))]
fn lookup_name(name: &str, case: NameCase) -> Keysym {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            let c = match case {
                NameCase::Exact => c,
                NameCase::Insensitive => c.to_ascii_lowercase(),
            };
            return Keysym(c as u32);
        }
    }

    if let Some(hex) = name.strip_prefix("0x") {
        return u32::from_str_radix(hex, 16).map(Keysym).unwrap_or_default();
    }

    let found = match case {
        NameCase::Exact => exact_names().get(name).copied(),
        NameCase::Insensitive => folded_names().get(name.to_lowercase().as_str()).copied(),
    };

    found.unwrap_or_default()
}

#[cfg(feature = "xkb")]
fn lookup_name(name: &str, case: NameCase) -> Keysym {
    xkb_names::from_name(name, case)
}

/// libxkbcommon's own keysym name table
#[cfg(feature = "xkb")]
mod xkb_names {
    use super::{Keysym, NameCase};
    use xkbcommon::xkb;

    pub(super) fn from_name(name: &str, case: NameCase) -> Keysym {
        let flags = match case {
            NameCase::Exact => xkb::KEYSYM_NO_FLAGS,
            NameCase::Insensitive => xkb::KEYSYM_CASE_INSENSITIVE,
        };

        Keysym(xkb::keysym_from_name(name, flags).raw())
    }

    /// Unnamed keysyms come back as a hex literal or empty
    pub(super) fn name(sym: Keysym) -> Option<String> {
        let name = xkb::keysym_get_name(xkb::Keysym::new(sym.0));
        if name.is_empty() || name.starts_with("0x") {
            None
        } else {
            Some(name)
        }
    }
}

#[cfg(not(feature = "xkb"))]
mod xkb_names {
    use super::Keysym;

    pub(super) fn name(_sym: Keysym) -> Option<String> {
        None
    }
}

#[cfg(not(feature = "xkb"))]
fn exact_names() -> &'static HashMap<&'static str, Keysym> {
    static EXACT: OnceLock<HashMap<&'static str, Keysym>> = OnceLock::new();
    EXACT.get_or_init(|| NAMES.iter().map(|(name, value)| (*name, Keysym(*value))).collect())
}

#[cfg(not(feature = "xkb"))]
fn folded_names() -> &'static HashMap<String, Keysym> {
    static FOLDED: OnceLock<HashMap<String, Keysym>> = OnceLock::new();
    FOLDED.get_or_init(|| {
        let mut map = HashMap::new();
        for (name, value) in NAMES {
            let lowered = name.to_lowercase();
            // Lowercase spelling wins on collisions (Aacute vs aacute)
            if map.contains_key(&lowered) && *name != lowered {
                continue;
            }
            map.insert(lowered, Keysym(*value));
        }
        map
    })
}

/// Named keysyms. Single letters and digits are handled in `from_name`.
static NAMES: &[(&str, u32)] = &[
    ("space", 0x0020),
    ("exclam", 0x0021),
    ("quotedbl", 0x0022),
    ("numbersign", 0x0023),
    ("dollar", 0x0024),
    ("percent", 0x0025),
    ("ampersand", 0x0026),
    ("apostrophe", 0x0027),
    ("parenleft", 0x0028),
    ("parenright", 0x0029),
    ("asterisk", 0x002a),
    ("plus", 0x002b),
    ("comma", 0x002c),
    ("minus", 0x002d),
    ("period", 0x002e),
    ("slash", 0x002f),
    ("colon", 0x003a),
    ("semicolon", 0x003b),
    ("less", 0x003c),
    ("equal", 0x003d),
    ("greater", 0x003e),
    ("question", 0x003f),
    ("at", 0x0040),
    ("bracketleft", 0x005b),
    ("backslash", 0x005c),
    ("bracketright", 0x005d),
    ("asciicircum", 0x005e),
    ("underscore", 0x005f),
    ("grave", 0x0060),
    ("braceleft", 0x007b),
    ("bar", 0x007c),
    ("braceright", 0x007d),
    ("asciitilde", 0x007e),
    ("Agrave", 0x00c0),
    ("Aacute", 0x00c1),
    ("Adiaeresis", 0x00c4),
    ("Odiaeresis", 0x00d6),
    ("Udiaeresis", 0x00dc),
    ("ssharp", 0x00df),
    ("agrave", 0x00e0),
    ("aacute", 0x00e1),
    ("adiaeresis", 0x00e4),
    ("odiaeresis", 0x00f6),
    ("udiaeresis", 0x00fc),
    ("ISO_Level3_Shift", 0xfe03),
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Return", 0xff0d),
    ("Pause", 0xff13),
    ("Scroll_Lock", 0xff14),
    ("Escape", 0xff1b),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Prior", 0xff55),
    ("Page_Up", 0xff55),
    ("Next", 0xff56),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Print", 0xff61),
    ("Insert", 0xff63),
    ("Menu", 0xff67),
    ("Num_Lock", 0xff7f),
    ("KP_Enter", 0xff8d),
    ("KP_Home", 0xff95),
    ("KP_Left", 0xff96),
    ("KP_Up", 0xff97),
    ("KP_Right", 0xff98),
    ("KP_Down", 0xff99),
    ("KP_Prior", 0xff9a),
    ("KP_Next", 0xff9b),
    ("KP_End", 0xff9c),
    ("KP_Begin", 0xff9d),
    ("KP_Insert", 0xff9e),
    ("KP_Delete", 0xff9f),
    ("KP_Multiply", 0xffaa),
    ("KP_Add", 0xffab),
    ("KP_Subtract", 0xffad),
    ("KP_Decimal", 0xffae),
    ("KP_Divide", 0xffaf),
    ("KP_0", 0xffb0),
    ("KP_1", 0xffb1),
    ("KP_2", 0xffb2),
    ("KP_3", 0xffb3),
    ("KP_4", 0xffb4),
    ("KP_5", 0xffb5),
    ("KP_6", 0xffb6),
    ("KP_7", 0xffb7),
    ("KP_8", 0xffb8),
    ("KP_9", 0xffb9),
    ("F1", 0xffbe),
    ("F2", 0xffbf),
    ("F3", 0xffc0),
    ("F4", 0xffc1),
    ("F5", 0xffc2),
    ("F6", 0xffc3),
    ("F7", 0xffc4),
    ("F8", 0xffc5),
    ("F9", 0xffc6),
    ("F10", 0xffc7),
    ("F11", 0xffc8),
    ("F12", 0xffc9),
    ("F13", 0xffca),
    ("F14", 0xffcb),
    ("F15", 0xffcc),
    ("F16", 0xffcd),
    ("F17", 0xffce),
    ("F18", 0xffcf),
    ("F19", 0xffd0),
    ("F20", 0xffd1),
    ("F21", 0xffd2),
    ("F22", 0xffd3),
    ("F23", 0xffd4),
    ("F24", 0xffd5),
    ("Shift_L", 0xffe1),
    ("Shift_R", 0xffe2),
    ("Control_L", 0xffe3),
    ("Control_R", 0xffe4),
    ("Caps_Lock", 0xffe5),
    ("Shift_Lock", 0xffe6),
    ("Meta_L", 0xffe7),
    ("Meta_R", 0xffe8),
    ("Alt_L", 0xffe9),
    ("Alt_R", 0xffea),
    ("Super_L", 0xffeb),
    ("Super_R", 0xffec),
    ("Hyper_L", 0xffed),
    ("Hyper_R", 0xffee),
    ("Delete", 0xffff),
    ("XF86MonBrightnessUp", 0x1008_ff02),
    ("XF86MonBrightnessDown", 0x1008_ff03),
    ("XF86AudioLowerVolume", 0x1008_ff11),
    ("XF86AudioMute", 0x1008_ff12),
    ("XF86AudioRaiseVolume", 0x1008_ff13),
    ("XF86AudioPlay", 0x1008_ff14),
    ("XF86AudioStop", 0x1008_ff15),
    ("XF86AudioPrev", 0x1008_ff16),
    ("XF86AudioNext", 0x1008_ff17),
    ("XF86AudioPause", 0x1008_ff31),
    ("XF86AudioMicMute", 0x1008_ffb2),
    ("XF86Switch_VT_1", 0x1008_fe01),
    ("XF86Switch_VT_2", 0x1008_fe02),
    ("XF86Switch_VT_3", 0x1008_fe03),
    ("XF86Switch_VT_4", 0x1008_fe04),
    ("XF86Switch_VT_5", 0x1008_fe05),
    ("XF86Switch_VT_6", 0x1008_fe06),
    ("XF86Switch_VT_7", 0x1008_fe07),
    ("XF86Switch_VT_8", 0x1008_fe08),
    ("XF86Switch_VT_9", 0x1008_fe09),
    ("XF86Switch_VT_10", 0x1008_fe0a),
    ("XF86Switch_VT_11", 0x1008_fe0b),
    ("XF86Switch_VT_12", 0x1008_fe0c),
];
