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

//! src/core/translator.rs
//!
//! Symbol translator: raw key code → keysym under a compiled layout
//!
//! Binding matching always looks keys up through an unmodified (level 1)
//! layout state, so `SUPER+SHIFT+Q` still sees `q`. The translator is
//! rebuilt whenever the layout options change.
//!
//! # Backends
//! - **Built-in** (always available): evdev tables for the `us` layout and
//!   its `dvorak` / `colemak` variants.
//! - **xkbcommon** (`xkb` feature): full keymap compilation, including
//!   keymap files.
//!
//! A failed rebuild falls back to the default layout and reports the
//! failure; the translator is never left without a usable keymap.

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};

use crate::core::keysym::Keysym;
use crate::core::types::{Keycode, EVDEV_OFFSET};

/// Keyboard layout options (`input:kb_*`)
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LayoutSpec {
    pub rules: String,
    pub model: String,
    pub layout: String,
    pub variant: String,
    pub options: String,
    /// Explicit keymap file; takes precedence over the rule names
    pub file: Option<PathBuf>,
}

impl LayoutSpec {
    pub fn describe(&self) -> String {
        format!(
            "rules: {}, model: {}, variant: {}, options: {}, layout: {}",
            self.rules, self.model, self.variant, self.options, self.layout
        )
    }
}

/// Errors from compiling a layout
#[derive(Debug, Error, PartialEq)]
pub enum TranslatorError {
    #[error("Invalid keyboard layout passed. ( {0} )")]
    LayoutRejected(String),

    #[error("Keymap file {0} could not be loaded")]
    KeymapFile(PathBuf),
}

enum Backend {
    Builtin(BuiltinKeymap),
    #[cfg(feature = "xkb")]
    Xkb(xkb_backend::XkbKeymap),
}

impl Backend {
    fn resolve(&self, keycode: Keycode) -> Keysym {
        match self {
            Backend::Builtin(map) => map.resolve(keycode),
            #[cfg(feature = "xkb")]
            Backend::Xkb(map) => map.resolve(keycode),
        }
    }

    fn keycode_range(&self) -> (Keycode, Keycode) {
        match self {
            Backend::Builtin(_) => (EVDEV_OFFSET, EVDEV_OFFSET + 255),
            #[cfg(feature = "xkb")]
            Backend::Xkb(map) => map.keycode_range(),
        }
    }
}

/// Shared layout translator used for binding lookups
pub struct SymbolTranslator {
    backend: Backend,
    spec: LayoutSpec,
}

impl SymbolTranslator {
    /// Creates a translator with the default layout
    pub fn new() -> Self {
        Self {
            backend: Backend::Builtin(BuiltinKeymap::us("")),
            spec: LayoutSpec::default(),
        }
    }

    /// Rebuilds the keymap from `spec`.
    ///
    /// On failure the default layout is installed and the error is
    /// returned so the caller can surface it; the translator stays usable.
    pub fn rebuild(&mut self, spec: &LayoutSpec) -> Result<(), TranslatorError> {
        match compile(spec) {
            Ok(backend) => {
                info!("Keyboard layout compiled ({})", spec.describe());
                self.backend = backend;
                self.spec = spec.clone();
                Ok(())
            }
            Err(e) => {
                error!(
                    "Keyboard layout {} with variant {} ({}) couldn't have been loaded: {}",
                    spec.layout,
                    spec.variant,
                    spec.describe(),
                    e
                );
                // Zeroed rules; if even that fails the previous state stays
                if let Ok(backend) = compile(&LayoutSpec::default()) {
                    self.backend = backend;
                    self.spec = LayoutSpec::default();
                }
                Err(e)
            }
        }
    }

    /// Keysym for `keycode` with no modifiers active
    pub fn resolve(&self, keycode: Keycode) -> Keysym {
        self.backend.resolve(keycode)
    }

    /// First key code producing `sym`, scanning the whole keymap
    pub fn keycode_for(&self, sym: Keysym) -> Option<Keycode> {
        if sym.is_no_symbol() {
            return None;
        }

        let (min, max) = self.backend.keycode_range();
        (min..=max).find(|code| self.resolve(*code) == sym)
    }

    pub fn spec(&self) -> &LayoutSpec {
        &self.spec
    }
}

impl Default for SymbolTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(feature = "xkb"))]
fn compile(spec: &LayoutSpec) -> Result<Backend, TranslatorError> {
    if let Some(path) = &spec.file {
        // Keymap text needs the xkbcommon compiler
        return Err(TranslatorError::KeymapFile(path.clone()));
    }

    let layout = if spec.layout.is_empty() { "us" } else { spec.layout.as_str() };
    if layout != "us" {
        return Err(TranslatorError::LayoutRejected(spec.describe()));
    }

    BuiltinKeymap::variant(&spec.variant)
        .map(Backend::Builtin)
        .ok_or_else(|| TranslatorError::LayoutRejected(spec.describe()))
}

#[cfg(feature = "xkb")]
fn compile(spec: &LayoutSpec) -> Result<Backend, TranslatorError> {
    xkb_backend::XkbKeymap::compile(spec).map(Backend::Xkb)
}

/// Table-driven level-1 keymap
struct BuiltinKeymap {
    syms: HashMap<Keycode, Keysym>,
}

impl BuiltinKeymap {
    fn variant(variant: &str) -> Option<Self> {
        match variant {
            "" | "basic" | "qwerty" => Some(Self::us("")),
            "dvorak" | "colemak" => Some(Self::us(variant)),
            _ => None,
        }
    }

    fn us(variant: &str) -> Self {
        let mut syms = HashMap::new();

        for (evdev, name) in COMMON_KEYS {
            syms.insert(evdev + EVDEV_OFFSET, *name);
        }

        let rows: [(&[u32], &str); 3] = match variant {
            "dvorak" => [
                (&ROW_TOP[..], "',.pyfgcrl/="),
                (&ROW_HOME[..], "aoeuidhtns-"),
                (&ROW_BOTTOM[..], ";qjkxbmwvz"),
            ],
            "colemak" => [
                (&ROW_TOP[..], "qwfpgjluy;[]"),
                (&ROW_HOME[..], "arstdhneio'"),
                (&ROW_BOTTOM[..], "zxcvbkm,./"),
            ],
            _ => [
                (&ROW_TOP[..], "qwertyuiop[]"),
                (&ROW_HOME[..], "asdfghjkl;'"),
                (&ROW_BOTTOM[..], "zxcvbnm,./"),
            ],
        };

        for (codes, chars) in rows {
            for (evdev, c) in codes.iter().zip(chars.chars()) {
                syms.insert(evdev + EVDEV_OFFSET, Keysym(c as u32));
            }
        }

        if variant == "dvorak" {
            // Dvorak moves -/= next to the home row and puts brackets on the number row
            syms.insert(12 + EVDEV_OFFSET, Keysym('[' as u32));
            syms.insert(13 + EVDEV_OFFSET, Keysym(']' as u32));
        }

        Self { syms }
    }

    fn resolve(&self, keycode: Keycode) -> Keysym {
        self.syms.get(&keycode).copied().unwrap_or_default()
    }
}

const ROW_TOP: [u32; 12] = [16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27];
const ROW_HOME: [u32; 11] = [30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40];
const ROW_BOTTOM: [u32; 10] = [44, 45, 46, 47, 48, 49, 50, 51, 52, 53];

/// Layout-independent keys, keyed by evdev code
static COMMON_KEYS: &[(u32, Keysym)] = &[
    (1, Keysym::ESCAPE),
    (2, Keysym(0x31)),
    (3, Keysym(0x32)),
    (4, Keysym(0x33)),
    (5, Keysym(0x34)),
    (6, Keysym(0x35)),
    (7, Keysym(0x36)),
    (8, Keysym(0x37)),
    (9, Keysym(0x38)),
    (10, Keysym(0x39)),
    (11, Keysym(0x30)),
    (12, Keysym(0x2d)),
    (13, Keysym(0x3d)),
    (14, Keysym::BACKSPACE),
    (15, Keysym::TAB),
    (28, Keysym::RETURN),
    (29, Keysym::CONTROL_L),
    (41, Keysym(0x60)),
    (42, Keysym::SHIFT_L),
    (43, Keysym(0x5c)),
    (54, Keysym::SHIFT_R),
    (55, Keysym(0xffaa)),
    (56, Keysym::ALT_L),
    (57, Keysym::SPACE),
    (58, Keysym::CAPS_LOCK),
    (59, Keysym(0xffbe)),
    (60, Keysym(0xffbf)),
    (61, Keysym(0xffc0)),
    (62, Keysym(0xffc1)),
    (63, Keysym(0xffc2)),
    (64, Keysym(0xffc3)),
    (65, Keysym(0xffc4)),
    (66, Keysym(0xffc5)),
    (67, Keysym(0xffc6)),
    (68, Keysym(0xffc7)),
    (69, Keysym::NUM_LOCK),
    (70, Keysym::SCROLL_LOCK),
    (71, Keysym(0xff95)),
    (72, Keysym(0xff97)),
    (73, Keysym(0xff9a)),
    (74, Keysym(0xffad)),
    (75, Keysym(0xff96)),
    (76, Keysym(0xff9d)),
    (77, Keysym(0xff98)),
    (78, Keysym(0xffab)),
    (79, Keysym(0xff9c)),
    (80, Keysym(0xff99)),
    (81, Keysym(0xff9b)),
    (82, Keysym(0xff9e)),
    (83, Keysym(0xff9f)),
    (86, Keysym(0x3c)),
    (87, Keysym(0xffc8)),
    (88, Keysym(0xffc9)),
    (96, Keysym(0xff8d)),
    (97, Keysym::CONTROL_R),
    (98, Keysym(0xffaf)),
    (99, Keysym::PRINT),
    (100, Keysym::ALT_R),
    (102, Keysym::HOME),
    (103, Keysym::UP),
    (104, Keysym::PAGE_UP),
    (105, Keysym::LEFT),
    (106, Keysym::RIGHT),
    (107, Keysym::END),
    (108, Keysym::DOWN),
    (109, Keysym::PAGE_DOWN),
    (110, Keysym::INSERT),
    (111, Keysym::DELETE),
    (113, Keysym(0x1008_ff12)),
    (114, Keysym(0x1008_ff11)),
    (115, Keysym(0x1008_ff13)),
    (119, Keysym::PAUSE),
    (125, Keysym::SUPER_L),
    (126, Keysym::SUPER_R),
    (127, Keysym::MENU),
    (163, Keysym(0x1008_ff17)),
    (164, Keysym(0x1008_ff14)),
    (165, Keysym(0x1008_ff16)),
    (166, Keysym(0x1008_ff15)),
    (224, Keysym(0x1008_ff03)),
    (225, Keysym(0x1008_ff02)),
];

#[cfg(feature = "xkb")]
mod xkb_backend {
    use std::fs::File;
    use xkbcommon::xkb;

    use super::{LayoutSpec, TranslatorError};
    use crate::core::keysym::Keysym;
    use crate::core::types::Keycode;

    pub(super) struct XkbKeymap {
        keymap: xkb::Keymap,
        state: xkb::State,
    }

    impl XkbKeymap {
        pub(super) fn compile(spec: &LayoutSpec) -> Result<Self, TranslatorError> {
            let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);

            let keymap = match &spec.file {
                Some(path) => {
                    let mut file =
                        File::open(path).map_err(|_| TranslatorError::KeymapFile(path.clone()))?;
                    xkb::Keymap::new_from_file(
                        &context,
                        &mut file,
                        xkb::KEYMAP_FORMAT_TEXT_V1,
                        xkb::KEYMAP_COMPILE_NO_FLAGS,
                    )
                    .ok_or_else(|| TranslatorError::KeymapFile(path.clone()))?
                }
                None => xkb::Keymap::new_from_names(
                    &context,
                    &spec.rules,
                    &spec.model,
                    &spec.layout,
                    &spec.variant,
                    Some(spec.options.clone()),
                    xkb::KEYMAP_COMPILE_NO_FLAGS,
                )
                .ok_or_else(|| TranslatorError::LayoutRejected(spec.describe()))?,
            };

            let state = xkb::State::new(&keymap);
            Ok(Self { keymap, state })
        }

        pub(super) fn resolve(&self, keycode: Keycode) -> Keysym {
            Keysym(self.state.key_get_one_sym(keycode.into()).raw())
        }

        pub(super) fn keycode_range(&self) -> (Keycode, Keycode) {
            (self.keymap.min_keycode().raw(), self.keymap.max_keycode().raw())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_us_qwerty() {
        let translator = SymbolTranslator::new();
        assert_eq!(translator.resolve(16 + EVDEV_OFFSET), Keysym('q' as u32));
        assert_eq!(translator.resolve(2 + EVDEV_OFFSET), Keysym('1' as u32));
        assert_eq!(translator.resolve(125 + EVDEV_OFFSET), Keysym::SUPER_L);
        assert!(translator.resolve(0).is_no_symbol());
    }

    #[test]
    fn test_keycode_reverse_lookup() {
        let translator = SymbolTranslator::new();
        assert_eq!(translator.keycode_for(Keysym::RETURN), Some(28 + EVDEV_OFFSET));
        assert_eq!(translator.keycode_for(Keysym::NO_SYMBOL), None);
    }

    #[cfg(not(feature = "xkb"))]
    #[test]
    fn test_dvorak_variant() {
        let mut translator = SymbolTranslator::new();
        let spec = LayoutSpec {
            layout: "us".into(),
            variant: "dvorak".into(),
            ..Default::default()
        };
        assert!(translator.rebuild(&spec).is_ok());
        assert_eq!(translator.resolve(16 + EVDEV_OFFSET), Keysym('\'' as u32));
        assert_eq!(translator.resolve(31 + EVDEV_OFFSET), Keysym('o' as u32));
    }

    #[cfg(not(feature = "xkb"))]
    #[test]
    fn test_rejected_layout_falls_back_to_default() {
        let mut translator = SymbolTranslator::new();
        let spec = LayoutSpec {
            layout: "xx".into(),
            ..Default::default()
        };

        let result = translator.rebuild(&spec);
        assert!(matches!(result, Err(TranslatorError::LayoutRejected(_))));
        assert_eq!(translator.spec(), &LayoutSpec::default());
        assert_eq!(translator.resolve(16 + EVDEV_OFFSET), Keysym('q' as u32));
    }

    #[cfg(not(feature = "xkb"))]
    #[test]
    fn test_keymap_file_needs_xkb() {
        let mut translator = SymbolTranslator::new();
        let spec = LayoutSpec {
            file: Some(PathBuf::from("/tmp/custom.xkb")),
            ..Default::default()
        };
        assert_eq!(
            translator.rebuild(&spec),
            Err(TranslatorError::KeymapFile(PathBuf::from("/tmp/custom.xkb")))
        );
    }
}
