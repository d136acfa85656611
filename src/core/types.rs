//! src/core/types.rs
//!
//! Core type definitions for keybinding matching
//!
//! This module defines the fundamental types used throughout the engine:
//! - `Modifier` / `ModMask`: Keyboard modifier bits (SHIFT, CTRL, SUPER, ...)
//! - `KeyIdentity`: What a binding listens for (symbol, raw code, pseudo-key, chord)
//! - `BindFlags`: The per-binding behaviour letters (`bindr`, `binde`, `bindl`, ...)
//! - `Binding`: Complete binding with action, arguments and submap
//!
//! Key codes are XKB key codes, i.e. the evdev code plus 8.

use enumflags2::{bitflags, BitFlags};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

use crate::core::keysym::{Keysym, NameCase};

/// XKB key code (evdev code + 8)
pub type Keycode = u32;

/// Offset between evdev/libinput key codes and XKB key codes
pub const EVDEV_OFFSET: Keycode = 8;

/// Keyboard modifier bits, in wlroots order
#[bitflags]
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Modifier {
    Shift = 1 << 0,
    Caps = 1 << 1,
    Ctrl = 1 << 2,
    Alt = 1 << 3,
    Mod2 = 1 << 4,
    Mod3 = 1 << 5,
    /// Super/Windows/Command key (MOD4)
    Super = 1 << 6,
    Mod5 = 1 << 7,
}

/// Aggregate modifier state
pub type ModMask = BitFlags<Modifier>;

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Shift => write!(f, "SHIFT"),
            Modifier::Caps => write!(f, "CAPS"),
            Modifier::Ctrl => write!(f, "CTRL"),
            Modifier::Alt => write!(f, "ALT"),
            Modifier::Mod2 => write!(f, "MOD2"),
            Modifier::Mod3 => write!(f, "MOD3"),
            Modifier::Super => write!(f, "SUPER"),
            Modifier::Mod5 => write!(f, "MOD5"),
        }
    }
}

/// Parses a modifier list the way Hyprland does: by substring, so
/// `SUPER_SHIFT`, `SUPER SHIFT` and `shift+super` are all accepted.
pub fn mod_mask_from_str(mods: &str) -> ModMask {
    let mods = mods.to_uppercase();
    let mut mask = ModMask::empty();

    if mods.contains("SHIFT") {
        mask |= Modifier::Shift;
    }
    if mods.contains("CAPS") {
        mask |= Modifier::Caps;
    }
    if mods.contains("CTRL") || mods.contains("CONTROL") {
        mask |= Modifier::Ctrl;
    }
    if mods.contains("ALT") || mods.contains("MOD1") {
        mask |= Modifier::Alt;
    }
    if mods.contains("MOD2") {
        mask |= Modifier::Mod2;
    }
    if mods.contains("MOD3") {
        mask |= Modifier::Mod3;
    }
    if ["SUPER", "WIN", "LOGO", "MOD4", "META"].iter().any(|name| mods.contains(name)) {
        mask |= Modifier::Super;
    }
    if mods.contains("MOD5") {
        mask |= Modifier::Mod5;
    }

    mask
}

/// Renders a mask as `SUPER_SHIFT`-style text
pub fn format_mod_mask(mask: ModMask) -> String {
    mask.iter().map(|m| m.to_string()).collect::<Vec<_>>().join("_")
}

/// Modifier produced by a physical key, if any
pub fn keycode_to_modifier(keycode: Keycode) -> ModMask {
    if keycode < EVDEV_OFFSET {
        return ModMask::empty();
    }

    match keycode - EVDEV_OFFSET {
        125 | 126 => Modifier::Super.into(), // KEY_LEFTMETA, KEY_RIGHTMETA
        42 | 54 => Modifier::Shift.into(),   // KEY_LEFTSHIFT, KEY_RIGHTSHIFT
        29 | 97 => Modifier::Ctrl.into(),    // KEY_LEFTCTRL, KEY_RIGHTCTRL
        56 | 100 => Modifier::Alt.into(),    // KEY_LEFTALT, KEY_RIGHTALT
        58 => Modifier::Caps.into(),         // KEY_CAPSLOCK
        69 => Modifier::Mod2.into(),         // KEY_NUMLOCK
        _ => ModMask::empty(),
    }
}

/// Modifier produced by a modifier keysym (used for chord masks)
pub fn keysym_to_modifier(sym: Keysym) -> ModMask {
    match sym {
        Keysym::SUPER_L | Keysym::SUPER_R => Modifier::Super.into(),
        Keysym::SHIFT_L | Keysym::SHIFT_R => Modifier::Shift.into(),
        Keysym::CONTROL_L | Keysym::CONTROL_R => Modifier::Ctrl.into(),
        Keysym::ALT_L | Keysym::ALT_R => Modifier::Alt.into(),
        Keysym::CAPS_LOCK => Modifier::Caps.into(),
        Keysym::NUM_LOCK => Modifier::Mod2.into(),
        _ => ModMask::empty(),
    }
}

fn serialize_mask<S: Serializer>(mask: &ModMask, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_mod_mask(*mask))
}

/// What a binding listens for. The kind is fixed when the binding is created.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum KeyIdentity {
    /// XKB keysym name, resolved against the layout on every event
    Symbol(String),
    /// Raw XKB key code (`code:36`)
    Code(Keycode),
    /// Pseudo-key produced by a non-keyboard source (`mouse:272`, `mouse_down`, `switch:on:Lid Switch`)
    Synthetic(String),
    /// Fires for any otherwise unmatched event in its submap
    CatchAll,
    /// Set of symbols that must be held together
    Chord {
        mods: BTreeSet<Keysym>,
        keys: BTreeSet<Keysym>,
    },
}

impl KeyIdentity {
    /// Textual key name, for kinds that have one
    pub fn name(&self) -> Option<&str> {
        match self {
            KeyIdentity::Symbol(name) | KeyIdentity::Synthetic(name) => Some(name),
            _ => None,
        }
    }

    /// Resolves a symbolic name in both case modes.
    ///
    /// Returns `None` when neither resolves; an unresolvable name must
    /// never compare equal to an event that carries no symbol.
    pub fn resolve_symbol(&self) -> Option<(Keysym, Keysym)> {
        let KeyIdentity::Symbol(name) = self else {
            return None;
        };

        let exact = Keysym::from_name(name, NameCase::Exact);
        let folded = Keysym::from_name(name, NameCase::Insensitive);

        if exact.is_no_symbol() && folded.is_no_symbol() {
            None
        } else {
            Some((exact, folded))
        }
    }
}

impl fmt::Display for KeyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyIdentity::Symbol(name) | KeyIdentity::Synthetic(name) => write!(f, "{}", name),
            KeyIdentity::Code(code) => write!(f, "code:{}", code),
            KeyIdentity::CatchAll => write!(f, "catchall"),
            KeyIdentity::Chord { keys, .. } => {
                let keys = keys.iter().map(|k| k.to_string()).collect::<Vec<_>>();
                write!(f, "{}", keys.join("&"))
            }
        }
    }
}

/// Behaviour flags, one per bind suffix letter
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct BindFlags {
    /// `l`: usable while the session is locked
    pub locked: bool,
    /// `r`: fires on release instead of press
    pub release: bool,
    /// `o`: fires once after the repeat delay while held
    pub long_press: bool,
    /// `e`: re-fires at the keyboard repeat rate while held
    pub repeat: bool,
    /// `n`: never consumes the event
    pub non_consuming: bool,
    /// `m`: mouse drag binding, routed through the `mouse` action
    pub mouse: bool,
    /// `t`: exempt from shadowing
    pub transparent: bool,
    /// `i`: matches regardless of modifiers
    pub ignore_mods: bool,
    /// `s`: chord binding
    pub chord: bool,
    /// `d`: carries a description field
    pub has_description: bool,
    /// `p`: bypasses shortcut inhibitors
    pub bypass_inhibitor: bool,
}

impl BindFlags {
    /// Flag letters in canonical order, as written after `bind`
    pub fn letters(&self) -> String {
        [
            (self.locked, 'l'),
            (self.release, 'r'),
            (self.long_press, 'o'),
            (self.repeat, 'e'),
            (self.non_consuming, 'n'),
            (self.mouse, 'm'),
            (self.transparent, 't'),
            (self.ignore_mods, 'i'),
            (self.chord, 's'),
            (self.has_description, 'd'),
            (self.bypass_inhibitor, 'p'),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, c)| *c)
        .collect()
    }
}

/// Handlers whose press and release are paired outside modifier filtering
pub const SPECIAL_HANDLERS: &[&str] = &["global", "pass", "sendshortcut", "mouse"];

/// A complete binding definition
///
/// # Example
/// ```
/// use hypr_bind_engine::core::{Binding, KeyIdentity, Modifier};
///
/// let binding = Binding::new(Modifier::Super.into(), KeyIdentity::Symbol("Q".into()), "killactive", "");
/// assert_eq!(binding.to_string(), "bind = SUPER, Q, killactive");
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Binding {
    #[serde(serialize_with = "serialize_mask")]
    pub modmask: ModMask,
    pub key: KeyIdentity,
    /// Submap this binding belongs to; empty is the default map
    pub submap: String,
    /// Action name (`exec`, `workspace`, `submap`, ...)
    pub handler: String,
    pub arg: String,
    pub flags: BindFlags,
    pub description: Option<String>,
}

impl Binding {
    pub fn new(modmask: ModMask, key: KeyIdentity, handler: &str, arg: &str) -> Self {
        Self {
            modmask,
            key,
            submap: String::new(),
            handler: handler.to_string(),
            arg: arg.to_string(),
            flags: BindFlags::default(),
            description: None,
        }
    }

    pub fn in_submap(mut self, submap: &str) -> Self {
        self.submap = submap.to_string();
        self
    }

    pub fn with_flags(mut self, flags: BindFlags) -> Self {
        self.flags = flags;
        self
    }

    /// True for `global`, `pass`, `sendshortcut` and `mouse` bindings
    pub fn is_special(&self) -> bool {
        SPECIAL_HANDLERS.contains(&self.handler.as_str())
    }

    /// Action the engine should look up for this binding
    pub fn action_name(&self) -> &str {
        if self.flags.mouse {
            "mouse"
        } else {
            &self.handler
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bind{} = {}, {}, {}",
            self.flags.letters(),
            format_mod_mask(self.modmask),
            self.key,
            self.handler
        )?;

        if !self.arg.is_empty() {
            write!(f, ", {}", self.arg)?;
        }

        Ok(())
    }
}
