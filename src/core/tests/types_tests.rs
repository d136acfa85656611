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

use crate::core::keysym::Keysym;
use crate::core::types::*;

#[test]
fn test_mod_mask_from_str_substrings() {
    assert_eq!(mod_mask_from_str("SUPER_SHIFT"), Modifier::Super | Modifier::Shift);
    assert_eq!(mod_mask_from_str("super shift"), Modifier::Super | Modifier::Shift);
    assert_eq!(mod_mask_from_str("CONTROL ALT"), Modifier::Ctrl | Modifier::Alt);
    assert_eq!(mod_mask_from_str("WIN"), ModMask::from(Modifier::Super));
    assert_eq!(mod_mask_from_str("MOD1"), ModMask::from(Modifier::Alt));
    assert_eq!(mod_mask_from_str(""), ModMask::empty());
}

#[test]
fn test_format_mod_mask() {
    assert_eq!(format_mod_mask(Modifier::Super | Modifier::Shift), "SHIFT_SUPER");
    assert_eq!(format_mod_mask(ModMask::empty()), "");
}

#[test]
fn test_keycode_to_modifier() {
    assert_eq!(keycode_to_modifier(125 + EVDEV_OFFSET), ModMask::from(Modifier::Super));
    assert_eq!(keycode_to_modifier(54 + EVDEV_OFFSET), ModMask::from(Modifier::Shift));
    assert_eq!(keycode_to_modifier(58 + EVDEV_OFFSET), ModMask::from(Modifier::Caps));
    assert_eq!(keycode_to_modifier(69 + EVDEV_OFFSET), ModMask::from(Modifier::Mod2));
    assert_eq!(keycode_to_modifier(16 + EVDEV_OFFSET), ModMask::empty());
    assert_eq!(keycode_to_modifier(0), ModMask::empty());
}

#[test]
fn test_unresolvable_symbol_never_resolves() {
    assert_eq!(KeyIdentity::Symbol("yen_and_ro".into()).resolve_symbol(), None);
    assert_eq!(KeyIdentity::Code(24).resolve_symbol(), None);

    let (exact, folded) = KeyIdentity::Symbol("Q".into()).resolve_symbol().unwrap();
    assert_eq!(exact, Keysym('Q' as u32));
    assert_eq!(folded, Keysym('q' as u32));
}

#[test]
fn test_binding_display() {
    let binding = Binding::new(
        Modifier::Super.into(),
        KeyIdentity::Symbol("K".into()),
        "exec",
        "firefox",
    );

    assert_eq!(binding.to_string(), "bind = SUPER, K, exec, firefox");
}

#[test]
fn test_binding_display_with_flags() {
    let flags = BindFlags {
        locked: true,
        repeat: true,
        ..Default::default()
    };
    let binding = Binding::new(
        ModMask::empty(),
        KeyIdentity::Symbol("XF86AudioRaiseVolume".into()),
        "exec",
        "",
    )
    .with_flags(flags);

    let display = binding.to_string();
    assert!(display.starts_with("bindle = "));
    assert!(!display.ends_with(",")); // No trailing comma when no args
}

#[test]
fn test_special_handlers() {
    let pass = Binding::new(ModMask::empty(), KeyIdentity::CatchAll, "pass", "class:obs");
    let exec = Binding::new(ModMask::empty(), KeyIdentity::CatchAll, "exec", "kitty");

    assert!(pass.is_special());
    assert!(!exec.is_special());
}
