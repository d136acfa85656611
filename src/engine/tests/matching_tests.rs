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

//! Matching tests
//!
//! Key events against the binding list:
//! - Exact modifier matching and release polarity
//! - Shadowing of bindings on held keys
//! - Chords, catch-all, raw codes, ignore-mods
//! - Inhibitors, session lock, internal keybinds

use super::support::*;
use crate::config::EngineConfig;
use crate::core::keysym::Keysym;
use crate::core::types::{KeyIdentity, ModMask, Modifier, EVDEV_OFFSET};
use crate::dispatch::Polarity;
use crate::engine::host::ClickMode;
use crate::engine::Disposition::{Forward, Suppress};

#[test]
fn test_super_q_fires_once() {
    let mut h = Harness::new("bind = SUPER, Q, killactive\n");

    assert_eq!(h.press(KEY_LEFTMETA), Forward);
    assert_eq!(h.press(KEY_Q), Suppress);
    assert_eq!(h.release(KEY_Q), Suppress, "release of a consumed press is consumed too");
    assert_eq!(h.release(KEY_LEFTMETA), Forward);

    let fired = h.fired();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].action, "killactive");
    assert_eq!(fired[0].polarity, Polarity::Press);
}

#[test]
fn test_unbound_key_is_forwarded() {
    let mut h = Harness::new("bind = SUPER, Q, killactive\n");

    assert_eq!(h.tap(KEY_Q), (Forward, Forward));
    assert!(h.fired().is_empty());
}

#[test]
fn test_modifier_mask_must_match_exactly() {
    let mut h = Harness::new(
        "bind = SUPER, 1, workspace, 1\n\
         bind = SUPER SHIFT, 1, movetoworkspace, 1\n",
    );

    h.press(KEY_LEFTMETA);
    h.tap(KEY_1);
    h.press(KEY_LEFTSHIFT);
    h.tap(KEY_1);
    h.release(KEY_LEFTSHIFT);
    h.release(KEY_LEFTMETA);

    assert_eq!(h.fired_names(), vec!["workspace 1", "movetoworkspace 1"]);
}

#[test]
fn test_release_binding_consumes_press_and_fires_on_release() {
    let mut h = Harness::new("bindr = SUPER, D, exec, rofi\n");

    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_D), Suppress);
    assert!(h.fired().is_empty(), "release bindings never fire on press");

    assert_eq!(h.release(KEY_D), Suppress);
    let fired = h.fired();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].polarity, Polarity::Release);
}

#[test]
fn test_modifier_key_release_binding() {
    let mut h = Harness::new("bindr = SUPER, Super_L, exec, menu\n");

    assert_eq!(h.press(KEY_LEFTMETA), Forward);
    // The press went through, so its release does too
    assert_eq!(h.release(KEY_LEFTMETA), Forward);

    assert_eq!(h.fired_names(), vec!["exec menu"]);
}

#[test]
fn test_consumed_key_shadows_other_bindings_on_held_keys() {
    let mut h = Harness::new(
        "bindr = SUPER, Super_L, exec, menu\n\
         bind = SUPER, Q, killactive\n",
    );

    h.press(KEY_LEFTMETA);
    h.tap(KEY_Q);
    assert_eq!(h.release(KEY_LEFTMETA), Forward);
    assert_eq!(h.fired_names(), vec!["killactive"]);

    // Nothing held any more, so the shadow is gone
    h.tap(KEY_LEFTMETA);
    assert_eq!(h.fired_names(), vec!["killactive", "exec menu"]);
}

#[test]
fn test_held_key_does_not_fire_second_binding_on_release() {
    let mut h = Harness::new(
        "bind = SUPER, Q, exec, first\n\
         bind = SUPER SHIFT, Q, exec, second\n",
    );

    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_Q), Suppress);
    h.press(KEY_LEFTSHIFT);

    // Mask is now SUPER SHIFT, but the key was consumed under SUPER
    assert_eq!(h.release(KEY_Q), Suppress);
    assert_eq!(h.fired_names(), vec!["exec first"]);
}

#[test]
fn test_repressed_key_does_not_fire_second_binding() {
    let mut h = Harness::new(
        "bind = SUPER, Q, exec, first\n\
         bind = SUPER SHIFT, Q, exec, second\n",
    );

    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_Q), Suppress);
    h.press(KEY_LEFTSHIFT);

    assert_eq!(h.press(KEY_Q), Suppress);
    assert_eq!(h.release(KEY_Q), Suppress);
    assert_eq!(h.fired_names(), vec!["exec first"]);
    assert!(h.engine.pressed_keys().is_empty());

    // A fresh press after the release matches again
    assert_eq!(h.tap(KEY_Q), (Suppress, Suppress));
    assert_eq!(h.fired_names(), vec!["exec first", "exec second"]);
}

#[test]
fn test_out_of_range_keycode_is_forwarded() {
    let mut h = Harness::new("bind = SUPER, Q, killactive\n");

    assert_eq!(h.tap(u32::MAX), (Forward, Forward));
    assert!(h.fired().is_empty());
}

#[test]
fn test_transparent_binding_is_never_shadowed() {
    let mut h = Harness::new(
        "bindrt = SUPER, Super_L, exec, menu\n\
         bind = SUPER, Q, killactive\n",
    );

    h.press(KEY_LEFTMETA);
    h.tap(KEY_Q);
    h.release(KEY_LEFTMETA);

    assert_eq!(h.fired_names(), vec!["killactive", "exec menu"]);
}

#[test]
fn test_release_without_press_record_uses_live_mask() {
    let mut h = Harness::new("bindr = SUPER, Q, exec, late\n");
    h.host.mods = Modifier::Super.into();

    assert_eq!(h.release(KEY_Q), Suppress);
    assert_eq!(h.fired_names(), vec!["exec late"]);
}

#[test]
fn test_non_consuming_binding_forwards_event() {
    let mut h = Harness::new("bindn = , A, exec, spy\n");

    assert_eq!(h.press(KEY_A), Forward);
    assert_eq!(h.fired_names(), vec!["exec spy"]);
}

#[test]
fn test_unknown_action_does_not_consume() {
    let mut h = Harness::new(
        "bind = SUPER, Z, nosuchaction\n\
         bind = SUPER, Z, exec, fallback\n",
    );

    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_Z), Suppress);
    assert_eq!(h.fired_names(), vec!["exec fallback"]);

    let mut h = Harness::new("bind = SUPER, Z, nosuchaction\n");
    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_Z), Forward);
}

#[test]
fn test_all_matching_bindings_fire_in_order() {
    let mut h = Harness::new(
        "bind = SUPER, Q, exec, first\n\
         bind = SUPER, Q, exec, second\n",
    );

    h.press(KEY_LEFTMETA);
    h.press(KEY_Q);

    assert_eq!(h.fired_names(), vec!["exec first", "exec second"]);
}

#[test]
fn test_raw_code_binding() {
    let code = KEY_Q + EVDEV_OFFSET;
    let mut h = Harness::new(&format!("bind = SUPER, code:{}, exec, by-code\n", code));

    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_Q), Suppress);
    assert_eq!(h.fired_names(), vec!["exec by-code"]);
}

#[test]
fn test_ignore_mods_binding() {
    let mut h = Harness::new("bindi = , F1, exec, help\n");

    h.press(KEY_LEFTMETA);
    h.press(KEY_LEFTSHIFT);
    assert_eq!(h.press(KEY_F1), Suppress);

    assert_eq!(h.fired_names(), vec!["exec help"]);
}

#[test]
fn test_unresolvable_key_name_never_matches() {
    let mut h = Harness::new("bind = , NotAKeysym, exec, never\n");

    // Keys with no symbol on the layout must not match either
    h.tap(KEY_Q);
    h.tap(84);

    assert!(h.fired().is_empty());
}

#[test]
fn test_chord_partial_then_full() {
    let mut h = Harness::new("binds = Super_L, a&s, exec, chord\n");

    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_A), Suppress, "partial chord consumes without firing");
    assert!(h.fired().is_empty());

    assert_eq!(h.press(KEY_S), Suppress);
    assert_eq!(h.fired_names(), vec!["exec chord"]);

    h.release(KEY_S);
    h.release(KEY_A);
    h.release(KEY_LEFTMETA);
    assert_eq!(h.fired().len(), 1);
}

#[test]
fn test_chord_with_extra_key_does_not_match() {
    let mut h = Harness::new("binds = Super_L, a&s, exec, chord\n");

    h.press(KEY_LEFTMETA);
    h.press(KEY_D);
    assert_eq!(h.press(KEY_A), Forward);
    h.press(KEY_S);

    assert!(h.fired().is_empty());
}

#[test]
fn test_inhibitor_blocks_all_but_bypass_bindings() {
    let mut h = Harness::new(
        "bind = SUPER, Q, exec, blocked\n\
         bindp = SUPER, A, exec, always\n",
    );
    h.host.inhibited = true;

    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_Q), Forward);
    assert_eq!(h.press(KEY_A), Suppress);

    assert_eq!(h.fired_names(), vec!["exec always"]);
}

#[test]
fn test_disabled_grabbing_ignores_inhibitor() {
    let config = EngineConfig {
        disable_keybind_grabbing: true,
        ..EngineConfig::default()
    };
    let mut h = Harness::with_config("bind = SUPER, Q, exec, kitty\n", config);
    h.host.inhibited = true;

    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_Q), Suppress);
    assert_eq!(h.fired_names(), vec!["exec kitty"]);
}

#[test]
fn test_locked_session_only_runs_locked_bindings() {
    let mut h = Harness::new(
        "bindl = , F2, exec, mute\n\
         bind = , F3, exec, launcher\n",
    );
    h.host.locked = true;

    h.tap(KEY_F2);
    assert_eq!(h.tap(KEY_F3), (Forward, Forward));

    assert_eq!(h.fired_names(), vec!["exec mute"]);
}

#[test]
fn test_inactive_session_forwards_and_forgets_pressed_keys() {
    let mut h = Harness::new("bind = , F3, exec, launcher\n");

    h.press(KEY_Q);
    assert_eq!(h.engine.pressed_keys().len(), 1);

    h.host.active = false;
    assert_eq!(h.press(KEY_F3), Forward);
    assert!(h.engine.pressed_keys().is_empty());
    assert!(h.fired().is_empty());
}

#[test]
fn test_vt_switch_keys_are_always_consumed() {
    let mut h = Harness::new("bind = , F1, exec, help\n");
    let vt2 = Keysym(Keysym::XF86_SWITCH_VT_1.0 + 1);
    h.keyboard.device_overrides.insert(KEY_F1 + EVDEV_OFFSET, vt2);

    // No VT session: nothing to switch, but the key is still eaten
    assert_eq!(h.press(KEY_F1), Suppress);
    assert!(h.host.vt_switches.is_empty());

    h.host.vt_session = true;
    h.host.active_vt = Some(1);
    assert_eq!(h.press(KEY_F1), Suppress);
    assert_eq!(h.host.vt_switches, vec![2]);

    // Already there
    assert_eq!(h.press(KEY_F1), Suppress);
    assert_eq!(h.host.vt_switches, vec![2]);

    assert!(h.fired().is_empty());
}

#[test]
fn test_escape_leaves_kill_mode() {
    let mut h = Harness::new("bind = , Escape, exec, never\n");
    h.host.click_mode = ClickMode::Kill;

    assert_eq!(h.press(KEY_ESC), Suppress);
    assert_eq!(h.host.click_mode, ClickMode::Default);
    assert!(h.fired().is_empty());

    h.release(KEY_ESC);
    h.press(KEY_ESC);
    assert_eq!(h.fired_names(), vec!["exec never"]);
}

#[test]
fn test_remove_binding() {
    let mut h = Harness::new(
        "bind = SUPER, Q, killactive\n\
         bind = SUPER, A, exec, kept\n",
    );

    let removed = h
        .engine
        .remove_binding(Modifier::Super.into(), &KeyIdentity::Symbol("Q".into()));
    assert_eq!(removed, 1);
    assert_eq!(h.engine.remove_binding(ModMask::empty(), &KeyIdentity::Symbol("Q".into())), 0);

    h.press(KEY_LEFTMETA);
    assert_eq!(h.press(KEY_Q), Forward);
    assert_eq!(h.press(KEY_A), Suppress);
    assert_eq!(h.fired_names(), vec!["exec kept"]);
}
