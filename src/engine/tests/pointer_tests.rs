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

//! Pointer, scroll and switch tests

use super::support::*;
use crate::engine::host::{WindowId, WindowInfo};
use crate::engine::input::{AxisEvent, AxisOrientation, AxisSource};
use crate::engine::mouse::MouseBindMode;
use crate::engine::Disposition::{Forward, Suppress};

fn drag_harness() -> Harness {
    let mut h = Harness::new(
        "bindm = SUPER, mouse:272, movewindow\n\
         bindm = SUPER, mouse:273, resizewindow, 1\n",
    );
    h.host.windows.push(WindowInfo::new(1, "kitty", "~"));
    h.host.under_cursor = Some(WindowId(1));
    h
}

#[test]
fn test_button_binding() {
    let mut h = Harness::new("bind = SUPER, mouse:274, exec, middle\n");

    h.press(KEY_LEFTMETA);
    assert_eq!(h.button(274, true), Suppress);
    assert_eq!(h.button(274, false), Suppress);
    assert_eq!(h.fired_names(), vec!["exec middle"]);

    assert_eq!(h.button(BTN_LEFT, true), Forward);
}

#[test]
fn test_drag_starts_and_ends() {
    let mut h = drag_harness();

    h.press(KEY_LEFTMETA);
    assert_eq!(h.button(BTN_LEFT, true), Suppress);
    assert_eq!(h.engine.mouse_bind_mode(), MouseBindMode::Move);
    assert_eq!(h.host.drags, vec![(WindowId(1), MouseBindMode::Move)]);

    assert_eq!(h.button(BTN_LEFT, false), Suppress);
    assert_eq!(h.engine.mouse_bind_mode(), MouseBindMode::Idle);
    assert_eq!(h.host.drag_ends, 1);
}

#[test]
fn test_resize_drag_with_ratio_argument() {
    let mut h = drag_harness();

    h.press(KEY_LEFTMETA);
    h.button(273, true);

    assert_eq!(h.engine.mouse_bind_mode(), MouseBindMode::ResizeForceRatio);
}

#[test]
fn test_drag_release_after_modifier_release() {
    let mut h = drag_harness();

    h.press(KEY_LEFTMETA);
    h.button(BTN_LEFT, true);

    // Any key event interrupts the drag and is swallowed
    assert_eq!(h.release(KEY_LEFTMETA), Suppress);
    assert_eq!(h.engine.mouse_bind_mode(), MouseBindMode::Idle);
    assert_eq!(h.host.drag_ends, 1);

    // The release still pairs with the press even though SUPER is up
    h.button(BTN_LEFT, false);
    assert_eq!(h.host.drag_ends, 1);
    assert_eq!(h.engine.mouse_bind_mode(), MouseBindMode::Idle);
}

#[test]
fn test_drag_without_window_passes_click() {
    let mut h = drag_harness();
    h.host.under_cursor = None;

    h.press(KEY_LEFTMETA);
    assert_eq!(h.button(BTN_LEFT, true), Forward);
    assert_eq!(h.engine.mouse_bind_mode(), MouseBindMode::Idle);
    assert!(h.host.drags.is_empty());
}

#[test]
fn test_drag_of_vanished_window_is_dropped_silently() {
    let mut h = drag_harness();

    h.press(KEY_LEFTMETA);
    h.button(BTN_LEFT, true);
    h.host.windows.clear();

    assert_eq!(h.press(KEY_A), Forward);
    assert_eq!(h.host.drag_ends, 0);
    assert_eq!(h.engine.mouse_bind_mode(), MouseBindMode::Idle);
}

#[test]
fn test_border_resize() {
    let mut h = drag_harness();

    h.engine.resize_with_border(&mut h.host, true);
    assert_eq!(h.engine.mouse_bind_mode(), MouseBindMode::Resize);

    h.engine.resize_with_border(&mut h.host, false);
    assert_eq!(h.engine.mouse_bind_mode(), MouseBindMode::Idle);
}

#[test]
fn test_scroll_directions() {
    let mut h = Harness::new(
        "bind = SUPER, mouse_down, workspace, e+1\n\
         bind = SUPER, mouse_up, workspace, e-1\n\
         bind = SUPER, mouse_left, exec, left\n\
         bind = SUPER, mouse_right, exec, right\n",
    );
    h.press(KEY_LEFTMETA);

    h.scroll(AxisOrientation::Vertical, -1.0);
    h.advance(300);
    h.scroll(AxisOrientation::Vertical, 1.0);
    h.advance(300);
    h.scroll(AxisOrientation::Horizontal, -1.0);
    h.advance(300);
    h.scroll(AxisOrientation::Horizontal, 1.0);

    assert_eq!(
        h.fired_names(),
        vec!["workspace e+1", "workspace e-1", "exec left", "exec right"]
    );
}

#[test]
fn test_scroll_debounce_restarts_on_every_event() {
    let mut h = Harness::new("bind = SUPER, mouse_down, workspace, e+1\n");
    h.press(KEY_LEFTMETA);

    assert_eq!(h.scroll(AxisOrientation::Vertical, -1.0), Suppress);
    h.advance(100);
    assert_eq!(h.scroll(AxisOrientation::Vertical, -1.0), Forward);
    // 350ms after the first event but only 250ms after the last one
    h.advance(250);
    assert_eq!(h.scroll(AxisOrientation::Vertical, -1.0), Forward);
    h.advance(300);
    assert_eq!(h.scroll(AxisOrientation::Vertical, -1.0), Suppress);

    assert_eq!(h.fired().len(), 2);
}

#[test]
fn test_only_wheel_scrolls_match() {
    let mut h = Harness::new("bind = SUPER, mouse_down, workspace, e+1\n");
    h.press(KEY_LEFTMETA);

    let event = AxisEvent {
        source: AxisSource::Finger,
        orientation: AxisOrientation::Vertical,
        delta: -1.0,
    };
    assert_eq!(h.engine.handle_axis(&mut h.host, event), Forward);
    assert!(h.fired().is_empty());
}

#[test]
fn test_switch_events() {
    let mut h = Harness::new(
        "bindl = , switch:on:Lid Switch, exec, lock\n\
         bindl = , switch:off:Lid Switch, exec, unlock\n\
         bindl = , switch:Lid Switch, exec, toggled\n",
    );

    // Modifiers play no part in switch events
    h.host.mods = crate::core::types::Modifier::Super.into();

    h.switch("Lid Switch", true);
    h.switch("Lid Switch", false);

    assert_eq!(
        h.fired_names(),
        vec!["exec toggled", "exec lock", "exec toggled", "exec unlock"]
    );
}
