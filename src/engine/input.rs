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

//! src/engine/input.rs
//!
//! Input entry points
//!
//! Every raw event goes through here before matching:
//! - keys are translated to a symbol, recorded as pressed, and released
//!   against the record made at press time
//! - pointer buttons, wheel scrolls and switches become pseudo-keys
//!   (`mouse:272`, `mouse_down`, `switch:on:Lid Switch`)
//!
//! Each entry point returns whether the event should still reach the
//! focused client.

use tracing::{debug, error, info};

use crate::core::keysym::Keysym;
use crate::core::types::{Keycode, ModMask, EVDEV_OFFSET};
use crate::dispatch::LastInput;
use crate::engine::host::{ClickMode, Host, Keyboard};
use crate::engine::mouse::MouseBindMode;
use crate::engine::shadow::{shadow_bindings, ShadowExempt};
use crate::engine::KeybindEngine;

/// A key or pseudo-key as it was when pressed
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PressedKey {
    pub sym: Keysym,
    /// XKB key code, 0 for pseudo-keys
    pub code: Keycode,
    /// Pseudo-key name (`mouse:272`, `mouse_down`, ...)
    pub name: Option<String>,
    pub modmask_at_press: ModMask,
    pub submap_at_press: String,
    /// Whether the press reached the client, so its release must too
    pub forwarded: bool,
}

impl PressedKey {
    fn synthetic(name: String, modmask: ModMask, submap: &str) -> Self {
        Self {
            name: Some(name),
            modmask_at_press: modmask,
            submap_at_press: submap.to_string(),
            forwarded: true,
            ..Self::default()
        }
    }
}

/// Raw keyboard event
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyEvent {
    /// evdev key code
    pub keycode: Keycode,
    pub pressed: bool,
    pub time_ms: u32,
}

/// Raw pointer button event
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ButtonEvent {
    pub button: u32,
    pub pressed: bool,
    pub time_ms: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AxisSource {
    Wheel,
    Finger,
    Continuous,
    WheelTilt,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AxisOrientation {
    Vertical,
    Horizontal,
}

/// Raw scroll event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisEvent {
    pub source: AxisSource,
    pub orientation: AxisOrientation,
    pub delta: f64,
}

/// What should happen to the raw event after matching
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// Deliver it to the focused client
    Forward,
    /// A binding consumed it
    Suppress,
}

impl Disposition {
    pub fn forwards(self) -> bool {
        self == Disposition::Forward
    }

    fn from_suppress(suppress: bool) -> Self {
        if suppress {
            Disposition::Suppress
        } else {
            Disposition::Forward
        }
    }
}

impl KeybindEngine {
    /// Handles a keyboard key edge
    pub fn handle_key(
        &mut self,
        host: &mut dyn Host,
        keyboard: &dyn Keyboard,
        event: KeyEvent,
    ) -> Disposition {
        if !host.session_active() || host.unsafe_state() {
            self.state.pressed.clear();
            return Disposition::Forward;
        }

        let code = event.keycode.saturating_add(EVDEV_OFFSET);

        // Internal bindings use the device's own keymap state
        if self.handle_internal(host, keyboard.device_sym(code)) {
            return Disposition::Suppress;
        }

        let sym = keyboard
            .bind_sym(code)
            .unwrap_or_else(|| self.translator.resolve(code));
        let mods = host.modifiers();

        self.state.input = LastInput {
            keycode: code,
            button: 0,
            time_ms: event.time_ms,
        };

        let drag_was_active = self.state.mouse.interrupt(host);

        self.state.active_repeat.clear();
        self.state.long_press = None;
        self.state.timers.cancel_all();

        let key = PressedKey {
            sym,
            code,
            name: None,
            modmask_at_press: mods,
            submap_at_press: self.state.submap.clone(),
            forwarded: true,
        };

        let suppress = if event.pressed {
            self.press(host, mods, key, ShadowExempt { sym, code })
        } else {
            self.release(host, mods, key, |held| held.code == code)
        };

        Disposition::from_suppress(suppress || drag_was_active)
    }

    /// Handles a pointer button edge (`mouse:<button>`)
    pub fn handle_button(&mut self, host: &mut dyn Host, event: ButtonEvent) -> Disposition {
        let mods = host.modifiers();

        self.state.input = LastInput {
            keycode: 0,
            button: event.button,
            time_ms: event.time_ms,
        };

        let drag_was_active = self.state.mouse.interrupt(host);
        self.state.active_repeat.clear();

        let name = format!("mouse:{}", event.button);
        let key = PressedKey::synthetic(name.clone(), mods, &self.state.submap);

        let suppress = if event.pressed {
            self.press(host, mods, key, ShadowExempt::default())
        } else {
            self.release(host, mods, key, |held| held.name.as_deref() == Some(name.as_str()))
        };

        Disposition::from_suppress(suppress || drag_was_active)
    }

    /// Handles a scroll event. Only wheel scrolls can trigger bindings,
    /// and only as presses.
    pub fn handle_axis(&mut self, host: &mut dyn Host, event: AxisEvent) -> Disposition {
        let now = self.clock.now_ms();
        let debounced = self
            .state
            .last_scroll_ms
            .is_some_and(|last| now.saturating_sub(last) < self.config.scroll_event_delay_ms);

        self.state.last_scroll_ms = Some(now);
        if debounced {
            return Disposition::Forward;
        }

        self.state.active_repeat.clear();

        if event.source != AxisSource::Wheel {
            return Disposition::Forward;
        }

        let name = match (event.orientation, event.delta < 0.0) {
            (AxisOrientation::Vertical, true) => "mouse_down",
            (AxisOrientation::Vertical, false) => "mouse_up",
            (AxisOrientation::Horizontal, true) => "mouse_left",
            (AxisOrientation::Horizontal, false) => "mouse_right",
        };

        let mods = host.modifiers();
        let key = PressedKey::synthetic(name.to_string(), mods, &self.state.submap);
        let found = !self.evaluate(host, mods, &key, true).pass_event;

        if found {
            self.recompute_shadows(ShadowExempt::default());
        }

        Disposition::from_suppress(found)
    }

    /// Handles a switch toggle: `switch:<name>` fires on both edges, then
    /// `switch:on:<name>` or `switch:off:<name>`. Modifiers are ignored.
    pub fn handle_switch(&mut self, host: &mut dyn Host, name: &str, on: bool) {
        let state = if on { "on" } else { "off" };

        for key_name in [format!("switch:{}", name), format!("switch:{}:{}", state, name)] {
            let key = PressedKey::synthetic(key_name, ModMask::empty(), &self.state.submap);
            self.evaluate(host, ModMask::empty(), &key, true);
        }
    }

    /// Starts or ends a resize drag from a window border grab
    pub fn resize_with_border(&mut self, host: &mut dyn Host, pressed: bool) {
        let mode = if pressed {
            MouseBindMode::Resize
        } else {
            MouseBindMode::Idle
        };

        self.state.mouse.change_mode(host, mode);
    }

    /// Records a press, matches it, and shadows other bindings on the key
    /// if it was consumed. Returns true if the event is suppressed.
    fn press(
        &mut self,
        host: &mut dyn Host,
        mods: ModMask,
        key: PressedKey,
        exempt: ShadowExempt,
    ) -> bool {
        // Second press of a key whose hold is already consumed
        let held_consumed = key.code != 0
            && self
                .state
                .pressed
                .iter()
                .any(|held| held.code == key.code && !held.forwarded);
        if held_consumed {
            debug!("Key {} pressed again while consumed, not matching", key.code);
            self.state.pressed.push(PressedKey {
                forwarded: false,
                ..key
            });
            return true;
        }

        self.state.pressed.push(key.clone());

        let suppress = !self.evaluate(host, mods, &key, true).pass_event;

        if suppress {
            self.recompute_shadows(exempt);
        }

        if let Some(record) = self.state.pressed.last_mut() {
            record.forwarded = !suppress;
        }

        suppress
    }

    /// Matches a release against every press record of the same key, so
    /// it sees the modifiers and submap of the press. Returns true if the
    /// event is suppressed.
    fn release<F>(&mut self, host: &mut dyn Host, mods: ModMask, key: PressedKey, same_key: F) -> bool
    where
        F: Fn(&PressedKey) -> bool,
    {
        let mut found = false;
        let mut suppress = false;
        let mut index = 0;

        while index < self.state.pressed.len() {
            if !same_key(&self.state.pressed[index]) {
                index += 1;
                continue;
            }

            let record = self.state.pressed.remove(index);
            self.evaluate(host, mods, &record, false);
            suppress = !record.forwarded;
            found = true;
        }

        if !found {
            error!("Release of a key that was never pressed; matching with the current modifiers");
            suppress = !self.evaluate(host, mods, &key, false).pass_event;
        }

        self.recompute_shadows(ShadowExempt::default());

        suppress
    }

    pub(crate) fn recompute_shadows(&mut self, exempt: ShadowExempt) {
        shadow_bindings(
            &mut self.registry,
            &self.state.pressed,
            &self.state.chords,
            exempt,
        );
    }

    /// VT switching and kill-mode escape. These run before any
    /// configured binding and always consume the key.
    fn handle_internal(&mut self, host: &mut dyn Host, sym: Keysym) -> bool {
        if let Some(vt) = sym.switch_vt_target() {
            if !host.has_vt_session() {
                return true;
            }

            if host.active_vt() == Some(vt) {
                return true;
            }

            info!("Switching from VT {:?} to VT {}", host.active_vt(), vt);
            host.switch_vt(vt);
            return true;
        }

        if sym == Keysym::ESCAPE && host.click_mode() == ClickMode::Kill {
            host.set_click_mode(ClickMode::Default);
            return true;
        }

        false
    }
}
