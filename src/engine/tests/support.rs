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

//! Test fixtures: a recording host, a keyboard, and a harness that keeps
//! the host's modifier state in step with the keys it feeds the engine.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::{load_from_str, EngineConfig};
use crate::core::keysym::Keysym;
use crate::core::translator::SymbolTranslator;
use crate::core::types::{keycode_to_modifier, Keycode, ModMask, EVDEV_OFFSET};
use crate::dispatch::{DispatchResult, Polarity};
use crate::engine::host::*;
use crate::engine::input::{AxisEvent, AxisOrientation, AxisSource, ButtonEvent, KeyEvent};
use crate::engine::mouse::MouseBindMode;
use crate::engine::timers::{Clock, ManualClock};
use crate::engine::{Disposition, KeybindEngine};

// evdev key codes
pub const KEY_ESC: u32 = 1;
pub const KEY_1: u32 = 2;
pub const KEY_Q: u32 = 16;
pub const KEY_R: u32 = 19;
pub const KEY_A: u32 = 30;
pub const KEY_S: u32 = 31;
pub const KEY_D: u32 = 32;
pub const KEY_G: u32 = 34;
pub const KEY_X: u32 = 45;
pub const KEY_Z: u32 = 44;
pub const KEY_LEFTSHIFT: u32 = 42;
pub const KEY_F1: u32 = 59;
pub const KEY_F2: u32 = 60;
pub const KEY_F3: u32 = 61;
pub const KEY_F9: u32 = 67;
pub const KEY_F10: u32 = 68;
pub const KEY_LEFT: u32 = 105;
pub const KEY_LEFTMETA: u32 = 125;

pub const BTN_LEFT: u32 = 272;

/// Actions the harness records instead of performing
const RECORDED_ACTIONS: &[&str] = &[
    "exec",
    "killactive",
    "workspace",
    "movetoworkspace",
    "resizeactive",
];

/// Something the engine sent to a client
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Sent {
    Modifiers(ModMask),
    Key { keycode: Keycode, pressed: bool },
    Button { button: u32, pressed: bool },
}

pub struct TestHost {
    pub mods: ModMask,
    pub keyboard: Option<RepeatInfo>,
    pub active: bool,
    pub locked: bool,
    pub inhibited: bool,
    pub vt_session: bool,
    pub active_vt: Option<u32>,
    pub vt_switches: Vec<u32>,
    pub click_mode: ClickMode,
    pub windows: Vec<WindowInfo>,
    pub active_window: Option<WindowId>,
    pub under_cursor: Option<WindowId>,
    pub drags: Vec<(WindowId, MouseBindMode)>,
    pub drag_ends: usize,
    pub keyboard_focus: Option<WindowId>,
    pub pointer_focus: Option<WindowId>,
    pub sent: Vec<Sent>,
    pub events: Vec<Notification>,
    pub errors: Vec<String>,
    pub taken: Vec<(String, String)>,
    pub globals: Vec<(String, String, bool)>,
}

impl Default for TestHost {
    fn default() -> Self {
        Self {
            mods: ModMask::empty(),
            keyboard: Some(RepeatInfo::default()),
            active: true,
            locked: false,
            inhibited: false,
            vt_session: false,
            active_vt: None,
            vt_switches: Vec::new(),
            click_mode: ClickMode::Default,
            windows: Vec::new(),
            active_window: None,
            under_cursor: None,
            drags: Vec::new(),
            drag_ends: 0,
            keyboard_focus: None,
            pointer_focus: None,
            sent: Vec::new(),
            events: Vec::new(),
            errors: Vec::new(),
            taken: Vec::new(),
            globals: Vec::new(),
        }
    }
}

impl Session for TestHost {
    fn session_active(&self) -> bool {
        self.active
    }

    fn session_locked(&self) -> bool {
        self.locked
    }

    fn shortcuts_inhibited(&self) -> bool {
        self.inhibited
    }

    fn has_vt_session(&self) -> bool {
        self.vt_session
    }

    fn active_vt(&self) -> Option<u32> {
        self.active_vt
    }

    fn switch_vt(&mut self, vt: u32) {
        self.vt_switches.push(vt);
        self.active_vt = Some(vt);
    }

    fn click_mode(&self) -> ClickMode {
        self.click_mode
    }

    fn set_click_mode(&mut self, mode: ClickMode) {
        self.click_mode = mode;
    }
}

impl Seat for TestHost {
    fn modifiers(&self) -> ModMask {
        self.mods
    }

    fn active_keyboard(&self) -> Option<RepeatInfo> {
        self.keyboard
    }

    fn keyboard_focus(&self) -> Option<WindowId> {
        self.keyboard_focus
    }

    fn pointer_focus(&self) -> Option<WindowId> {
        self.pointer_focus
    }

    fn set_keyboard_focus(&mut self, window: Option<WindowId>) {
        self.keyboard_focus = window;
    }

    fn set_pointer_focus(&mut self, window: Option<WindowId>) {
        self.pointer_focus = window;
    }

    fn send_modifiers(&mut self, mods: ModMask) {
        self.sent.push(Sent::Modifiers(mods));
    }

    fn send_key(&mut self, _time_ms: u32, keycode: Keycode, pressed: bool) {
        self.sent.push(Sent::Key { keycode, pressed });
    }

    fn send_button(&mut self, _time_ms: u32, button: u32, pressed: bool) {
        self.sent.push(Sent::Button { button, pressed });
    }
}

impl WindowRegistry for TestHost {
    fn windows(&self) -> Vec<WindowInfo> {
        self.windows.clone()
    }

    fn active_window(&self) -> Option<WindowId> {
        self.active_window
    }

    fn window_at_cursor(&self) -> Option<WindowId> {
        self.under_cursor
    }

    fn begin_drag(&mut self, window: WindowId, mode: MouseBindMode) {
        self.drags.push((window, mode));
    }

    fn end_drag(&mut self) {
        self.drag_ends += 1;
    }

    fn set_pinned(&mut self, window: WindowId, pinned: bool) {
        if let Some(info) = self.windows.iter_mut().find(|w| w.id == window) {
            info.pinned = pinned;
        }
    }
}

impl EventSink for TestHost {
    fn post_event(&mut self, notification: Notification) {
        self.events.push(notification);
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

impl GlobalShortcuts for TestHost {
    fn is_taken(&self, app_id: &str, name: &str) -> bool {
        self.taken.iter().any(|(a, n)| a == app_id && n == name)
    }

    fn send_global(&mut self, app_id: &str, name: &str, pressed: bool) {
        self.globals.push((app_id.to_string(), name.to_string(), pressed));
    }
}

/// Keyboard on the default layout, with optional per-key device symbols
#[derive(Default)]
pub struct TestKeyboard {
    pub device_overrides: HashMap<Keycode, Keysym>,
    translator: SymbolTranslator,
}

impl Keyboard for TestKeyboard {
    fn device_sym(&self, keycode: Keycode) -> Keysym {
        self.device_overrides
            .get(&keycode)
            .copied()
            .unwrap_or_else(|| self.translator.resolve(keycode))
    }
}

/// One recorded action invocation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fired {
    pub action: String,
    pub args: String,
    pub polarity: Polarity,
}

pub struct Harness {
    pub engine: KeybindEngine,
    pub host: TestHost,
    pub keyboard: TestKeyboard,
    pub clock: ManualClock,
    fired: Rc<RefCell<Vec<Fired>>>,
}

impl Harness {
    pub fn new(config: &str) -> Self {
        let loaded = load_from_str(config).unwrap();
        Self::with_config(config, loaded.config)
    }

    /// Uses `engine_config` instead of the options in `config`
    pub fn with_config(config: &str, engine_config: EngineConfig) -> Self {
        let loaded = load_from_str(config).unwrap();
        let clock = ManualClock::new();
        let mut engine = KeybindEngine::new(engine_config, Box::new(clock.clone()));
        let fired = Rc::new(RefCell::new(Vec::new()));

        for action in RECORDED_ACTIONS {
            let log = Rc::clone(&fired);
            let name = action.to_string();
            engine.dispatchers_mut().register_fn(action, move |ctx, args| {
                log.borrow_mut().push(Fired {
                    action: name.clone(),
                    args: args.to_string(),
                    polarity: ctx.polarity,
                });
                DispatchResult::ok()
            });
        }

        engine.reload(loaded.bindings);

        Self {
            engine,
            host: TestHost::default(),
            keyboard: TestKeyboard::default(),
            clock,
            fired,
        }
    }

    pub fn press(&mut self, key: u32) -> Disposition {
        self.key(key, true)
    }

    pub fn release(&mut self, key: u32) -> Disposition {
        self.key(key, false)
    }

    /// Press then release
    pub fn tap(&mut self, key: u32) -> (Disposition, Disposition) {
        (self.press(key), self.release(key))
    }

    /// Feeds a key edge, then updates modifiers the way the seat would:
    /// the engine sees the state from before the key.
    fn key(&mut self, key: u32, pressed: bool) -> Disposition {
        let event = KeyEvent {
            keycode: key,
            pressed,
            time_ms: self.clock.now_ms() as u32,
        };
        let disposition = self.engine.handle_key(&mut self.host, &self.keyboard, event);

        let modifier = keycode_to_modifier(key.saturating_add(EVDEV_OFFSET));
        if pressed {
            self.host.mods |= modifier;
        } else {
            self.host.mods &= !modifier;
        }

        disposition
    }

    pub fn button(&mut self, button: u32, pressed: bool) -> Disposition {
        let event = ButtonEvent {
            button,
            pressed,
            time_ms: self.clock.now_ms() as u32,
        };
        self.engine.handle_button(&mut self.host, event)
    }

    pub fn scroll(&mut self, orientation: AxisOrientation, delta: f64) -> Disposition {
        let event = AxisEvent {
            source: AxisSource::Wheel,
            orientation,
            delta,
        };
        self.engine.handle_axis(&mut self.host, event)
    }

    pub fn switch(&mut self, name: &str, on: bool) {
        self.engine.handle_switch(&mut self.host, name, on);
    }

    /// Moves the clock forward and fires due timers
    pub fn advance(&mut self, ms: u64) {
        self.clock.advance(ms);
        self.engine.dispatch_timers(&mut self.host);
    }

    pub fn invoke(&mut self, name: &str, args: &str) -> DispatchResult {
        self.engine.invoke(&mut self.host, name, args)
    }

    pub fn fired(&self) -> Vec<Fired> {
        self.fired.borrow().clone()
    }

    /// `action args` of every recorded invocation, in order
    pub fn fired_names(&self) -> Vec<String> {
        self.fired
            .borrow()
            .iter()
            .map(|f| format!("{} {}", f.action, f.args).trim().to_string())
            .collect()
    }
}
