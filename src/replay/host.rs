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

//! src/replay/host.rs
//!
//! Simulated compositor for script replays
//!
//! Holds just enough seat and window state for bindings to behave, and
//! appends everything the engine does to the shared replay log.

use crate::core::keysym::Keysym;
use crate::core::translator::{LayoutSpec, SymbolTranslator};
use crate::core::types::{format_mod_mask, Keycode, ModMask, EVDEV_OFFSET};
use crate::engine::host::*;
use crate::engine::mouse::MouseBindMode;
use tracing::debug;

use super::{Record, ReplayLog};

pub struct ConsoleHost {
    pub mods: ModMask,
    pub locked: bool,
    pub inhibited: bool,
    pub repeat: RepeatInfo,
    windows: Vec<WindowInfo>,
    active: Option<WindowId>,
    keyboard_focus: Option<WindowId>,
    pointer_focus: Option<WindowId>,
    click_mode: ClickMode,
    active_vt: Option<u32>,
    log: ReplayLog,
}

impl ConsoleHost {
    pub fn new(log: ReplayLog) -> Self {
        Self {
            mods: ModMask::empty(),
            locked: false,
            inhibited: false,
            repeat: RepeatInfo::default(),
            windows: Vec::new(),
            active: None,
            keyboard_focus: None,
            pointer_focus: None,
            click_mode: ClickMode::Default,
            active_vt: Some(1),
            log,
        }
    }

    /// Adds a window and gives it focus; the pointer rests on it too
    pub fn add_window(&mut self, id: u64, class: &str) {
        let window = WindowInfo::new(id, class, class);
        let id = window.id;
        self.windows.retain(|w| w.id != id);
        self.windows.push(window);
        self.active = Some(id);
        self.keyboard_focus = Some(id);
        self.pointer_focus = Some(id);
    }

    fn record(&self, record: Record) {
        self.log.borrow_mut().push(record);
    }
}

impl Session for ConsoleHost {
    fn session_locked(&self) -> bool {
        self.locked
    }

    fn shortcuts_inhibited(&self) -> bool {
        self.inhibited
    }

    fn has_vt_session(&self) -> bool {
        true
    }

    fn active_vt(&self) -> Option<u32> {
        self.active_vt
    }

    fn switch_vt(&mut self, vt: u32) {
        self.active_vt = Some(vt);
        self.record(Record::VtSwitch { vt });
    }

    fn click_mode(&self) -> ClickMode {
        self.click_mode
    }

    fn set_click_mode(&mut self, mode: ClickMode) {
        self.click_mode = mode;
    }
}

impl Seat for ConsoleHost {
    fn modifiers(&self) -> ModMask {
        self.mods
    }

    fn active_keyboard(&self) -> Option<RepeatInfo> {
        Some(self.repeat)
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
        self.record(Record::Modifiers {
            mods: format_mod_mask(mods),
        });
    }

    fn send_key(&mut self, _time_ms: u32, keycode: Keycode, pressed: bool) {
        self.record(Record::Key {
            keycode,
            pressed,
            window: self.keyboard_focus,
        });
    }

    fn send_button(&mut self, _time_ms: u32, button: u32, pressed: bool) {
        self.record(Record::Button {
            button,
            pressed,
            window: self.pointer_focus,
        });
    }
}

impl WindowRegistry for ConsoleHost {
    fn windows(&self) -> Vec<WindowInfo> {
        self.windows.clone()
    }

    fn active_window(&self) -> Option<WindowId> {
        self.active
    }

    fn window_at_cursor(&self) -> Option<WindowId> {
        self.pointer_focus
    }

    fn begin_drag(&mut self, window: WindowId, mode: MouseBindMode) {
        self.record(Record::Drag { window, mode });
    }

    fn end_drag(&mut self) {
        self.record(Record::DragEnd);
    }

    fn set_pinned(&mut self, window: WindowId, pinned: bool) {
        if let Some(info) = self.windows.iter_mut().find(|w| w.id == window) {
            info.pinned = pinned;
        }
    }
}

impl EventSink for ConsoleHost {
    fn post_event(&mut self, notification: Notification) {
        self.record(Record::Event {
            event: notification.to_string(),
        });
    }

    fn report_error(&mut self, message: &str) {
        self.record(Record::Error {
            message: message.to_string(),
        });
    }
}

impl GlobalShortcuts for ConsoleHost {
    /// Every shortcut counts as claimed so global bindings show up in the log
    fn is_taken(&self, _app_id: &str, _name: &str) -> bool {
        true
    }

    fn send_global(&mut self, app_id: &str, name: &str, pressed: bool) {
        self.record(Record::Global {
            app_id: app_id.to_string(),
            name: name.to_string(),
            pressed,
        });
    }
}

/// Keyboard resolving device symbols through its own copy of the layout
#[derive(Default)]
pub struct ReplayKeyboard {
    translator: SymbolTranslator,
}

impl ReplayKeyboard {
    pub fn new(layout: &LayoutSpec) -> Self {
        let mut translator = SymbolTranslator::new();
        // The engine reports layout errors; a failed build keeps the default layout
        if let Err(e) = translator.rebuild(layout) {
            debug!("Replay keyboard keeps the default layout: {}", e);
        }
        Self { translator }
    }

    /// evdev code producing `sym`, if the layout has one
    pub fn evdev_for(&self, sym: Keysym) -> Option<Keycode> {
        self.translator
            .keycode_for(sym)
            .and_then(|code| code.checked_sub(EVDEV_OFFSET))
    }
}

impl Keyboard for ReplayKeyboard {
    fn device_sym(&self, keycode: Keycode) -> Keysym {
        self.translator.resolve(keycode)
    }
}
