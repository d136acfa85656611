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

//! src/engine/host.rs
//!
//! Collaborator interfaces the engine needs from the compositor
//!
//! The engine never owns windows, devices or protocol objects. Everything
//! outside the matching state machine is reached through these traits:
//! - `Session`: session activity, lock state, inhibitors, VT switching
//! - `Seat`: modifier state, keyboard repeat info, focus, raw key echoes
//! - `WindowRegistry`: window lookup by identifier, drag hooks
//! - `EventSink`: notifications and user-visible errors
//! - `GlobalShortcuts`: the registry of claimed (app id, name) pairs
//!
//! Windows are only ever referred to by `WindowId`, resolved fresh on
//! every use; a stale id resolves to "not found".

use serde::Serialize;
use std::fmt;

use crate::core::keysym::Keysym;
use crate::core::types::{Keycode, ModMask};
use crate::engine::mouse::MouseBindMode;

/// Opaque window identifier
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// Snapshot of the window properties selectors can match on
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub class: String,
    pub title: String,
    pub initial_class: String,
    pub initial_title: String,
    pub pid: u32,
    pub floating: bool,
    pub fullscreen: bool,
    pub pinned: bool,
}

impl WindowInfo {
    pub fn new(id: u64, class: &str, title: &str) -> Self {
        Self {
            id: WindowId(id),
            class: class.to_string(),
            title: title.to_string(),
            initial_class: class.to_string(),
            initial_title: title.to_string(),
            ..Default::default()
        }
    }
}

/// Keyboard repeat configuration of the active keyboard
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RepeatInfo {
    /// Repeats per second; 0 disables repeating
    pub rate: u32,
    /// Milliseconds before the first repeat (and the long-press threshold)
    pub delay: u32,
}

impl Default for RepeatInfo {
    fn default() -> Self {
        Self {
            rate: 25,
            delay: 600,
        }
    }
}

/// Pointer click mode
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ClickMode {
    #[default]
    Default,
    /// Next click kills the window under the cursor
    Kill,
}

/// Notifications delivered to the external event channel
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum Notification {
    Submap(String),
    LockGroups(bool),
    Pin { window: WindowId, pinned: bool },
    Custom(String),
}

impl fmt::Display for Notification {
    /// IPC socket form, `name>>data`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Submap(name) => write!(f, "submap>>{}", name),
            Notification::LockGroups(locked) => write!(f, "lockgroups>>{}", u8::from(*locked)),
            Notification::Pin { window, pinned } => {
                write!(f, "pin>>{},{}", window, u8::from(*pinned))
            }
            Notification::Custom(payload) => write!(f, "custom>>{}", payload),
        }
    }
}

/// Session and protocol state, consumed as boolean queries
pub trait Session {
    fn session_active(&self) -> bool {
        true
    }

    /// Compositor is in an unsafe state (e.g. all outputs lost)
    fn unsafe_state(&self) -> bool {
        false
    }

    fn session_locked(&self) -> bool;

    /// A client holds an active keyboard-shortcuts inhibitor
    fn shortcuts_inhibited(&self) -> bool;

    /// Whether a logind/seatd session capable of VT switching exists
    fn has_vt_session(&self) -> bool {
        false
    }

    fn active_vt(&self) -> Option<u32> {
        None
    }

    fn switch_vt(&mut self, vt: u32);

    fn click_mode(&self) -> ClickMode;

    fn set_click_mode(&mut self, mode: ClickMode);
}

/// Input seat: modifiers, keyboards, focus and raw event echoes
pub trait Seat {
    /// Modifiers accumulated from all keyboards
    fn modifiers(&self) -> ModMask;

    /// Repeat configuration of the active keyboard, `None` when no keyboard is attached
    fn active_keyboard(&self) -> Option<RepeatInfo>;

    fn keyboard_focus(&self) -> Option<WindowId>;

    fn pointer_focus(&self) -> Option<WindowId>;

    fn set_keyboard_focus(&mut self, window: Option<WindowId>);

    fn set_pointer_focus(&mut self, window: Option<WindowId>);

    fn send_modifiers(&mut self, mods: ModMask);

    /// Sends a key to the focused client; `keycode` is an evdev code
    fn send_key(&mut self, time_ms: u32, keycode: Keycode, pressed: bool);

    fn send_button(&mut self, time_ms: u32, button: u32, pressed: bool);
}

/// Window lookup and drag hooks
pub trait WindowRegistry {
    fn windows(&self) -> Vec<WindowInfo>;

    fn active_window(&self) -> Option<WindowId>;

    /// Window under the pointer, if any
    fn window_at_cursor(&self) -> Option<WindowId>;

    fn begin_drag(&mut self, window: WindowId, mode: MouseBindMode);

    fn end_drag(&mut self);

    fn set_pinned(&mut self, window: WindowId, pinned: bool);

    fn window(&self, id: WindowId) -> Option<WindowInfo> {
        self.windows().into_iter().find(|w| w.id == id)
    }
}

/// External event channel
pub trait EventSink {
    fn post_event(&mut self, notification: Notification);

    /// User-visible, non-fatal error (shown as a notification by the compositor)
    fn report_error(&mut self, message: &str);
}

/// Registry of global shortcuts claimed by clients
pub trait GlobalShortcuts {
    fn is_taken(&self, app_id: &str, name: &str) -> bool;

    fn send_global(&mut self, app_id: &str, name: &str, pressed: bool);
}

/// Everything the engine talks to, as one object
pub trait Host: Session + Seat + WindowRegistry + EventSink + GlobalShortcuts {}

impl<T: Session + Seat + WindowRegistry + EventSink + GlobalShortcuts> Host for T {}

/// Per-device symbol resolution for the keyboard that produced an event
pub trait Keyboard {
    /// Symbol under the device's own state, used for VT switching and Escape handling
    fn device_sym(&self, keycode: Keycode) -> Keysym;

    /// Symbol to match bindings with when the device resolves binds by its own
    /// layout; `None` means use the shared translator
    fn bind_sym(&self, _keycode: Keycode) -> Option<Keysym> {
        None
    }
}
