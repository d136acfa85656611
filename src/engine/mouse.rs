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

//! src/engine/mouse.rs
//!
//! Mouse-bind (drag) mode
//!
//! Drags start only from `Idle` and only over a window; they end only from
//! a drag state. The rest of the compositor reads the mode to decide how
//! pointer motion is interpreted.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::dispatch::DispatchResult;
use crate::engine::host::{Host, WindowId};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseBindMode {
    #[default]
    Idle,
    Move,
    Resize,
    /// Resize keeping the aspect ratio
    ResizeForceRatio,
    /// Resize ignoring any forced aspect ratio
    ResizeBlockRatio,
}

impl fmt::Display for MouseBindMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MouseBindMode::Idle => "idle",
            MouseBindMode::Move => "move",
            MouseBindMode::Resize => "resize",
            MouseBindMode::ResizeForceRatio => "resize-force-ratio",
            MouseBindMode::ResizeBlockRatio => "resize-block-ratio",
        };
        write!(f, "{}", name)
    }
}

/// Drag state: the mode plus the window being dragged
#[derive(Debug, Default)]
pub struct MouseBinds {
    pub mode: MouseBindMode,
    pub dragged: Option<WindowId>,
}

impl MouseBinds {
    /// Transitions the drag state machine.
    ///
    /// Starting a drag with no window under the cursor leaves the mode
    /// idle and asks for the event to be passed through.
    pub fn change_mode(&mut self, host: &mut dyn Host, mode: MouseBindMode) -> DispatchResult {
        if mode != MouseBindMode::Idle {
            if self.dragged.is_some() || self.mode != MouseBindMode::Idle {
                return DispatchResult::ok();
            }

            let Some(window) = host.window_at_cursor() else {
                return DispatchResult::pass();
            };

            debug!("Starting {} drag on window {}", mode, window);
            self.dragged = Some(window);
            self.mode = mode;
            host.begin_drag(window, mode);
        } else {
            if self.dragged.is_none() || self.mode == MouseBindMode::Idle {
                return DispatchResult::ok();
            }

            debug!("Ending {} drag", self.mode);
            host.end_drag();
            self.mode = MouseBindMode::Idle;
            self.dragged = None;
        }

        DispatchResult::ok()
    }

    /// Ends a drag that is still in progress when a new key or button
    /// event arrives. Returns true if one was active.
    pub fn interrupt(&mut self, host: &mut dyn Host) -> bool {
        let Some(window) = self.dragged else {
            return false;
        };

        if host.window(window).is_none() {
            // Window went away mid-drag
            self.dragged = None;
            self.mode = MouseBindMode::Idle;
            return false;
        }

        self.change_mode(host, MouseBindMode::Idle);
        true
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some() && self.mode != MouseBindMode::Idle
    }
}
