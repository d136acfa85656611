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

//! src/dispatch/builtins.rs
//!
//! Engine-owned actions
//!
//! These act on engine state (submap, drag mode, group lock) or on the
//! notification channel, so they are registered by default.

use tracing::{debug, error};

use crate::dispatch::selector::find_window;
use crate::dispatch::{ActionContext, DispatchResult, Dispatcher, Polarity};
use crate::engine::host::Notification;
use crate::engine::mouse::MouseBindMode;

/// `submap NAME` / `submap reset`
pub struct SetSubmap;

impl Dispatcher for SetSubmap {
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult {
        ctx.state.set_submap(&mut *ctx.host, ctx.bindings, args.trim())
    }
}

/// Drag bindings (`bindm`); the argument is prefixed with `1` on press and `0` on release
pub struct MouseDrag;

impl Dispatcher for MouseDrag {
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult {
        let pressed = args.starts_with('1');
        if !pressed {
            return ctx.state.mouse.change_mode(&mut *ctx.host, MouseBindMode::Idle);
        }

        let mut parts = args.get(1..).unwrap_or_default().splitn(2, ' ');
        let action = parts.next().unwrap_or_default();

        let mode = if action == "movewindow" {
            MouseBindMode::Move
        } else {
            match parts.next().and_then(|ratio| ratio.trim().parse::<i32>().ok()) {
                Some(1) => MouseBindMode::ResizeForceRatio,
                Some(2) => MouseBindMode::ResizeBlockRatio,
                _ => MouseBindMode::Resize,
            }
        };

        ctx.state.mouse.change_mode(&mut *ctx.host, mode)
    }
}

/// `global APPID:NAME`
pub struct Global;

impl Dispatcher for Global {
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult {
        let (app_id, name) = args.split_once(':').unwrap_or((args, args));

        if name.is_empty() || !ctx.host.is_taken(app_id, name) {
            return DispatchResult::ok();
        }

        // Direct invocations count as a press
        let pressed = ctx.polarity != Polarity::Release;
        debug!("Global shortcut {}:{} pressed={}", app_id, name, pressed);
        ctx.host.send_global(app_id, name, pressed);

        DispatchResult::ok()
    }
}

/// `event PAYLOAD`
pub struct Event;

impl Dispatcher for Event {
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult {
        ctx.host.post_event(Notification::Custom(args.to_string()));
        DispatchResult::ok()
    }
}

/// `lockgroups lock|unlock|toggle`
pub struct LockGroups;

impl Dispatcher for LockGroups {
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult {
        let locked = match args.trim() {
            "" | "lock" | "lockgroups" => true,
            "toggle" => !ctx.state.groups_locked,
            _ => false,
        };

        ctx.state.groups_locked = locked;
        ctx.host.post_event(Notification::LockGroups(locked));

        DispatchResult::ok()
    }
}

/// `pin [SELECTOR]`: toggles pinning of a floating window
pub struct Pin;

impl Dispatcher for Pin {
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult {
        let args = args.trim();
        let target = if args != "active" && args.len() > 1 {
            find_window(&*ctx.host, args)
        } else {
            ctx.host.active_window()
        };

        let Some(info) = target.and_then(|id| ctx.host.window(id)) else {
            error!("pin: window not found");
            return DispatchResult::failure("pin: window not found");
        };

        if !info.floating || info.fullscreen {
            return DispatchResult::ok();
        }

        let pinned = !info.pinned;
        ctx.host.set_pinned(info.id, pinned);
        ctx.host.post_event(Notification::Pin {
            window: info.id,
            pinned,
        });

        DispatchResult::ok()
    }
}
