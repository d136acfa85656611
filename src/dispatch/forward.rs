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

//! src/dispatch/forward.rs
//!
//! Actions that echo input to another client
//!
//! Both move focus to the target, send the key or button edge matching the
//! invocation polarity, and restore the previous focus:
//! - `pass SELECTOR` re-sends the triggering input
//! - `sendshortcut MODS, KEY[, SELECTOR]` sends a different shortcut
//!
//! A direct invocation (no input edge) sends press and release back to back.

use tracing::error;

use crate::core::keysym::{Keysym, NameCase};
use crate::core::types::{mod_mask_from_str, Keycode, ModMask, EVDEV_OFFSET};
use crate::dispatch::selector::find_window;
use crate::dispatch::{ActionContext, DispatchResult, Dispatcher, Polarity};
use crate::engine::host::Host;

/// First pointer button code (`BTN_LEFT`)
const BTN_LEFT: u32 = 272;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Echo {
    /// XKB key code
    Key(Keycode),
    Button(u32),
}

fn send_echo(host: &mut dyn Host, time_ms: u32, echo: Echo, polarity: Polarity) {
    let edges: &[bool] = match polarity {
        Polarity::Press => &[true],
        Polarity::Release => &[false],
        Polarity::Direct => &[true, false],
    };

    for pressed in edges {
        match echo {
            Echo::Key(code) => host.send_key(time_ms, code.saturating_sub(EVDEV_OFFSET), *pressed),
            Echo::Button(button) => host.send_button(time_ms, button, *pressed),
        }
    }
}

fn failure(message: &str) -> DispatchResult {
    error!("{}", message);
    DispatchResult::failure(message)
}

/// `pass SELECTOR`
pub struct Pass;

impl Dispatcher for Pass {
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult {
        let Some(window) = find_window(&*ctx.host, args) else {
            return failure("pass: window not found");
        };

        if ctx.host.active_keyboard().is_none() {
            return failure("pass: no keyboard");
        }

        let input = ctx.input;
        let host = &mut *ctx.host;
        let previous_keyboard = host.keyboard_focus();
        let previous_pointer = host.pointer_focus();

        if input.is_keyboard() {
            host.set_keyboard_focus(Some(window));
        } else {
            host.set_pointer_focus(Some(window));
        }

        let mods = host.modifiers();
        host.send_modifiers(mods);

        let echo = if input.is_keyboard() {
            Echo::Key(input.keycode)
        } else {
            Echo::Button(input.button)
        };
        send_echo(host, input.time_ms, echo, ctx.polarity);

        if input.is_keyboard() {
            host.set_keyboard_focus(previous_keyboard);
        } else {
            host.set_pointer_focus(previous_pointer);
        }

        DispatchResult::ok()
    }
}

/// `sendshortcut MODS, KEY[, SELECTOR]`
pub struct SendShortcut;

impl SendShortcut {
    /// Resolves KEY the way bind lines classify keys
    fn resolve_key(ctx: &mut ActionContext<'_>, key: &str) -> Result<Echo, DispatchResult> {
        if let Ok(code) = key.parse::<u32>() {
            if code > 9 {
                return Ok(Echo::Key(code));
            }
        }

        if let Some(code) = key.strip_prefix("code:").and_then(|c| c.parse().ok()) {
            return Ok(Echo::Key(code));
        }

        if let Some(button) = key.strip_prefix("mouse:").and_then(|b| b.parse::<u32>().ok()) {
            if button < BTN_LEFT {
                return Err(failure("sendshortcut: invalid mouse button"));
            }
            return Ok(Echo::Button(button));
        }

        if ctx.host.active_keyboard().is_none() {
            return Err(failure("sendshortcut: no keyboard"));
        }

        // No reverse lookup in the keymap, so scan it once per name
        if let Some(code) = ctx.state.key_cache.get(key) {
            return Ok(Echo::Key(*code));
        }

        let sym = Keysym::from_name(key, NameCase::Insensitive);
        match ctx.translator.keycode_for(sym) {
            Some(code) => {
                ctx.state.key_cache.insert(key.to_string(), code);
                Ok(Echo::Key(code))
            }
            None => Err(failure("sendshortcut: key not found")),
        }
    }
}

impl Dispatcher for SendShortcut {
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult {
        let fields: Vec<&str> = args.splitn(3, ',').map(str::trim).collect();
        if fields.len() < 2 {
            return failure("sendshortcut: invalid args");
        }

        let mods: ModMask = mod_mask_from_str(fields[0]);
        let echo = match Self::resolve_key(ctx, fields[1]) {
            Ok(echo) => echo,
            Err(result) => return result,
        };

        if echo == Echo::Key(0) {
            return failure("sendshortcut: invalid key");
        }

        let is_mouse = matches!(echo, Echo::Button(_));
        let selector = fields.get(2).copied().unwrap_or_default();
        let host = &mut *ctx.host;
        let previous = if is_mouse {
            host.pointer_focus()
        } else {
            host.keyboard_focus()
        };

        let mut target = None;
        if !selector.is_empty() {
            let Some(window) = find_window(&*host, selector) else {
                return failure("sendshortcut: window not found");
            };

            if host.active_keyboard().is_none() {
                return failure("sendshortcut: no keyboard");
            }

            if is_mouse {
                host.set_pointer_focus(Some(window));
            } else {
                host.set_keyboard_focus(Some(window));
            }
            target = Some(window);
        }

        host.send_modifiers(mods);
        send_echo(host, ctx.input.time_ms, echo, ctx.polarity);
        host.send_modifiers(ModMask::empty());

        if target.is_some() {
            if is_mouse {
                host.set_pointer_focus(previous);
            } else {
                host.set_keyboard_focus(previous);
            }
        }

        DispatchResult::ok()
    }
}
