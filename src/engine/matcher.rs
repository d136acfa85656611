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

//! src/engine/matcher.rs
//!
//! Binding evaluation
//!
//! One pass over the registry, in registration order, for one key edge.
//! A binding is considered when its filters pass (inhibitor, lock,
//! modifiers, submap, shadowing), its key matches, and the edge fits its
//! polarity. Matching bindings fire in order until a submap switch stops
//! the pass.

use tracing::{debug, error};

use crate::core::types::{format_mod_mask, keycode_to_modifier, Binding, KeyIdentity, ModMask};
use crate::dispatch::{ActionContext, DispatchResult, Polarity};
use crate::engine::chord::{ChordMatch, ChordSets};
use crate::engine::host::Host;
use crate::engine::input::PressedKey;
use crate::engine::KeybindEngine;

const INHIBITED: &str = "Keybind handling is disabled due to an inhibitor";

/// How a binding's key relates to the event
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum KeyMatch {
    No,
    /// Chord prefix held; consumes the event but does not fire
    Partial,
    Yes,
}

fn match_key(
    binding: &Binding,
    key: &PressedKey,
    chords: &ChordSets,
    submap: &str,
    found: bool,
) -> KeyMatch {
    if let KeyIdentity::Chord { .. } = binding.key {
        return match chords.matches(&binding.key) {
            ChordMatch::Full => KeyMatch::Yes,
            ChordMatch::Partial => KeyMatch::Partial,
            ChordMatch::None => KeyMatch::No,
        };
    }

    if let Some(name) = &key.name {
        return if binding.key.name() == Some(name.as_str()) {
            KeyMatch::Yes
        } else {
            KeyMatch::No
        };
    }

    let matched = match &binding.key {
        KeyIdentity::Code(code) => key.code == *code,
        // Only when nothing earlier matched, and never across a submap switch
        KeyIdentity::CatchAll => !found && key.submap_at_press == submap,
        _ => {
            if key.sym.is_no_symbol() {
                return KeyMatch::No;
            }

            match binding.key.resolve_symbol() {
                Some((exact, folded)) => key.sym == exact || key.sym == folded,
                None => false,
            }
        }
    };

    if matched {
        KeyMatch::Yes
    } else {
        KeyMatch::No
    }
}

/// Folds action results into the pass-level result
#[derive(Debug, Default)]
struct Outcome {
    pass_requested: bool,
    failed: bool,
    error: Option<String>,
}

impl Outcome {
    fn absorb(&mut self, result: &DispatchResult) {
        self.pass_requested |= result.pass_event;

        if !result.success {
            self.failed = true;
            if self.error.is_none() {
                self.error = result.error.clone();
            }
        }
    }
}

impl KeybindEngine {
    /// Evaluates every binding against one key edge.
    ///
    /// `modmask` is the live modifier state. Returns `pass_event: true`
    /// when nothing consumed the event or an action asked for it to be
    /// passed on.
    pub(crate) fn evaluate(
        &mut self,
        host: &mut dyn Host,
        modmask: ModMask,
        key: &PressedKey,
        pressed: bool,
    ) -> DispatchResult {
        let KeybindEngine {
            registry,
            dispatchers,
            translator,
            config,
            clock,
            state,
        } = self;

        let inhibited = !config.disable_keybind_grabbing && host.shortcuts_inhibited();
        let locked = host.session_locked();
        let now = clock.now_ms();

        state.chords.update(key.sym, key.code, pressed);

        let mut found = false;
        let mut outcome = Outcome::default();

        for entry in registry.iter() {
            let binding = &entry.binding;
            let special = binding.is_special();
            let special_triggered = state.special.contains(&entry.id);
            // A special press must always see its release
            let ignore_filters = special && !pressed && special_triggered;

            if inhibited && !binding.flags.bypass_inhibitor {
                continue;
            }

            if locked && !binding.flags.locked {
                continue;
            }

            if !ignore_filters
                && ((modmask != binding.modmask && !binding.flags.ignore_mods)
                    || binding.submap != state.submap
                    || entry.shadowed)
            {
                continue;
            }

            match match_key(binding, key, &state.chords, &state.submap, found) {
                KeyMatch::No => continue,
                KeyMatch::Partial => {
                    found = true;
                    continue;
                }
                KeyMatch::Yes => {
                    if let KeyIdentity::Chord { .. } = binding.key {
                        found = true;
                    }
                }
            }

            if pressed && binding.flags.release && !special {
                if !binding.flags.non_consuming {
                    found = true;
                }
                continue;
            }

            if !pressed {
                if key.modmask_at_press != modmask && !binding.flags.ignore_mods {
                    // Releasing the modifier the press itself added
                    if keycode_to_modifier(key.code) == key.modmask_at_press {
                        continue;
                    }
                    // A press-triggered binding under the new mask never fires
                    // on this key's release
                    if !binding.flags.release && !special {
                        continue;
                    }
                } else if !binding.flags.release && !special {
                    if !binding.flags.non_consuming {
                        found = true;
                    }
                    continue;
                }
            }

            if binding.flags.long_press {
                if let Some(keyboard) = host.active_keyboard() {
                    state.timers.arm_long_press(now + u64::from(keyboard.delay));
                    state.long_press = Some(entry.id);
                }
                continue;
            }

            if special_triggered && !pressed {
                state.special.retain(|id| *id != entry.id);
            } else if special && pressed {
                state.special.push(entry.id);
            }

            let Some(dispatcher) = dispatchers.get(binding.action_name()) else {
                error!(
                    "Invalid handler in a keybind! (handler {} does not exist)",
                    binding.action_name()
                );
                continue;
            };

            debug!(
                "Keybind triggered, calling dispatcher ({}, {}, {}, {})",
                format_mod_mask(modmask),
                key.name.as_deref().unwrap_or_default(),
                key.sym,
                binding.handler
            );

            let args = if binding.action_name() == "mouse" {
                format!("{}{}", if pressed { '1' } else { '0' }, binding.arg)
            } else {
                binding.arg.clone()
            };

            let result = {
                let mut ctx = ActionContext::new(
                    host,
                    Polarity::from_pressed(pressed),
                    registry,
                    state,
                    translator,
                );
                dispatcher.invoke(&mut ctx, &args)
            };

            outcome.absorb(&result);

            // Bindings after a submap switch belong to the old submap
            if binding.handler == "submap" && result.success {
                found = true;
                break;
            }

            if binding.flags.repeat {
                state.active_repeat.push(entry.id);
                if let Some(keyboard) = host.active_keyboard() {
                    state.timers.arm_repeat(now + u64::from(keyboard.delay));
                }
            }

            if !binding.flags.non_consuming {
                found = true;
            }
        }

        let mut result = DispatchResult {
            success: !outcome.failed,
            error: outcome.error,
            pass_event: !found || outcome.pass_requested,
        };

        if !found && inhibited {
            debug!("{}", INHIBITED);
            result.success = false;
            result.error.get_or_insert_with(|| INHIBITED.to_string());
        }

        result
    }
}
