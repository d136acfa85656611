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

//! src/engine/shadow.rs
//!
//! Binding shadowing
//!
//! Once a binding has consumed a key, other bindings on the same physical
//! key are disabled until it is released, so holding the key and changing
//! modifiers cannot fire a second binding.

use crate::core::keysym::{Keysym, NameCase};
use crate::core::types::{KeyIdentity, Keycode};
use crate::engine::chord::{ChordMatch, ChordSets};
use crate::engine::input::PressedKey;
use crate::engine::registry::BindingRegistry;

/// Key exempt from shadowing during a recompute (the one just pressed)
#[derive(Clone, Copy, Debug, Default)]
pub struct ShadowExempt {
    pub sym: Keysym,
    pub code: Keycode,
}

/// Recomputes every binding's `shadowed` flag from the held keys
pub fn shadow_bindings(
    registry: &mut BindingRegistry,
    pressed: &[PressedKey],
    chords: &ChordSets,
    exempt: ShadowExempt,
) {
    for entry in registry.iter_mut() {
        let binding = &entry.binding;

        if binding.handler == "global" || binding.flags.transparent {
            continue;
        }

        let shadow = if let KeyIdentity::Chord { .. } = binding.key {
            chords.matches(&binding.key) == ChordMatch::Full
        } else {
            key_is_held(&binding.key, pressed, exempt)
        };

        entry.shadowed = shadow;
    }
}

fn key_is_held(key: &KeyIdentity, pressed: &[PressedKey], exempt: ShadowExempt) -> bool {
    let bound_sym = match key {
        KeyIdentity::Symbol(name) => Keysym::from_name(name, NameCase::Insensitive),
        _ => Keysym::NO_SYMBOL,
    };
    let bound_upper = bound_sym.to_upper();
    let bound_code = match key {
        KeyIdentity::Code(code) => *code,
        _ => 0,
    };

    let mut shadow = false;

    for held in pressed {
        if !held.sym.is_no_symbol() && (held.sym == bound_sym || held.sym == bound_upper) {
            shadow = true;

            if held.sym == exempt.sym && !exempt.sym.is_no_symbol() {
                return false;
            }
        }

        if held.code != 0 && held.code == bound_code {
            shadow = true;

            if held.code == exempt.code && exempt.code != 0 {
                return false;
            }
        }
    }

    shadow
}
