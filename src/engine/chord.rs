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

//! src/engine/chord.rs
//!
//! Chord (multi-key) tracking

use std::collections::BTreeSet;

use crate::core::keysym::Keysym;
use crate::core::types::{keycode_to_modifier, KeyIdentity, Keycode};

/// How a configured chord relates to the keys currently held
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChordMatch {
    /// Held set equals the configured set
    Full,
    /// Held keys are a strict subset of the configured set
    Partial,
    /// Something held is not part of the chord
    None,
}

/// Classifies a configured set against a held set
pub fn classify(bound: &BTreeSet<Keysym>, held: &BTreeSet<Keysym>) -> ChordMatch {
    let bound_not_held = bound.difference(held).next().is_some();
    let held_not_bound = held.difference(bound).next().is_some();

    match (bound_not_held, held_not_bound) {
        (false, false) => ChordMatch::Full,
        (true, false) => ChordMatch::Partial,
        _ => ChordMatch::None,
    }
}

/// Symbols currently held, split by whether their key produces a modifier
#[derive(Debug, Default)]
pub struct ChordSets {
    pub mods: BTreeSet<Keysym>,
    pub keys: BTreeSet<Keysym>,
}

impl ChordSets {
    /// Records a press or release. Events without a symbol are ignored.
    pub fn update(&mut self, sym: Keysym, keycode: Keycode, pressed: bool) {
        if sym.is_no_symbol() {
            return;
        }

        let set = if keycode_to_modifier(keycode).is_empty() {
            &mut self.keys
        } else {
            &mut self.mods
        };

        if pressed {
            set.insert(sym);
        } else {
            set.remove(&sym);
        }
    }

    /// Modifier part must match fully before the key part is classified
    pub fn matches(&self, key: &KeyIdentity) -> ChordMatch {
        let KeyIdentity::Chord { mods, keys } = key else {
            return ChordMatch::None;
        };

        if classify(mods, &self.mods) != ChordMatch::Full {
            return ChordMatch::None;
        }

        classify(keys, &self.keys)
    }

    pub fn clear(&mut self) {
        self.mods.clear();
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(syms: &[char]) -> BTreeSet<Keysym> {
        syms.iter().map(|c| Keysym(*c as u32)).collect()
    }

    #[test]
    fn test_classification() {
        let chord = set(&['a', 'b']);

        assert_eq!(classify(&chord, &set(&['a'])), ChordMatch::Partial);
        assert_eq!(classify(&chord, &set(&['a', 'b'])), ChordMatch::Full);
        assert_eq!(classify(&chord, &set(&['a', 'b', 'c'])), ChordMatch::None);
        assert_eq!(classify(&chord, &set(&['c'])), ChordMatch::None);
    }

    #[test]
    fn test_modifier_keys_go_to_mod_set() {
        let mut sets = ChordSets::default();
        sets.update(Keysym::SUPER_L, 125 + 8, true);
        sets.update(Keysym('a' as u32), 30 + 8, true);

        assert!(sets.mods.contains(&Keysym::SUPER_L));
        assert!(sets.keys.contains(&Keysym('a' as u32)));

        sets.update(Keysym::SUPER_L, 125 + 8, false);
        assert!(sets.mods.is_empty());
    }

    #[test]
    fn test_no_symbol_is_never_recorded() {
        let mut sets = ChordSets::default();
        sets.update(Keysym::NO_SYMBOL, 0, true);

        assert!(sets.keys.is_empty() && sets.mods.is_empty());
    }

    #[test]
    fn test_modifier_part_must_be_full() {
        let mut sets = ChordSets::default();
        sets.update(Keysym('a' as u32), 38, true);

        let chord = KeyIdentity::Chord {
            mods: [Keysym::SUPER_L].into_iter().collect(),
            keys: set(&['a']),
        };
        assert_eq!(sets.matches(&chord), ChordMatch::None);

        sets.update(Keysym::SUPER_L, 133, true);
        assert_eq!(sets.matches(&chord), ChordMatch::Full);
    }
}
