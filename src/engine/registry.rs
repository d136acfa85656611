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

//! src/engine/registry.rs
//!
//! Ordered binding storage
//!
//! Bindings are evaluated in registration order. Each entry gets a
//! `BindingId` that is never reused, so state holding an id (special
//! dispatches, repeat set, long-press timer) can re-validate it against
//! the registry instead of dangling after a reload.

use serde::Serialize;

use crate::core::types::{Binding, KeyIdentity, ModMask};

/// Stable handle to a registered binding
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct BindingId(u64);

/// A binding plus its transient shadow flag
#[derive(Clone, Debug, Serialize)]
pub struct BindingEntry {
    pub id: BindingId,
    pub binding: Binding,
    /// Recomputed after every consuming event
    pub shadowed: bool,
}

#[derive(Debug, Default)]
pub struct BindingRegistry {
    entries: Vec<BindingEntry>,
    next_id: u64,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a binding, returning its id
    pub fn add(&mut self, binding: Binding) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;

        self.entries.push(BindingEntry {
            id,
            binding,
            shadowed: false,
        });

        id
    }

    /// Removes every binding with this mask and key identity, returning how many went
    pub fn remove(&mut self, modmask: ModMask, key: &KeyIdentity) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.binding.modmask == modmask && &e.binding.key == key));
        before - self.entries.len()
    }

    /// Drops all bindings; ids keep counting up
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: BindingId) -> Option<&BindingEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: BindingId) -> bool {
        self.get(id).is_some()
    }

    /// True if any binding is registered under `submap`
    pub fn has_submap(&self, submap: &str) -> bool {
        self.entries.iter().any(|e| e.binding.submap == submap)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut BindingEntry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
