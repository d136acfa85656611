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

//! src/engine/submap.rs
//!
//! Submap switching

use tracing::{error, info};

use crate::dispatch::DispatchResult;
use crate::engine::host::{Host, Notification};
use crate::engine::registry::BindingRegistry;
use crate::engine::EngineState;

/// Submap name that returns to the default map
pub const RESET_SUBMAP: &str = "reset";

impl EngineState {
    /// Switches the active submap.
    ///
    /// Only submaps some binding is registered under can be entered.
    /// Any switch drops held chords, special dispatches, repeats and the
    /// pending long-press, since they may reference unreachable bindings.
    pub(crate) fn set_submap(
        &mut self,
        host: &mut dyn Host,
        bindings: &BindingRegistry,
        name: &str,
    ) -> DispatchResult {
        let target = if name == RESET_SUBMAP { "" } else { name };

        if !target.is_empty() && !bindings.has_submap(target) {
            let message = format!(
                "Cannot set submap {}, submap doesn't exist (wasn't registered!)",
                target
            );
            error!("{}", message);
            return DispatchResult::failure(message);
        }

        if target.is_empty() {
            info!("Reset active submap to the default one.");
        } else {
            info!("Changed keybind submap to {}", target);
        }

        self.submap = target.to_string();
        self.clear_transient();
        host.post_event(Notification::Submap(self.submap.clone()));

        DispatchResult::ok()
    }

    /// Drops state that refers to bindings by id
    pub(crate) fn clear_transient(&mut self) {
        self.chords.clear();
        self.special.clear();
        self.active_repeat.clear();
        self.long_press = None;
        self.timers.cancel_all();
    }
}
