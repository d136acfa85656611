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

//! src/engine/mod.rs
//!
//! The keybind engine
//!
//! `KeybindEngine` owns the binding registry, the action table, the symbol
//! translator and all per-session matching state. The compositor side is
//! reached only through the traits in [`host`].
//!
//! # Architecture
//! - `input`: raw event entry points (keys, buttons, scroll, switches)
//! - `matcher`: one evaluation pass over the registry
//! - `shadow`: disables bindings on keys another binding consumed
//! - `chord`: held-symbol sets for multi-key bindings
//! - `submap`: active submap switching
//! - `timers`: long-press and repeat deadlines
//! - `mouse`: drag mode state machine
//!
//! The engine is single-threaded; every entry point takes `&mut self`.
//!
//! # Example
//!
//! ```
//! use hypr_bind_engine::config::EngineConfig;
//! use hypr_bind_engine::core::parser::parse_bind_line;
//! use hypr_bind_engine::engine::KeybindEngine;
//!
//! let mut engine = KeybindEngine::with_system_clock(EngineConfig::default());
//! let binding = parse_bind_line("bind = SUPER, Q, killactive", "").unwrap();
//! engine.add_binding(binding);
//!
//! assert_eq!(engine.bindings().len(), 1);
//! assert_eq!(engine.current_submap(), "");
//! ```

pub mod chord;
pub mod host;
pub mod input;
pub mod matcher;
pub mod mouse;
pub mod registry;
pub mod shadow;
pub mod submap;
pub mod timers;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use tracing::{debug, error};

use crate::config::EngineConfig;
use crate::core::translator::{LayoutSpec, SymbolTranslator, TranslatorError};
use crate::core::types::{Binding, KeyIdentity, Keycode, ModMask};
use crate::dispatch::{ActionContext, DispatchResult, DispatcherRegistry, LastInput, Polarity};
use crate::engine::chord::ChordSets;
use crate::engine::host::Host;
use crate::engine::input::PressedKey;
use crate::engine::mouse::{MouseBindMode, MouseBinds};
use crate::engine::registry::{BindingId, BindingRegistry};
use crate::engine::timers::{Clock, SystemClock, Timers};

pub use input::{AxisEvent, AxisOrientation, AxisSource, ButtonEvent, Disposition, KeyEvent};

/// Mutable matching state. Actions see it through `ActionContext`.
#[derive(Debug, Default)]
pub struct EngineState {
    /// Active submap; empty is the default map
    pub(crate) submap: String,
    pub(crate) pressed: Vec<PressedKey>,
    pub(crate) chords: ChordSets,
    /// Special-kind bindings whose press fired and whose release has not
    pub(crate) special: Vec<BindingId>,
    pub(crate) active_repeat: Vec<BindingId>,
    pub(crate) long_press: Option<BindingId>,
    pub(crate) timers: Timers,
    pub(crate) mouse: MouseBinds,
    pub(crate) input: LastInput,
    pub(crate) last_scroll_ms: Option<u64>,
    /// Symbol name → key code, for `sendshortcut`
    pub(crate) key_cache: HashMap<String, Keycode>,
    pub(crate) groups_locked: bool,
}

pub struct KeybindEngine {
    pub(crate) registry: BindingRegistry,
    pub(crate) dispatchers: DispatcherRegistry,
    pub(crate) translator: SymbolTranslator,
    pub(crate) config: EngineConfig,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) state: EngineState,
}

impl KeybindEngine {
    /// Creates an engine with the built-in actions registered and the
    /// translator compiled from `config.layout`.
    pub fn new(config: EngineConfig, clock: Box<dyn Clock>) -> Self {
        let mut translator = SymbolTranslator::new();
        if let Err(e) = translator.rebuild(&config.layout) {
            error!("{}", e);
        }

        Self {
            registry: BindingRegistry::new(),
            dispatchers: DispatcherRegistry::with_builtins(),
            translator,
            config,
            clock,
            state: EngineState::default(),
        }
    }

    pub fn with_system_clock(config: EngineConfig) -> Self {
        Self::new(config, Box::new(SystemClock::new()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the engine options, recompiling the layout if it changed
    pub fn apply_config(&mut self, host: &mut dyn Host, config: EngineConfig) {
        let layout_changed = config.layout != self.config.layout;
        let layout = config.layout.clone();
        self.config = config;

        if layout_changed {
            // Already reported to the host; the default layout stays usable
            if let Err(e) = self.set_layout(host, &layout) {
                debug!("Keeping the default layout after config change: {}", e);
            }
        }
    }

    /// Recompiles the translator. On failure the default layout is used
    /// and the error is reported to the host.
    pub fn set_layout(&mut self, host: &mut dyn Host, spec: &LayoutSpec) -> Result<(), TranslatorError> {
        self.state.key_cache.clear();
        self.config.layout = spec.clone();

        self.translator.rebuild(spec).inspect_err(|e| {
            host.report_error(&format!("[Runtime Error] {}", e));
        })
    }

    pub fn translator(&self) -> &SymbolTranslator {
        &self.translator
    }

    pub fn dispatchers(&self) -> &DispatcherRegistry {
        &self.dispatchers
    }

    /// Action table, for registering embedder actions
    pub fn dispatchers_mut(&mut self) -> &mut DispatcherRegistry {
        &mut self.dispatchers
    }

    pub fn bindings(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Appends a binding. Pending repeats and long-presses are dropped.
    pub fn add_binding(&mut self, binding: Binding) -> BindingId {
        debug!("Adding binding: {}", binding);
        self.state.active_repeat.clear();
        self.state.long_press = None;
        self.registry.add(binding)
    }

    /// Removes every binding with this mask and key; returns how many
    pub fn remove_binding(&mut self, modmask: ModMask, key: &KeyIdentity) -> usize {
        self.state.active_repeat.clear();
        self.state.long_press = None;
        self.registry.remove(modmask, key)
    }

    /// Replaces all bindings and drops every piece of state that refers
    /// to the old ones
    pub fn reload(&mut self, bindings: Vec<Binding>) {
        self.registry.clear();
        for binding in bindings {
            self.registry.add(binding);
        }

        self.state.clear_transient();
        self.state.key_cache.clear();

        debug!("Reloaded {} bindings", self.registry.len());
    }

    /// Runs an action by name outside of event matching
    pub fn invoke(&mut self, host: &mut dyn Host, name: &str, args: &str) -> DispatchResult {
        let KeybindEngine {
            registry,
            dispatchers,
            translator,
            state,
            ..
        } = self;

        let Some(dispatcher) = dispatchers.get(name) else {
            error!("Invalid dispatcher: {}", name);
            return DispatchResult::failure(format!("Invalid dispatcher {}", name));
        };

        let mut ctx = ActionContext::new(host, Polarity::Direct, registry, state, translator);
        dispatcher.invoke(&mut ctx, args)
    }

    pub fn current_submap(&self) -> &str {
        &self.state.submap
    }

    pub fn mouse_bind_mode(&self) -> MouseBindMode {
        self.state.mouse.mode
    }

    pub fn pressed_keys(&self) -> &[PressedKey] {
        &self.state.pressed
    }

    pub fn groups_locked(&self) -> bool {
        self.state.groups_locked
    }
}
