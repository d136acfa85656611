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

//! src/dispatch/mod.rs
//!
//! Action dispatch
//!
//! Every action a binding can name is a `Dispatcher`, registered by name
//! in a `DispatcherRegistry`. The engine looks actions up at fire time and
//! never mutates the table while matching.
//!
//! # Architecture
//! - `builtins`: actions whose semantics the engine owns (`submap`, `mouse`,
//!   `global`, `event`, `lockgroups`, `pin`)
//! - `forward`: actions that echo input to another client (`pass`, `sendshortcut`)
//! - `selector`: window selector parsing and resolution
//!
//! Everything else (`exec`, `workspace`, ...) is supplied by the embedder,
//! usually as a closure.
//!
//! Failures are values: an action reports `success: false` with a message,
//! it never returns `Err`.

pub mod builtins;
pub mod forward;
pub mod selector;

use serde::Serialize;
use std::collections::HashMap;

use crate::core::translator::SymbolTranslator;
use crate::core::types::Keycode;
use crate::engine::host::Host;
use crate::engine::registry::BindingRegistry;
use crate::engine::EngineState;

/// Outcome of one action invocation
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DispatchResult {
    pub success: bool,
    pub error: Option<String>,
    /// Action asks for the triggering event to reach the client anyway
    pub pass_event: bool,
}

impl Default for DispatchResult {
    fn default() -> Self {
        Self {
            success: true,
            error: None,
            pass_event: false,
        }
    }
}

impl DispatchResult {
    pub fn ok() -> Self {
        Self::default()
    }

    /// Successful, but the event should be passed through
    pub fn pass() -> Self {
        Self {
            pass_event: true,
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            pass_event: false,
        }
    }
}

/// Which edge of the input triggered an invocation
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Press,
    Release,
    /// Not tied to an input edge (timers, direct invocation)
    Direct,
}

impl Polarity {
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Polarity::Press
        } else {
            Polarity::Release
        }
    }
}

/// The last raw input the engine saw, for actions that echo it
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LastInput {
    /// XKB key code, 0 when the last input was a pointer button
    pub keycode: Keycode,
    /// Pointer button code, 0 when the last input was a key
    pub button: u32,
    pub time_ms: u32,
}

impl LastInput {
    pub fn is_keyboard(&self) -> bool {
        self.keycode != 0
    }
}

/// What an action can see and touch while it runs
pub struct ActionContext<'a> {
    pub host: &'a mut dyn Host,
    pub polarity: Polarity,
    pub input: LastInput,
    pub(crate) bindings: &'a BindingRegistry,
    pub(crate) state: &'a mut EngineState,
    pub(crate) translator: &'a SymbolTranslator,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        host: &'a mut dyn Host,
        polarity: Polarity,
        bindings: &'a BindingRegistry,
        state: &'a mut EngineState,
        translator: &'a SymbolTranslator,
    ) -> Self {
        Self {
            host,
            polarity,
            input: state.input,
            bindings,
            state,
            translator,
        }
    }

    pub fn current_submap(&self) -> &str {
        &self.state.submap
    }

    pub fn bindings(&self) -> &BindingRegistry {
        self.bindings
    }
}

/// An action invocable by name
pub trait Dispatcher {
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult;
}

impl<F> Dispatcher for F
where
    F: Fn(&mut ActionContext<'_>, &str) -> DispatchResult,
{
    fn invoke(&self, ctx: &mut ActionContext<'_>, args: &str) -> DispatchResult {
        self(ctx, args)
    }
}

/// Name → action table
#[derive(Default)]
pub struct DispatcherRegistry {
    dispatchers: HashMap<String, Box<dyn Dispatcher>>,
}

impl DispatcherRegistry {
    /// Empty table; bindings naming any action will log as unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the engine-owned actions registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("submap", builtins::SetSubmap);
        registry.register("mouse", builtins::MouseDrag);
        registry.register("global", builtins::Global);
        registry.register("event", builtins::Event);
        registry.register("lockgroups", builtins::LockGroups);
        registry.register("pin", builtins::Pin);
        registry.register("pass", forward::Pass);
        registry.register("sendshortcut", forward::SendShortcut);

        registry
    }

    /// Registers (or replaces) an action
    pub fn register(&mut self, name: &str, dispatcher: impl Dispatcher + 'static) {
        self.dispatchers.insert(name.to_string(), Box::new(dispatcher));
    }

    /// Registers a closure; the explicit bound lets its argument lifetimes be inferred
    pub fn register_fn<F>(&mut self, name: &str, action: F)
    where
        F: Fn(&mut ActionContext<'_>, &str) -> DispatchResult + 'static,
    {
        self.register(name, action);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Dispatcher> {
        self.dispatchers.get(name).map(|d| d.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dispatchers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dispatchers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
