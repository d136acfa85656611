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

//! src/engine/timers.rs
//!
//! Long-press and repeat timers
//!
//! The engine does not own an event loop. It records deadlines against an
//! injected `Clock`; the embedder asks for `next_deadline()`, sleeps, and
//! calls `dispatch_timers()`. Timers hold no binding references: at fire
//! time the pending ids are looked up again, so a reload in between makes
//! them fire nothing.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, error};

use crate::dispatch::{ActionContext, Polarity};
use crate::engine::host::Host;
use crate::engine::registry::BindingId;
use crate::engine::KeybindEngine;

/// Monotonic millisecond time source
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock, counting from construction
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Clock advanced by hand; clones share the same time
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Armed deadlines, in clock milliseconds
#[derive(Debug, Default)]
pub struct Timers {
    long_press: Option<u64>,
    repeat: Option<u64>,
}

impl Timers {
    pub fn arm_long_press(&mut self, at_ms: u64) {
        self.long_press = Some(at_ms);
    }

    pub fn arm_repeat(&mut self, at_ms: u64) {
        self.repeat = Some(at_ms);
    }

    pub fn cancel_all(&mut self) {
        self.long_press = None;
        self.repeat = None;
    }

    pub fn next_deadline(&self) -> Option<u64> {
        match (self.long_press, self.repeat) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl KeybindEngine {
    /// Earliest armed timer deadline, in clock milliseconds
    pub fn next_deadline(&self) -> Option<u64> {
        self.state.timers.next_deadline()
    }

    /// Fires every timer whose deadline has passed
    pub fn dispatch_timers(&mut self, host: &mut dyn Host) {
        let now = self.clock.now_ms();

        if self.state.timers.long_press.is_some_and(|at| at <= now) {
            self.state.timers.long_press = None;
            self.fire_long_press(host);
        }

        while let Some(at) = self.state.timers.repeat.filter(|at| *at <= now) {
            self.fire_repeat(host, at);
        }
    }

    fn fire_long_press(&mut self, host: &mut dyn Host) {
        let Some(id) = self.state.long_press.take() else {
            return;
        };

        if host.active_keyboard().is_none() {
            return;
        }

        debug!("Long press timeout passed, calling dispatcher.");
        self.invoke_binding(host, id);
    }

    fn fire_repeat(&mut self, host: &mut dyn Host, due: u64) {
        let Some(keyboard) = host.active_keyboard() else {
            self.state.timers.repeat = None;
            return;
        };

        if self.state.active_repeat.is_empty() {
            self.state.timers.repeat = None;
            return;
        }

        for id in self.state.active_repeat.clone() {
            debug!("Keybind repeat triggered, calling dispatcher.");
            self.invoke_binding(host, id);
        }

        self.state.timers.repeat = match keyboard.rate {
            0 => None,
            rate => Some(due + u64::from((1000 / rate).max(1))),
        };
    }

    /// Runs a binding's action outside matching, if the binding still exists
    fn invoke_binding(&mut self, host: &mut dyn Host, id: BindingId) {
        let KeybindEngine {
            registry,
            dispatchers,
            translator,
            state,
            ..
        } = self;

        let Some(entry) = registry.get(id) else {
            debug!("Timer fired for a binding that no longer exists");
            return;
        };

        let Some(dispatcher) = dispatchers.get(entry.binding.action_name()) else {
            error!(
                "Invalid handler in a keybind! (handler {} does not exist)",
                entry.binding.handler
            );
            return;
        };

        let mut ctx = ActionContext::new(host, Polarity::Direct, registry, state, translator);
        let result = dispatcher.invoke(&mut ctx, &entry.binding.arg);
        if !result.success {
            debug!(
                "Timed dispatch of {} failed: {}",
                entry.binding.handler,
                result.error.unwrap_or_default()
            );
        }
    }
}
