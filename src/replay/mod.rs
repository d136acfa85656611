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

//! src/replay/mod.rs
//!
//! Scripted replays against a simulated compositor
//!
//! A replay feeds a script of input steps through a real `KeybindEngine`
//! on a manual clock and records what came out: dispositions, actions,
//! echoed keys, notifications and errors. Actions the engine does not
//! implement itself (`exec`, `workspace`, ...) are recorded, not run.

pub mod host;
pub mod script;

pub use host::{ConsoleHost, ReplayKeyboard};
pub use script::{parse_script, KeyRef, ScriptError, ScriptLine, Step};

use colored::Colorize;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

use crate::config::LoadedConfig;
use crate::core::keysym::{Keysym, NameCase};
use crate::core::types::{keycode_to_modifier, Keycode, EVDEV_OFFSET};
use crate::dispatch::{DispatchResult, Polarity};
use crate::engine::host::WindowId;
use crate::engine::input::{AxisEvent, AxisSource, ButtonEvent, KeyEvent};
use crate::engine::mouse::MouseBindMode;
use crate::engine::timers::{Clock, ManualClock};
use crate::engine::{Disposition, KeybindEngine};

/// Shared between the host, the recording actions and the runner
pub type ReplayLog = Rc<RefCell<Vec<Record>>>;

/// One line of replay output
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Step { line: usize, at_ms: u64, text: String },
    Disposition { forwarded: bool },
    Action { name: String, args: String, polarity: Polarity },
    Modifiers { mods: String },
    Key { keycode: Keycode, pressed: bool, window: Option<WindowId> },
    Button { button: u32, pressed: bool, window: Option<WindowId> },
    Drag { window: WindowId, mode: MouseBindMode },
    DragEnd,
    Global { app_id: String, name: String, pressed: bool },
    VtSwitch { vt: u32 },
    Event { event: String },
    Error { message: String },
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Step { line, at_ms, text } => {
                write!(f, "{} {}", format!("[{:>3}] {:>6}ms", line, at_ms).dimmed(), text.bold())
            }
            Record::Disposition { forwarded: true } => write!(f, "  {}", "forwarded".dimmed()),
            Record::Disposition { forwarded: false } => write!(f, "  {}", "suppressed".yellow()),
            Record::Action { name, args, polarity } => {
                write!(f, "  {} {} {} ({:?})", "→".green(), name.green().bold(), args, polarity)
            }
            Record::Modifiers { mods } => write!(f, "  {} modifiers [{}]", "⇢".cyan(), mods),
            Record::Key { keycode, pressed, window } => write!(
                f,
                "  {} key {} {} to {}",
                "⇢".cyan(),
                keycode,
                edge(*pressed),
                target(*window)
            ),
            Record::Button { button, pressed, window } => write!(
                f,
                "  {} button {} {} to {}",
                "⇢".cyan(),
                button,
                edge(*pressed),
                target(*window)
            ),
            Record::Drag { window, mode } => write!(f, "  {} {} drag on {}", "✋".cyan(), mode, window),
            Record::DragEnd => write!(f, "  {} drag ended", "✋".cyan()),
            Record::Global { app_id, name, pressed } => {
                write!(f, "  {} global {}:{} {}", "⇢".cyan(), app_id, name, edge(*pressed))
            }
            Record::VtSwitch { vt } => write!(f, "  {} switch to VT {}", "⚠".yellow(), vt),
            Record::Event { event } => write!(f, "  {} {}", "●".blue(), event),
            Record::Error { message } => write!(f, "  {} {}", "✗".red(), message.red()),
        }
    }
}

fn edge(pressed: bool) -> &'static str {
    if pressed {
        "down"
    } else {
        "up"
    }
}

fn target(window: Option<WindowId>) -> String {
    window.map_or_else(|| "no window".to_string(), |w| format!("window {}", w))
}

/// Engine, simulated host and clock for one replay
pub struct Replay {
    engine: KeybindEngine,
    host: ConsoleHost,
    keyboard: ReplayKeyboard,
    clock: ManualClock,
    log: ReplayLog,
}

impl Replay {
    pub fn new(loaded: LoadedConfig) -> Self {
        let log: ReplayLog = Rc::new(RefCell::new(Vec::new()));
        let clock = ManualClock::new();
        let keyboard = ReplayKeyboard::new(&loaded.config.layout);
        let mut engine = KeybindEngine::new(loaded.config, Box::new(clock.clone()));

        let missing: BTreeSet<String> = loaded
            .bindings
            .iter()
            .map(|b| b.action_name().to_string())
            .filter(|name| !engine.dispatchers().contains(name))
            .collect();

        for name in missing {
            debug!("Recording action '{}' instead of running it", name);
            let sink = Rc::clone(&log);
            let action = name.clone();
            engine.dispatchers_mut().register_fn(&name, move |ctx, args| {
                sink.borrow_mut().push(Record::Action {
                    name: action.clone(),
                    args: args.to_string(),
                    polarity: ctx.polarity,
                });
                DispatchResult::ok()
            });
        }

        engine.reload(loaded.bindings);

        let host = ConsoleHost::new(Rc::clone(&log));
        Self {
            engine,
            host,
            keyboard,
            clock,
            log,
        }
    }

    pub fn engine(&self) -> &KeybindEngine {
        &self.engine
    }

    /// Runs every step and returns the records produced, in order
    pub fn run(&mut self, script: &[ScriptLine]) -> Result<Vec<Record>, ScriptError> {
        for line in script {
            self.record(Record::Step {
                line: line.line,
                at_ms: self.clock.now_ms(),
                text: line.text.clone(),
            });

            self.step(&line.step).map_err(|message| ScriptError {
                line: line.line,
                message,
            })?;
        }

        Ok(std::mem::take(&mut *self.log.borrow_mut()))
    }

    fn step(&mut self, step: &Step) -> Result<(), String> {
        match step {
            Step::Window { id, class } => self.host.add_window(*id, class),
            Step::Mods(mask) => self.host.mods = *mask,
            Step::Press(key) => {
                let code = self.evdev(key)?;
                self.key(code, true);
            }
            Step::Release(key) => {
                let code = self.evdev(key)?;
                self.key(code, false);
            }
            Step::Tap(key) => {
                let code = self.evdev(key)?;
                self.key(code, true);
                self.key(code, false);
            }
            Step::Button { button, pressed } => {
                let event = ButtonEvent {
                    button: *button,
                    pressed: *pressed,
                    time_ms: self.time_ms(),
                };
                let disposition = self.engine.handle_button(&mut self.host, event);
                self.disposition(disposition);
            }
            Step::Scroll { orientation, delta } => {
                let event = AxisEvent {
                    source: AxisSource::Wheel,
                    orientation: *orientation,
                    delta: *delta,
                };
                let disposition = self.engine.handle_axis(&mut self.host, event);
                self.disposition(disposition);
            }
            Step::Switch { name, on } => self.engine.handle_switch(&mut self.host, name, *on),
            Step::Lock(locked) => self.host.locked = *locked,
            Step::Inhibit(inhibited) => self.host.inhibited = *inhibited,
            Step::Wait(ms) => self.wait(*ms),
            Step::Dispatch { name, args } => {
                let result = self.engine.invoke(&mut self.host, name, args);
                if let Some(error) = result.error {
                    self.record(Record::Error { message: error });
                }
            }
        }

        Ok(())
    }

    /// Feeds one key edge; the seat's modifiers change after the engine
    /// has seen the event
    fn key(&mut self, code: Keycode, pressed: bool) {
        let event = KeyEvent {
            keycode: code,
            pressed,
            time_ms: self.time_ms(),
        };
        let disposition = self.engine.handle_key(&mut self.host, &self.keyboard, event);
        self.disposition(disposition);

        let modifier = keycode_to_modifier(code.saturating_add(EVDEV_OFFSET));
        if pressed {
            self.host.mods |= modifier;
        } else {
            self.host.mods &= !modifier;
        }
    }

    /// Advances the clock, firing each timer at its own deadline
    fn wait(&mut self, ms: u64) {
        let target = self.clock.now_ms() + ms;

        while let Some(at) = self.engine.next_deadline().filter(|at| *at <= target) {
            self.clock.set(at.max(self.clock.now_ms()));
            self.engine.dispatch_timers(&mut self.host);
        }

        self.clock.set(target);
    }

    fn evdev(&self, key: &KeyRef) -> Result<Keycode, String> {
        match key {
            KeyRef::Code(code) => Ok(*code),
            KeyRef::Name(name) => {
                let sym = Keysym::from_name(name, NameCase::Insensitive);
                self.keyboard
                    .evdev_for(sym)
                    .ok_or_else(|| format!("no key produces '{}' in this layout", name))
            }
        }
    }

    fn time_ms(&self) -> u32 {
        self.clock.now_ms() as u32
    }

    fn disposition(&self, disposition: Disposition) {
        self.record(Record::Disposition {
            forwarded: disposition.forwards(),
        });
    }

    fn record(&self, record: Record) {
        self.log.borrow_mut().push(record);
    }
}
