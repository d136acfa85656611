// Copyright 2025 bakri (tidynest@proton.me)
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

//! Hyprland Keybind Engine
//!
//! The keybinding half of a Hyprland-style compositor: it decides, for
//! every key, button, scroll and switch event, which bindings fire and
//! whether the event still reaches the focused client.
//!
//! # Features
//!
//! - **Submaps:** Named binding maps with `submap` switching and catch-alls
//! - **Flags:** Release, locked, long-press, repeat, non-consuming, transparent,
//!   ignore-mods, inhibitor bypass and mouse drag bindings
//! - **Chords:** Multi-key bindings matched against the set of held symbols
//! - **Shadowing:** Repeating bindings stop when a later key takes over
//! - **Forwarding:** `pass`, `sendshortcut` and `global` actions
//! - **Layouts:** Built-in US keymaps, or real XKB keymaps with the `xkb` feature
//!
//! # Architecture
//!
//! - **`core`:** Types, keysyms, the layout translator, config parsing, checks
//! - **`engine`:** The matching state machine and its host interfaces
//! - **`dispatch`:** Action registry and the engine-owned actions
//! - **`config`:** Option handling, file loading and watching
//! - **`replay`:** Scripted event sequences against a simulated host
//!
//! The engine owns no windows or devices; the compositor implements the
//! traits in [`engine::host`] and feeds events in.
//!
//! # Examples
//!
//! ## Loading a config
//!
//! ```no_run
//! use hypr_bind_engine::config::ConfigManager;
//! use std::path::PathBuf;
//!
//! let manager = ConfigManager::new(PathBuf::from("~/.config/hypr/hyprland.conf"))?;
//! let loaded = manager.load()?;
//! println!("Found {} keybindings", loaded.bindings.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Replaying a script
//!
//! ```
//! use hypr_bind_engine::config::load_from_str;
//! use hypr_bind_engine::replay::{parse_script, Record, Replay};
//!
//! let loaded = load_from_str("bind = SUPER, Q, killactive\n")?;
//! let script = parse_script("press Super_L\ntap q\n")?;
//!
//! let records = Replay::new(loaded).run(&script)?;
//! assert!(records.iter().any(|r| matches!(r, Record::Action { name, .. } if name == "killactive")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod dispatch;
pub mod engine;
pub mod replay;

// Re-export commonly used types for convenience
pub use core::{Binding, KeyIdentity, ModMask, Modifier};
pub use engine::KeybindEngine;
