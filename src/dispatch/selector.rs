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

//! Window selectors
//!
//! Actions that target a window take a selector string:
//! - `class:REGEX` (also the default with no prefix), `title:REGEX`
//! - `initialclass:REGEX`, `initialtitle:REGEX`
//! - `pid:1234`, `address:0x5a3f`
//! - `activewindow`, `floating`, `tiled`
//!
//! Regexes must match the whole property.

use regex::Regex;
use thiserror::Error;

use crate::engine::host::{WindowId, WindowInfo, WindowRegistry};

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("Invalid window regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    #[error("Invalid pid '{0}'")]
    InvalidPid(String),

    #[error("Invalid window address '{0}'")]
    InvalidAddress(String),
}

/// Window property a regex selector matches against
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Property {
    Class,
    Title,
    InitialClass,
    InitialTitle,
}

#[derive(Debug)]
pub enum WindowSelector {
    Regex { property: Property, regex: Regex },
    Pid(u32),
    Address(WindowId),
    ActiveWindow,
    Floating,
    Tiled,
}

impl WindowSelector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let selector = selector.trim();

        match selector {
            "activewindow" => return Ok(WindowSelector::ActiveWindow),
            "floating" => return Ok(WindowSelector::Floating),
            "tiled" => return Ok(WindowSelector::Tiled),
            _ => {}
        }

        if let Some(pid) = selector.strip_prefix("pid:") {
            return pid
                .trim()
                .parse()
                .map(WindowSelector::Pid)
                .map_err(|_| SelectorError::InvalidPid(pid.to_string()));
        }

        if let Some(address) = selector.strip_prefix("address:") {
            let hex = address.trim().trim_start_matches("0x");
            return u64::from_str_radix(hex, 16)
                .map(|id| WindowSelector::Address(WindowId(id)))
                .map_err(|_| SelectorError::InvalidAddress(address.to_string()));
        }

        let (property, pattern) = [
            ("initialclass:", Property::InitialClass),
            ("initialtitle:", Property::InitialTitle),
            ("class:", Property::Class),
            ("title:", Property::Title),
        ]
        .iter()
        .find_map(|(prefix, property)| selector.strip_prefix(prefix).map(|rest| (*property, rest)))
        .unwrap_or((Property::Class, selector));

        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            SelectorError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(WindowSelector::Regex { property, regex })
    }

    fn matches(&self, window: &WindowInfo) -> bool {
        match self {
            WindowSelector::Regex { property, regex } => {
                let value = match property {
                    Property::Class => &window.class,
                    Property::Title => &window.title,
                    Property::InitialClass => &window.initial_class,
                    Property::InitialTitle => &window.initial_title,
                };
                regex.is_match(value)
            }
            WindowSelector::Pid(pid) => window.pid == *pid,
            WindowSelector::Address(id) => window.id == *id,
            WindowSelector::Floating => window.floating,
            WindowSelector::Tiled => !window.floating,
            WindowSelector::ActiveWindow => false,
        }
    }

    /// First window the selector matches, resolved against the current window list
    pub fn resolve<W: WindowRegistry + ?Sized>(&self, windows: &W) -> Option<WindowId> {
        if let WindowSelector::ActiveWindow = self {
            return windows.active_window();
        }

        windows
            .windows()
            .iter()
            .find(|w| self.matches(w))
            .map(|w| w.id)
    }
}

/// Parses and resolves in one step; parse errors count as "not found"
pub fn find_window<W: WindowRegistry + ?Sized>(windows: &W, selector: &str) -> Option<WindowId> {
    match WindowSelector::parse(selector) {
        Ok(selector) => selector.resolve(windows),
        Err(e) => {
            tracing::error!("{}", e);
            None
        }
    }
}
