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

//! Static binding checks
//!
//! Bindings that fail these checks are still loaded: at runtime an unknown
//! handler just does not consume, and an unresolvable key name is skipped
//! for each event. The checks exist so `check` can warn about them up front.

use thiserror::Error;

use crate::core::types::{Binding, KeyIdentity};

/// Validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Handler name is not a known dispatcher
    #[error("Unknown handler '{0}'")]
    UnknownHandler(String),

    /// Symbolic key name resolves to no keysym in either case mode
    #[error("Key name '{0}' does not resolve to a keysym")]
    UnresolvableKey(String),

    /// Chord binding with no non-modifier keys
    #[error("Chord binding has no keys")]
    EmptyChord,
}

/// Dispatcher names a Hyprland session understands
///
/// Source: https://wiki.hyprland.org/Configuring/Dispatchers/
pub const KNOWN_DISPATCHERS: &[&str] = &[
    "exec",
    "execr",
    "killactive",
    "closewindow",
    "togglefloating",
    "setfloating",
    "settiled",
    "workspace",
    "renameworkspace",
    "fullscreen",
    "fullscreenstate",
    "movetoworkspace",
    "movetoworkspacesilent",
    "pseudo",
    "movefocus",
    "movewindow",
    "swapwindow",
    "centerwindow",
    "togglegroup",
    "changegroupactive",
    "movegroupwindow",
    "togglesplit",
    "swapsplit",
    "splitratio",
    "focusmonitor",
    "movecursortocorner",
    "movecursor",
    "workspaceopt",
    "exit",
    "movecurrentworkspacetomonitor",
    "focusworkspaceoncurrentmonitor",
    "moveworkspacetomonitor",
    "togglespecialworkspace",
    "forcerendererreload",
    "resizeactive",
    "moveactive",
    "cyclenext",
    "focuswindowbyclass",
    "focuswindow",
    "tagwindow",
    "submap",
    "pass",
    "sendshortcut",
    "layoutmsg",
    "dpms",
    "movewindowpixel",
    "resizewindowpixel",
    "swapnext",
    "swapactiveworkspaces",
    "pin",
    "mouse",
    "bringactivetotop",
    "alterzorder",
    "focusurgentorlast",
    "focuscurrentorlast",
    "lockgroups",
    "lockactivegroup",
    "moveintogroup",
    "moveoutofgroup",
    "movewindoworgroup",
    "setignoregrouplock",
    "denywindowfromgroup",
    "event",
    "global",
    "setprop",
];

/// Validates a handler name against the known dispatcher list
pub fn validate_handler(name: &str) -> Result<(), ValidationError> {
    if KNOWN_DISPATCHERS.contains(&name) {
        Ok(())
    } else {
        Err(ValidationError::UnknownHandler(name.to_string()))
    }
}

/// Validates that a key identity can ever match
pub fn validate_key(key: &KeyIdentity) -> Result<(), ValidationError> {
    match key {
        KeyIdentity::Symbol(name) => match key.resolve_symbol() {
            Some(_) => Ok(()),
            None => Err(ValidationError::UnresolvableKey(name.clone())),
        },
        KeyIdentity::Chord { keys, .. } if keys.is_empty() => Err(ValidationError::EmptyChord),
        _ => Ok(()),
    }
}

/// Validates a complete binding
///
/// Performs all checks:
/// - Handler name against the known dispatchers
/// - Key identity resolvability
pub fn validate_binding(binding: &Binding) -> Result<(), ValidationError> {
    validate_handler(&binding.handler)?;
    validate_key(&binding.key)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Modifier;

    #[test]
    fn test_known_handlers() {
        assert!(validate_handler("exec").is_ok());
        assert!(validate_handler("workspace").is_ok());
        assert!(validate_handler("submap").is_ok());
        assert!(validate_handler("mouse").is_ok());
    }

    #[test]
    fn test_unknown_handler() {
        assert_eq!(
            validate_handler("frobnicate"),
            Err(ValidationError::UnknownHandler("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_binding_with_unresolvable_key() {
        let binding = Binding::new(
            Modifier::Super.into(),
            KeyIdentity::Symbol("NotAKeyName".into()),
            "exec",
            "kitty",
        );

        assert_eq!(
            validate_binding(&binding),
            Err(ValidationError::UnresolvableKey("NotAKeyName".to_string()))
        );
    }
}
