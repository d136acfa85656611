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

//! src/core/parser.rs
//!
//! Hyprland configuration syntax parser
//!
//! This module turns config text into bindings and raw option assignments.
//! It handles:
//! - Every bind flag combination (`bind`, `bindr`, `bindel`, `bindmn`, ...)
//! - Variable substitution (`$mainMod`)
//! - `category { ... }` blocks and `category:key = value` options
//! - `submap = name` / `submap = reset` sections
//! - Comments and line numbers for error reporting
//!
//! # Architecture
//! The parser uses nom combinators for the bind keyword and performs
//! two-pass parsing:
//! 1. First pass: Collect variable definitions
//! 2. Second pass: Parse bindings and options with variable substitution
//!
//! The parser only structures data; option semantics live in `config`.

use nom::{
    bytes::complete::tag,
    character::complete::{alpha0, char, space0},
    combinator::map_res,
    sequence::preceded,
    IResult, Parser,
};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use crate::core::keysym::{Keysym, NameCase};
use crate::core::types::{
    keysym_to_modifier, mod_mask_from_str, BindFlags, Binding, KeyIdentity, ModMask,
};

/// Parse errors with line number context
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Parse error on line {line}: {source}")]
    InvalidBind { line: usize, source: BindLineError },

    #[error("Parse error on line {line}: {message}")]
    InvalidSyntax { line: usize, message: String },

    #[error("Undefined variable '${variable}' on line {line}")]
    UndefinedVariable { variable: String, line: usize },

    #[error("IO error reading config: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors in a single bind line
#[derive(Debug, Error, PartialEq)]
pub enum BindLineError {
    #[error("malformed bind keyword")]
    Keyword,

    #[error("unknown bind flag '{0}'")]
    UnknownFlag(char),

    #[error("expected at least {expected} comma-separated fields, found {found}")]
    MissingFields { expected: usize, found: usize },

    #[error("unknown key symbol '{0}' in chord")]
    UnknownChordKey(String),

    #[error("bindm only supports movewindow and resizewindow, got '{0}'")]
    InvalidMouseHandler(String),

    #[error("empty handler")]
    EmptyHandler,
}

/// Option assignment outside bind lines (`binds:scroll_event_delay = 100`)
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionEntry {
    /// Fully qualified name, categories joined with `:`
    pub key: String,
    pub value: String,
    pub line: usize,
}

/// Result of parsing a whole config file
#[derive(Debug, Default)]
pub struct ParsedConfig {
    pub bindings: Vec<Binding>,
    pub options: Vec<OptionEntry>,
}

/// Parse a complete Hyprland config file
///
/// # Example
/// ```
/// use hypr_bind_engine::core::parser::parse_config;
///
/// let parsed = parse_config("$mod = SUPER\nbind = $mod, Q, killactive\n")?;
/// assert_eq!(parsed.bindings.len(), 1);
/// # Ok::<(), hypr_bind_engine::core::parser::ParseError>(())
/// ```
pub fn parse_config(content: &str) -> Result<ParsedConfig, ParseError> {
    // First pass: Collect variable definitions
    let variables = collect_variables(content);

    let mut parsed = ParsedConfig::default();
    let mut categories: Vec<String> = Vec::new();
    let mut submap = String::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1; // Human-readable numbers start at 1

        let line_trimmed = strip_comment(line).trim();
        if line_trimmed.is_empty() || line_trimmed.starts_with('$') {
            continue;
        }

        if line_trimmed == "}" {
            if categories.pop().is_none() {
                return Err(ParseError::InvalidSyntax {
                    line: line_num,
                    message: "unbalanced '}'".to_string(),
                });
            }
            continue;
        }

        if let Some(category) = line_trimmed.strip_suffix('{') {
            categories.push(category.trim().to_string());
            continue;
        }

        // Substitute variables before parsing
        let substituted = substitute_variables(line_trimmed, &variables);

        if categories.is_empty() && is_bind_line(&substituted) {
            check_undefined_variables(&substituted, line_num)?;

            let binding = parse_bind_line(&substituted, &submap).map_err(|source| {
                ParseError::InvalidBind {
                    line: line_num,
                    source,
                }
            })?;
            parsed.bindings.push(binding);
            continue;
        }

        let Some((key, value)) = substituted.split_once('=') else {
            return Err(ParseError::InvalidSyntax {
                line: line_num,
                message: format!("expected 'key = value', found '{}'", substituted),
            });
        };

        let key = key.trim();
        let value = value.trim();

        if key == "submap" && categories.is_empty() {
            submap = if value == "reset" { String::new() } else { value.to_string() };
            continue;
        }

        let mut qualified = categories.join(":");
        if !qualified.is_empty() {
            qualified.push(':');
        }
        qualified.push_str(key);

        parsed.options.push(OptionEntry {
            key: qualified,
            value: value.to_string(),
            line: line_num,
        });
    }

    if !categories.is_empty() {
        return Err(ParseError::InvalidSyntax {
            line: content.lines().count(),
            message: format!("unclosed category '{}'", categories.join(":")),
        });
    }

    Ok(parsed)
}

/// Collect variable definitions from config
///
/// Hyprland configs use variables like:
/// ```hyprland
/// $mainMod = SUPER
/// $terminal = kitty
/// ```
///
/// Returns a HashMap mapping variable names to their values
pub fn collect_variables(contents: &str) -> HashMap<String, String> {
    let mut variables = HashMap::new();

    for line in contents.lines() {
        let line_trimmed = strip_comment(line).trim();

        // Variable definition format: $name = value
        if let Some(definition) = line_trimmed.strip_prefix('$') {
            if let Some((name, value)) = definition.split_once('=') {
                variables.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }

    variables
}

/// Substitute variables in a line
///
/// Longer names are replaced first so `$modShift` is not clobbered by `$mod`.
pub fn substitute_variables(line: &str, variables: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = variables.keys().collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));

    let mut result = line.to_string();
    for name in names {
        let pattern = format!("${}", name);
        result = result.replace(&pattern, &variables[name]);
    }

    result
}

fn check_undefined_variables(line: &str, line_num: usize) -> Result<(), ParseError> {
    // Only the modifier and key fields; arguments may legitimately carry shell `$VARS`
    let fields = line.split_once('=').map(|(_, rest)| rest).unwrap_or_default();
    for field in fields.split(',').take(2) {
        if let Some(variable) = field.trim().strip_prefix('$') {
            return Err(ParseError::UndefinedVariable {
                variable: variable.to_string(),
                line: line_num,
            });
        }
    }
    Ok(())
}

/// `bindel = ...` is a bind line, `binds:workspace_back_and_forth = ...` is not
fn is_bind_line(line: &str) -> bool {
    let keyword = line.split('=').next().unwrap_or_default().trim();
    keyword.starts_with("bind") && keyword.chars().all(|c| c.is_ascii_alphabetic())
}

fn strip_comment(line: &str) -> &str {
    if line.contains("##") {
        return line;
    }
    line.split('#').next().unwrap_or_default()
}

/// Parse a single bind line
///
/// Format: `bind<flags> = MODIFIERS, KEY, HANDLER[, ARGS]`
/// With the `d` flag: `bindd = MODIFIERS, KEY, DESCRIPTION, HANDLER[, ARGS]`
pub fn parse_bind_line(input: &str, submap: &str) -> Result<Binding, BindLineError> {
    let (rest, flags) = match parse_bind_keyword(input) {
        Ok(parsed) => parsed,
        Err(_) => {
            // Re-run the flag decoder to surface which letter was rejected
            return Err(bind_flags(alpha_suffix(input))
                .err()
                .unwrap_or(BindLineError::Keyword));
        }
    };

    let (rest, _) = (space0::<&str, nom::error::Error<&str>>, char('='), space0)
        .parse(rest)
        .map_err(|_| BindLineError::Keyword)?;

    let field_count = if flags.has_description { 5 } else { 4 };
    let fields: Vec<&str> = rest.splitn(field_count, ',').map(str::trim).collect();
    let required = field_count - 1;
    if fields.len() < required {
        return Err(BindLineError::MissingFields {
            expected: required,
            found: fields.len(),
        });
    }

    let mods = fields[0];
    let key = fields[1];
    let (description, handler, args) = if flags.has_description {
        (Some(fields[2].to_string()), fields[3], fields.get(4).copied().unwrap_or_default())
    } else {
        (None, fields[2], fields.get(3).copied().unwrap_or_default())
    };

    if handler.is_empty() {
        return Err(BindLineError::EmptyHandler);
    }

    let (modmask, key) = if flags.chord {
        parse_chord(mods, key)?
    } else {
        (mod_mask_from_str(mods), parse_key(key))
    };

    let (handler, arg) = if flags.mouse {
        if handler != "movewindow" && handler != "resizewindow" {
            return Err(BindLineError::InvalidMouseHandler(handler.to_string()));
        }
        let arg = if args.is_empty() {
            handler.to_string()
        } else {
            format!("{} {}", handler, args)
        };
        ("mouse".to_string(), arg)
    } else {
        (handler.to_string(), args.to_string())
    };

    Ok(Binding {
        modmask,
        key,
        submap: submap.to_string(),
        handler,
        arg,
        flags,
        description,
    })
}

/// Parse the `bind<flags>` keyword
///
/// # Example
/// ```
/// use hypr_bind_engine::core::parser::parse_bind_keyword;
///
/// let (_, flags) = parse_bind_keyword("bindel = , XF86AudioRaiseVolume, exec, up").unwrap();
/// assert!(flags.repeat && flags.locked);
/// ```
pub fn parse_bind_keyword(input: &str) -> IResult<&str, BindFlags> {
    map_res(preceded(tag("bind"), alpha0), bind_flags).parse(input)
}

fn alpha_suffix(input: &str) -> &str {
    let suffix = input.strip_prefix("bind").unwrap_or_default();
    let end = suffix
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(suffix.len());
    &suffix[..end]
}

fn bind_flags(letters: &str) -> Result<BindFlags, BindLineError> {
    let mut flags = BindFlags::default();

    for letter in letters.chars() {
        match letter {
            'l' => flags.locked = true,
            'r' => flags.release = true,
            'o' => flags.long_press = true,
            'e' => flags.repeat = true,
            'n' => flags.non_consuming = true,
            'm' => flags.mouse = true,
            't' => flags.transparent = true,
            'i' => flags.ignore_mods = true,
            's' => flags.chord = true,
            'd' => flags.has_description = true,
            'p' => flags.bypass_inhibitor = true,
            other => return Err(BindLineError::UnknownFlag(other)),
        }
    }

    Ok(flags)
}

/// Classify the key field of a bind line
///
/// - `catchall` → catch-all
/// - `code:36` or a bare number greater than 9 → raw key code
/// - `mouse:272`, `mouse_up`, `switch:on:Lid Switch` → pseudo-key
/// - anything else → keysym name
pub fn parse_key(key: &str) -> KeyIdentity {
    if key == "catchall" {
        return KeyIdentity::CatchAll;
    }

    if let Some(code) = key.strip_prefix("code:").and_then(|c| c.parse().ok()) {
        return KeyIdentity::Code(code);
    }

    if let Ok(code) = key.parse::<u32>() {
        if code > 9 {
            return KeyIdentity::Code(code);
        }
    }

    if key.starts_with("mouse:") || key.starts_with("mouse_") || key.starts_with("switch:") {
        return KeyIdentity::Synthetic(key.to_string());
    }

    KeyIdentity::Symbol(key.to_string())
}

/// Parse `SUPER_L&Control_L, a&b` into a chord identity.
///
/// The binding's mask is the union of the modifiers the chord's
/// modifier keys produce.
fn parse_chord(mods: &str, keys: &str) -> Result<(ModMask, KeyIdentity), BindLineError> {
    let mod_syms = parse_sym_set(mods)?;
    let key_syms = parse_sym_set(keys)?;

    let modmask = mod_syms
        .iter()
        .fold(ModMask::empty(), |mask, sym| mask | keysym_to_modifier(*sym));

    Ok((
        modmask,
        KeyIdentity::Chord {
            mods: mod_syms,
            keys: key_syms,
        },
    ))
}

fn parse_sym_set(field: &str) -> Result<BTreeSet<Keysym>, BindLineError> {
    field
        .split('&')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let sym = Keysym::from_name(name, NameCase::Insensitive);
            if sym.is_no_symbol() {
                Err(BindLineError::UnknownChordKey(name.to_string()))
            } else {
                Ok(sym)
            }
        })
        .collect()
}
