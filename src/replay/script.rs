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

//! src/replay/script.rs
//!
//! Replay script parsing
//!
//! One step per line, `#` starts a comment:
//! ```text
//! window 1 kitty          # add a window, focused and under the cursor
//! mods SUPER              # set modifier state directly
//! press Super_L           # key by keysym name or evdev code
//! tap q
//! release Super_L
//! button 272 press
//! scroll down
//! switch on Lid Switch
//! lock on
//! inhibit off
//! wait 650                # advance the clock, firing due timers
//! dispatch submap resize
//! ```

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, digit1, space1},
    combinator::{all_consuming, map_res, value},
    sequence::{preceded, terminated},
    IResult, Parser,
};
use thiserror::Error;

use crate::core::types::{mod_mask_from_str, ModMask};
use crate::engine::input::AxisOrientation;

#[derive(Debug, Error, PartialEq)]
#[error("Script error on line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

/// Key named in a script
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyRef {
    /// evdev code
    Code(u32),
    /// Keysym name, looked up in the layout
    Name(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Window { id: u64, class: String },
    Mods(ModMask),
    Press(KeyRef),
    Release(KeyRef),
    Tap(KeyRef),
    Button { button: u32, pressed: bool },
    Scroll { orientation: AxisOrientation, delta: f64 },
    Switch { name: String, on: bool },
    Lock(bool),
    Inhibit(bool),
    Wait(u64),
    Dispatch { name: String, args: String },
}

/// A parsed step with its source line
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub text: String,
    pub step: Step,
}

pub fn parse_script(content: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut steps = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }

        let step = parse_step(text).map_err(|message| ScriptError { line, message })?;
        steps.push(ScriptLine {
            line,
            text: text.to_string(),
            step,
        });
    }

    Ok(steps)
}

fn parse_step(text: &str) -> Result<Step, String> {
    let (args, command) = command(text).map_err(|_| format!("expected a command, found '{}'", text))?;
    let args = args.trim();

    let step = match command {
        "window" => {
            let (class, id) = number::<u64>(args).map_err(|_| "usage: window <id> <class>")?;
            Step::Window {
                id,
                class: class.trim().to_string(),
            }
        }
        "mods" => Step::Mods(mod_mask_from_str(args)),
        "press" => Step::Press(key_ref(args)?),
        "release" => Step::Release(key_ref(args)?),
        "tap" => Step::Tap(key_ref(args)?),
        "button" => {
            let (_, (button, pressed)) = (number::<u32>, preceded(space1, edge))
                .parse(args)
                .map_err(|_| "usage: button <code> press|release")?;
            Step::Button { button, pressed }
        }
        "scroll" => {
            let (orientation, delta) = match args {
                "down" => (AxisOrientation::Vertical, -1.0),
                "up" => (AxisOrientation::Vertical, 1.0),
                "left" => (AxisOrientation::Horizontal, -1.0),
                "right" => (AxisOrientation::Horizontal, 1.0),
                _ => return Err("usage: scroll up|down|left|right".to_string()),
            };
            Step::Scroll { orientation, delta }
        }
        "switch" => {
            let (name, on) = on_off(args).map_err(|_| "usage: switch on|off <name>")?;
            let name = name.trim();
            if name.is_empty() {
                return Err("usage: switch on|off <name>".to_string());
            }
            Step::Switch {
                name: name.to_string(),
                on,
            }
        }
        "lock" => Step::Lock(flag(args)?),
        "inhibit" => Step::Inhibit(flag(args)?),
        "wait" => {
            let (_, ms) = all_consuming(number::<u64>)
                .parse(args)
                .map_err(|_| "usage: wait <milliseconds>")?;
            Step::Wait(ms)
        }
        "dispatch" => {
            let (name, args) = args.split_once(' ').unwrap_or((args, ""));
            if name.is_empty() {
                return Err("usage: dispatch <action> [args]".to_string());
            }
            Step::Dispatch {
                name: name.to_string(),
                args: args.trim().to_string(),
            }
        }
        other => return Err(format!("unknown command '{}'", other)),
    };

    Ok(step)
}

fn command(input: &str) -> IResult<&str, &str> {
    alpha1(input)
}

fn number<T: std::str::FromStr>(input: &str) -> IResult<&str, T> {
    map_res(digit1, |s: &str| s.parse::<T>()).parse(input)
}

fn edge(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("press")), value(false, tag("release")))).parse(input)
}

fn on_off(input: &str) -> IResult<&str, bool> {
    // Remainder is the switch name
    terminated(
        alt((value(true, tag("on")), value(false, tag("off")))),
        space1,
    )
    .parse(input)
}

fn flag(args: &str) -> Result<bool, String> {
    match args {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err("expected on or off".to_string()),
    }
}

fn key_ref(args: &str) -> Result<KeyRef, String> {
    if args.is_empty() {
        return Err("missing key".to_string());
    }

    Ok(match args.parse::<u32>() {
        Ok(code) => KeyRef::Code(code),
        Err(_) => KeyRef::Name(args.to_string()),
    })
}
