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

use crate::core::{
    parser::parse_bind_line,
    types::KeyIdentity,
    validator::{validate_binding, validate_key, ValidationError},
};

#[test]
fn test_parsed_bindings_validate() {
    for line in [
        "bind = SUPER, Q, killactive",
        "bind = SUPER, code:24, killactive",
        "bindm = SUPER, mouse:272, movewindow",
        "bind = , switch:on:Lid Switch, exec, swaylock",
        "bind = SUPER, catchall, submap, reset",
        "binds = Super_L, a&b, exec, kitty",
    ] {
        let binding = parse_bind_line(line, "").unwrap();
        assert_eq!(validate_binding(&binding), Ok(()), "{}", line);
    }
}

#[test]
fn test_unknown_handler_is_reported() {
    let binding = parse_bind_line("bind = SUPER, Q, killeverything", "").unwrap();

    assert_eq!(
        validate_binding(&binding),
        Err(ValidationError::UnknownHandler("killeverything".to_string()))
    );
}

#[test]
fn test_empty_chord() {
    let key = KeyIdentity::Chord {
        mods: Default::default(),
        keys: Default::default(),
    };

    assert_eq!(validate_key(&key), Err(ValidationError::EmptyChord));
}

#[test]
fn test_case_insensitive_names_validate() {
    assert_eq!(validate_key(&KeyIdentity::Symbol("RETURN".into())), Ok(()));
    assert_eq!(validate_key(&KeyIdentity::Symbol("escape".into())), Ok(()));
}
