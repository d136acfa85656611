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

//! src/core/mod.rs
//!
//! Core data model
//!
//! This module contains the value types the engine matches against:
//! - Keysyms and the names they are configured with
//! - Modifier masks, key identities, flags and bindings
//! - The symbol translator (key code → keysym under a layout)
//! - Bind-line parsing and static validation
//!
//! Nothing here touches engine state, so all of it is testable in isolation.

pub mod keysym;
pub mod parser;
pub mod translator;
pub mod types;
pub mod validator;

pub use keysym::{Keysym, NameCase};
pub use translator::{LayoutSpec, SymbolTranslator, TranslatorError};
pub use types::*;
pub use validator::{validate_binding, ValidationError};

#[cfg(test)]
mod tests;
