//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Bind-line and config parsing tests
//! - Binding validation tests
//! - Type tests (masks, key identities, bindings)

#[cfg(test)]
mod validator_tests;
#[cfg(test)]
mod types_tests;
