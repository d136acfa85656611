//! Config module tests
//!
//! - Option parsing and defaults
//! - Loading from disk (tilde expansion, missing files)
