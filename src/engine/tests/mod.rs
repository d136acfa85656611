//! Engine tests
//!
//! Scenario tests that drive the engine through a recording host:
//! - Matching: modifiers, release polarity, shadowing, chords, catch-all
//! - Submaps and registry edits
//! - Timers: long-press and repeat against a manual clock
//! - Non-keyboard input: buttons, drags, scroll, switches
//! - Built-in actions: pass, sendshortcut, global, event, pin, lockgroups

#[cfg(test)]
mod support;
#[cfg(test)]
mod matching_tests;
#[cfg(test)]
mod pointer_tests;
