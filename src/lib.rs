//! Form-input value resolution for automated site exploration.
//!
//! Given configured field definitions, a linked-field group and an anchor
//! control, [`forms::candidate::CandidateGenerator`] produces one candidate
//! per value combination, each bundling a marked clone of the anchor, its
//! locator and the values to type or toggle into the group's controls.

pub mod browser;
pub mod cli;
pub mod config;
pub mod forms;
pub mod trace;
