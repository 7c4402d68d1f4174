//! Palaver chat server library.
//!
//! A line-oriented TCP chat server: every accepted connection is tracked in a
//! shared session registry, every chat line is appended to an ordered history
//! log and fanned out to a registry snapshot, and the history is persisted as a
//! transcript on controlled shutdown.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
