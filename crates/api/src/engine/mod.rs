//! Job execution engine.
//!
//! Contains the in-memory job store and the runner that performs
//! conversions in the background and records their outcome.

pub mod runner;
pub mod store;
