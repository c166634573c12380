//! Domain layer for the text-to-MIDI job service.
//!
//! Job lifecycle types, the converter boundary and scratch directory
//! management. Nothing in here knows about HTTP.

pub mod converter;
pub mod error;
pub mod job;
pub mod types;
pub mod workspace;
