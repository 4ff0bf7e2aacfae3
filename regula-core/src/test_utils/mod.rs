//! Test utilities shared by unit and integration tests
//!
//! Deterministic and scripted randomness, fixtures for forms and packages,
//! and assertions for package state.

pub mod assertions;
pub mod deterministic_rng;
pub mod fixtures;

pub use assertions::*;
pub use deterministic_rng::*;
pub use fixtures::*;
