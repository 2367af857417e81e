//! Domain rules for the rollcall attendance service.
//!
//! This crate has zero internal dependencies so the persistence and HTTP
//! layers can both build on it.

pub mod attendance;
pub mod clock;
pub mod error;
pub mod reconciler;
pub mod roles;
pub mod timetable;
pub mod types;
