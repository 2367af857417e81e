//! Row structs and DTOs.
//!
//! Each submodule holds a `FromRow` entity matching the table row, a create
//! DTO for inserts, and where the entity is mutable an update DTO with
//! `Option` fields applied via `COALESCE`.

pub mod attendance;
pub mod role;
pub mod refresh_session;
pub mod student;
pub mod timetable;
pub mod user;
