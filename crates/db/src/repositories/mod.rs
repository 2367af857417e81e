//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod attendance_repo;
pub mod refresh_session_repo;
pub mod role_repo;
pub mod student_repo;
pub mod timetable_repo;
pub mod user_repo;

pub use attendance_repo::AttendanceRepo;
pub use refresh_session_repo::RefreshSessionRepo;
pub use role_repo::RoleRepo;
pub use student_repo::StudentRepo;
pub use timetable_repo::TimetableRepo;
pub use user_repo::UserRepo;
