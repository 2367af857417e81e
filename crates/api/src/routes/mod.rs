pub mod admin;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod reports;
pub mod students;
pub mod timetable;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/register                                   register (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update, delete
/// /admin/stats/users                               user counts per role
///
/// /dashboard                                       role-aware landing data
///
/// /students                                        list, create
/// /students/{id}                                   get, update, delete
///
/// /timetable                                       list, create
/// /timetable/my-schedule                           caller's periods
/// /timetable/current-period                        caller's active period
/// /timetable/{id}                                  update, delete
///
/// /attendance/mark                                 mark one (POST)
/// /attendance/mark-bulk                            mark many (POST)
/// /attendance/today                                today's records
/// /attendance/date/{date}                          records for a date, delete all
/// /attendance/range                                records over a date range
/// /attendance/student/{student_id}                 one student's history
/// /attendance/missing/{date}                       students with no record
/// /attendance/stats/overview                       daily totals
/// /attendance/stats/by-class                       per-class totals
/// /attendance/{id}                                 delete one record
///
/// /reports/attendance                              per-student summary
/// /reports/low-attendance                          below-threshold students
/// /reports/export/csv                              CSV download
/// /reports/export/excel                            Excel download
/// /reports/export/pdf                              PDF download
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/dashboard", dashboard::router())
        .nest("/students", students::router())
        .nest("/timetable", timetable::router())
        .nest("/attendance", attendance::router())
        .nest("/reports", reports::router())
}
