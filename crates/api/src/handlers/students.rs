//! Handlers for the `/students` roster resource.
//!
//! Reads are open to any authenticated caller. Writes require a role in the
//! unrestricted group.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::student::{CreateStudent, Student, UpdateStudent};
use rollcall_db::repositories::StudentRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::require_non_blank;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireUnrestricted;
use crate::query::ClassParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/students?class=
pub async fn list_students(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ClassParams>,
) -> AppResult<Json<ApiResponse<Vec<Student>>>> {
    let students = StudentRepo::list(&state.pool, params.class_name()).await?;
    Ok(Json(ApiResponse::ok(students)))
}

/// GET /api/v1/students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Student>>> {
    let student = StudentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id,
        }))?;
    Ok(Json(ApiResponse::ok(student)))
}

/// POST /api/v1/students
///
/// A duplicate roll number is rejected with 409.
pub async fn create_student(
    State(state): State<AppState>,
    RequireUnrestricted(auth): RequireUnrestricted,
    payload: Result<Json<CreateStudent>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Student>>)> {
    let Json(mut input) = payload?;
    require_non_blank("rollNumber", &input.roll_number)?;
    require_non_blank("name", &input.name)?;
    require_non_blank("className", &input.class_name)?;
    input.roll_number = input.roll_number.trim().to_string();
    input.name = input.name.trim().to_string();
    input.class_name = input.class_name.trim().to_string();

    let student = StudentRepo::create(&state.pool, &input).await?;

    tracing::info!(
        student_id = student.id,
        roll_number = %student.roll_number,
        user_id = auth.user_id,
        "Student created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Student added", student)),
    ))
}

/// PUT /api/v1/students/{id}
///
/// The roll number cannot be changed.
pub async fn update_student(
    State(state): State<AppState>,
    RequireUnrestricted(auth): RequireUnrestricted,
    Path(id): Path<DbId>,
    payload: Result<Json<UpdateStudent>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Student>>> {
    let Json(input) = payload?;
    if let Some(name) = &input.name {
        require_non_blank("name", name)?;
    }
    if let Some(class_name) = &input.class_name {
        require_non_blank("className", class_name)?;
    }

    let student = StudentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id,
        }))?;

    tracing::info!(student_id = id, user_id = auth.user_id, "Student updated");
    Ok(Json(ApiResponse::with_message("Student updated", student)))
}

/// DELETE /api/v1/students/{id}
///
/// The student's attendance history is deleted with them.
pub async fn delete_student(
    State(state): State<AppState>,
    RequireUnrestricted(auth): RequireUnrestricted,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !StudentRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id,
        }));
    }
    tracing::info!(student_id = id, user_id = auth.user_id, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}
