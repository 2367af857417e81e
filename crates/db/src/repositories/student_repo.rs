//! Repository for the `students` table.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::student::{CreateStudent, Student, UpdateStudent};

const COLUMNS: &str =
    "id, roll_number, name, class_name, course, year, branch, created_at, updated_at";

pub struct StudentRepo;

impl StudentRepo {
    /// Insert a student. A duplicate roll number violates `uq_students_roll_number`.
    pub async fn create(pool: &PgPool, input: &CreateStudent) -> Result<Student, sqlx::Error> {
        let query = format!(
            "INSERT INTO students (roll_number, name, class_name, course, year, branch)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(&input.roll_number)
            .bind(&input.name)
            .bind(&input.class_name)
            .bind(&input.course)
            .bind(&input.year)
            .bind(&input.branch)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM students WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List the roster ordered by class then roll number, optionally for one class.
    pub async fn list(pool: &PgPool, class_name: Option<&str>) -> Result<Vec<Student>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM students
             WHERE ($1::TEXT IS NULL OR class_name = $1)
             ORDER BY class_name ASC, roll_number ASC"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(class_name)
            .fetch_all(pool)
            .await
    }

    /// The first `limit` students in roster order.
    pub async fn list_first(pool: &PgPool, limit: i64) -> Result<Vec<Student>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM students
             ORDER BY class_name ASC, roll_number ASC
             LIMIT $1"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(pool)
            .await
    }

    /// Apply the non-`None` fields of `input`. Returns `None` if the student does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStudent,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!(
            "UPDATE students SET
                name = COALESCE($2, name),
                class_name = COALESCE($3, class_name),
                course = COALESCE($4, course),
                year = COALESCE($5, year),
                branch = COALESCE($6, branch)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.class_name)
            .bind(&input.course)
            .bind(&input.year)
            .bind(&input.branch)
            .fetch_optional(pool)
            .await
    }

    /// Delete a student and, by cascade, their attendance history.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
