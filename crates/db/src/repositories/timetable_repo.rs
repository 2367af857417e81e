//! Repository for the `timetable_periods` table.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::timetable::{
    CreateTimetablePeriod, TimetablePeriod, TimetablePeriodWithTeacher, UpdateTimetablePeriod,
};

const COLUMNS: &str = "id, day, period_number, subject, class_name, teacher_id, \
                       start_time, end_time, color, created_at, updated_at";

/// Same columns qualified by the `t` alias, for joins with `users u`.
const JOINED_COLUMNS: &str = "t.id, t.day, t.period_number, t.subject, t.class_name, \
                              t.teacher_id, t.start_time, t.end_time, t.color, \
                              t.created_at, t.updated_at, u.name AS teacher_name";

/// Calendar ordering of weekday names for `ORDER BY`.
const DAY_ORDER: &str = "array_position(ARRAY['Monday','Tuesday','Wednesday','Thursday',\
                         'Friday','Saturday','Sunday'], t.day)";

pub struct TimetableRepo;

impl TimetableRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateTimetablePeriod,
    ) -> Result<TimetablePeriod, sqlx::Error> {
        let query = format!(
            "INSERT INTO timetable_periods
                (day, period_number, subject, class_name, teacher_id, start_time, end_time, color)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'white'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimetablePeriod>(&query)
            .bind(&input.day)
            .bind(input.period_number)
            .bind(&input.subject)
            .bind(&input.class_name)
            .bind(input.teacher_id)
            .bind(&input.start_time)
            .bind(&input.end_time)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimetablePeriod>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timetable_periods WHERE id = $1");
        sqlx::query_as::<_, TimetablePeriod>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every period with its teacher's name, in weekday then period order.
    pub async fn list_with_teacher(
        pool: &PgPool,
    ) -> Result<Vec<TimetablePeriodWithTeacher>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM timetable_periods t JOIN users u ON u.id = t.teacher_id
             ORDER BY {DAY_ORDER}, t.period_number ASC, t.id ASC"
        );
        sqlx::query_as::<_, TimetablePeriodWithTeacher>(&query)
            .fetch_all(pool)
            .await
    }

    /// One teacher's week, in weekday then period order.
    pub async fn list_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<Vec<TimetablePeriod>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timetable_periods t
             WHERE teacher_id = $1
             ORDER BY {DAY_ORDER}, period_number ASC"
        );
        sqlx::query_as::<_, TimetablePeriod>(&query)
            .bind(teacher_id)
            .fetch_all(pool)
            .await
    }

    /// A teacher's periods on one weekday, ordered by start time.
    pub async fn list_for_teacher_on_day(
        pool: &PgPool,
        teacher_id: DbId,
        day: &str,
    ) -> Result<Vec<TimetablePeriod>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timetable_periods
             WHERE teacher_id = $1 AND day = $2
             ORDER BY start_time ASC, period_number ASC"
        );
        sqlx::query_as::<_, TimetablePeriod>(&query)
            .bind(teacher_id)
            .bind(day)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTimetablePeriod,
    ) -> Result<Option<TimetablePeriod>, sqlx::Error> {
        let query = format!(
            "UPDATE timetable_periods SET
                day = COALESCE($2, day),
                period_number = COALESCE($3, period_number),
                subject = COALESCE($4, subject),
                class_name = COALESCE($5, class_name),
                teacher_id = COALESCE($6, teacher_id),
                start_time = COALESCE($7, start_time),
                end_time = COALESCE($8, end_time),
                color = COALESCE($9, color)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimetablePeriod>(&query)
            .bind(id)
            .bind(&input.day)
            .bind(input.period_number)
            .bind(&input.subject)
            .bind(&input.class_name)
            .bind(input.teacher_id)
            .bind(&input.start_time)
            .bind(&input.end_time)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timetable_periods WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
