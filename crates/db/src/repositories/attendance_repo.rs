//! Repository for the `attendance` table: the atomic upsert, roster-joined
//! queries, and the aggregates behind stats and reports.

use chrono::NaiveDate;
use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::attendance::{
    AttendanceFilter, AttendanceRecord, AttendanceWithStudent, ClassTally, DayTally,
    StudentTally, UpsertedRecord,
};
use crate::models::student::Student;

const COLUMNS: &str = "id, student_id, date, status, created_at, updated_at";

const JOINED_COLUMNS: &str =
    "a.id, a.student_id, a.date, a.status, s.roll_number, s.name, s.class_name";

pub struct AttendanceRepo;

impl AttendanceRepo {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert the record for `(student_id, date)` or overwrite its status, in
    /// one statement against `uq_attendance_student_date`.
    ///
    /// `inserted` is true when the row did not exist before (`xmax = 0`).
    pub async fn upsert(
        pool: &PgPool,
        student_id: DbId,
        date: NaiveDate,
        status: &str,
    ) -> Result<UpsertedRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance (student_id, date, status)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_attendance_student_date
             DO UPDATE SET status = EXCLUDED.status
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        sqlx::query_as::<_, UpsertedRecord>(&query)
            .bind(student_id)
            .bind(date)
            .bind(status)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every record on `date`, returning the number removed.
    pub async fn delete_by_date(pool: &PgPool, date: NaiveDate) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attendance WHERE date = $1")
            .bind(date)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Records on one date, ordered by class then roll number.
    pub async fn list_by_date(
        pool: &PgPool,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceWithStudent>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM attendance a JOIN students s ON s.id = a.student_id
             WHERE a.date = $1
             ORDER BY s.class_name ASC, s.roll_number ASC"
        );
        sqlx::query_as::<_, AttendanceWithStudent>(&query)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    /// Records matching `filter`, ordered by date then class then roll number.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceWithStudent>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM attendance a JOIN students s ON s.id = a.student_id
             WHERE ($1::DATE IS NULL OR a.date >= $1)
               AND ($2::DATE IS NULL OR a.date <= $2)
               AND ($3::TEXT IS NULL OR s.class_name = $3)
             ORDER BY a.date ASC, s.class_name ASC, s.roll_number ASC"
        );
        sqlx::query_as::<_, AttendanceWithStudent>(&query)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.class_name.as_deref())
            .fetch_all(pool)
            .await
    }

    /// One student's history, newest first.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance WHERE student_id = $1 ORDER BY date DESC"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }

    /// Roster entries with no record on `date`, ordered by roll number.
    pub async fn missing_students(
        pool: &PgPool,
        date: NaiveDate,
        class_name: Option<&str>,
    ) -> Result<Vec<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            "SELECT s.id, s.roll_number, s.name, s.class_name, s.course, s.year, s.branch,
                    s.created_at, s.updated_at
             FROM students s
             WHERE ($2::TEXT IS NULL OR s.class_name = $2)
               AND NOT EXISTS (
                   SELECT 1 FROM attendance a WHERE a.student_id = s.id AND a.date = $1
               )
             ORDER BY s.roll_number ASC",
        )
        .bind(date)
        .bind(class_name)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Aggregates
    // -----------------------------------------------------------------------

    /// Roster size and marking counts for one date.
    pub async fn day_tally(pool: &PgPool, date: NaiveDate) -> Result<DayTally, sqlx::Error> {
        sqlx::query_as::<_, DayTally>(
            "SELECT (SELECT COUNT(*) FROM students) AS total_students,
                    COUNT(*) AS marked,
                    COUNT(*) FILTER (WHERE status = 'Present') AS present,
                    COUNT(*) FILTER (WHERE status = 'Absent') AS absent
             FROM attendance
             WHERE date = $1",
        )
        .bind(date)
        .fetch_one(pool)
        .await
    }

    /// Per-class roster size and counts over the filter's date range. Every
    /// class with at least one student appears, even with no records.
    pub async fn class_tallies(
        pool: &PgPool,
        filter: &AttendanceFilter,
    ) -> Result<Vec<ClassTally>, sqlx::Error> {
        sqlx::query_as::<_, ClassTally>(
            "SELECT s.class_name,
                    COUNT(DISTINCT s.id) AS students,
                    COUNT(a.id) FILTER (WHERE a.status = 'Present') AS present,
                    COUNT(a.id) FILTER (WHERE a.status = 'Absent') AS absent
             FROM students s
             LEFT JOIN attendance a
                    ON a.student_id = s.id
                   AND ($1::DATE IS NULL OR a.date >= $1)
                   AND ($2::DATE IS NULL OR a.date <= $2)
             WHERE ($3::TEXT IS NULL OR s.class_name = $3)
             GROUP BY s.class_name
             ORDER BY s.class_name ASC",
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.class_name.as_deref())
        .fetch_all(pool)
        .await
    }

    /// Per-student counts over the filter. Only students with at least one
    /// matching record appear.
    pub async fn student_tallies(
        pool: &PgPool,
        filter: &AttendanceFilter,
    ) -> Result<Vec<StudentTally>, sqlx::Error> {
        sqlx::query_as::<_, StudentTally>(
            "SELECT s.id AS student_id, s.roll_number, s.name, s.class_name,
                    COUNT(*) FILTER (WHERE a.status = 'Present') AS present,
                    COUNT(*) FILTER (WHERE a.status = 'Absent') AS absent
             FROM attendance a
             JOIN students s ON s.id = a.student_id
             WHERE ($1::DATE IS NULL OR a.date >= $1)
               AND ($2::DATE IS NULL OR a.date <= $2)
               AND ($3::TEXT IS NULL OR s.class_name = $3)
             GROUP BY s.id, s.roll_number, s.name, s.class_name
             ORDER BY s.class_name ASC, s.roll_number ASC",
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.class_name.as_deref())
        .fetch_all(pool)
        .await
    }
}
