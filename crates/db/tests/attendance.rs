//! Integration tests for the attendance upsert, queries, aggregates and the
//! Postgres ledger driven through the reconciler.

use assert_matches::assert_matches;
use chrono::NaiveDate;
use rollcall_core::attendance::{BulkItem, UpsertAction};
use rollcall_core::clock::FixedClock;
use rollcall_core::reconciler::{MarkingPolicy, Reconciler};
use rollcall_core::roles::Caller;
use rollcall_core::types::DbId;
use rollcall_db::ledger::PgAttendanceLedger;
use rollcall_db::models::attendance::AttendanceFilter;
use rollcall_db::models::student::{CreateStudent, Student};
use rollcall_db::repositories::{AttendanceRepo, StudentRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn add_student(pool: &PgPool, roll: &str, class_name: &str) -> Student {
    let input = CreateStudent {
        roll_number: roll.to_string(),
        name: format!("Student {roll}"),
        class_name: class_name.to_string(),
        course: None,
        year: None,
        branch: None,
    };
    StudentRepo::create(pool, &input).await.unwrap()
}

async fn stored_status(pool: &PgPool, student_id: DbId, date: NaiveDate) -> Option<String> {
    sqlx::query_scalar("SELECT status FROM attendance WHERE student_id = $1 AND date = $2")
        .bind(student_id)
        .bind(date)
        .fetch_optional(pool)
        .await
        .unwrap()
}

async fn row_count(pool: &PgPool, student_id: DbId, date: NaiveDate) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE student_id = $1 AND date = $2")
        .bind(student_id)
        .bind(date)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Upsert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_creates_then_updates(pool: PgPool) {
    let s = add_student(&pool, "A001", "CSE-A").await;
    let date = day(2024, 3, 1);

    let first = AttendanceRepo::upsert(&pool, s.id, date, "Present")
        .await
        .unwrap();
    assert!(first.inserted);
    assert_eq!(first.record.status, "Present");

    let second = AttendanceRepo::upsert(&pool, s.id, date, "Absent")
        .await
        .unwrap();
    assert!(!second.inserted);
    assert_eq!(second.record.id, first.record.id);

    let stored = stored_status(&pool, s.id, date).await;
    assert_eq!(stored.as_deref(), Some("Absent"));
    assert_eq!(AttendanceRepo::list_for_student(&pool, s.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_upserts_leave_one_row(pool: PgPool) {
    let student_id = add_student(&pool, "A001", "CSE-A").await.id;
    let date = day(2024, 3, 1);

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let pool = pool.clone();
            let status = if i % 2 == 0 { "Present" } else { "Absent" };
            tokio::spawn(async move {
                AttendanceRepo::upsert(&pool, student_id, date, status).await
            })
        })
        .collect();

    let mut inserted = 0;
    let mut ids = Vec::new();
    for task in tasks {
        let upserted = task.await.unwrap().unwrap();
        if upserted.inserted {
            inserted += 1;
        }
        ids.push(upserted.record.id);
    }

    assert_eq!(inserted, 1);
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(row_count(&pool, student_id, date).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_marks_through_reconciler(pool: PgPool) {
    let s = add_student(&pool, "A001", "CSE-A").await;
    let date = day(2024, 3, 1);
    let ledger = PgAttendanceLedger::new(pool.clone());
    let clock = FixedClock::at(2024, 3, 4, 9, 30);
    let policy = MarkingPolicy::default();
    let reconciler = Reconciler::new(&ledger, &clock, &policy);
    let admin = Caller::new(1, "admin");

    let (a, b, c) = tokio::join!(
        reconciler.mark(&admin, s.id, "Present", Some(date)),
        reconciler.mark(&admin, s.id, "Absent", Some(date)),
        reconciler.mark(&admin, s.id, "Present", Some(date)),
    );
    let actions = [a.unwrap().1, b.unwrap().1, c.unwrap().1];

    let created = actions
        .iter()
        .filter(|a| **a == UpsertAction::Created)
        .count();
    assert_eq!(created, 1);
    assert_eq!(row_count(&pool, s.id, date).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_check_constraint(pool: PgPool) {
    let s = add_student(&pool, "A001", "CSE-A").await;
    let result = AttendanceRepo::upsert(&pool, s.id, day(2024, 3, 1), "Late").await;
    assert_matches!(result, Err(sqlx::Error::Database(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_student_cascades(pool: PgPool) {
    let s = add_student(&pool, "A001", "CSE-A").await;
    AttendanceRepo::upsert(&pool, s.id, day(2024, 3, 1), "Present")
        .await
        .unwrap();

    assert!(StudentRepo::delete(&pool, s.id).await.unwrap());
    let rows = AttendanceRepo::list_by_date(&pool, day(2024, 3, 1)).await.unwrap();
    assert!(rows.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_roll_number_is_rejected(pool: PgPool) {
    add_student(&pool, "A001", "CSE-A").await;
    let input = CreateStudent {
        roll_number: "A001".into(),
        name: "Someone Else".into(),
        class_name: "CSE-B".into(),
        course: None,
        year: None,
        branch: None,
    };
    let err = StudentRepo::create(&pool, &input).await.unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_students_roll_number"));
}

// ---------------------------------------------------------------------------
// Queries and aggregates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_students(pool: PgPool) {
    let a = add_student(&pool, "A001", "CSE-A").await;
    add_student(&pool, "A002", "CSE-A").await;
    add_student(&pool, "B001", "CSE-B").await;
    let date = day(2024, 3, 1);
    AttendanceRepo::upsert(&pool, a.id, date, "Present")
        .await
        .unwrap();

    let missing = AttendanceRepo::missing_students(&pool, date, None)
        .await
        .unwrap();
    let rolls: Vec<&str> = missing.iter().map(|s| s.roll_number.as_str()).collect();
    assert_eq!(rolls, ["A002", "B001"]);

    let missing_b = AttendanceRepo::missing_students(&pool, date, Some("CSE-B"))
        .await
        .unwrap();
    assert_eq!(missing_b.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_day_and_class_tallies(pool: PgPool) {
    let a1 = add_student(&pool, "A001", "CSE-A").await;
    let a2 = add_student(&pool, "A002", "CSE-A").await;
    let b1 = add_student(&pool, "B001", "CSE-B").await;
    let d1 = day(2024, 3, 1);
    let d2 = day(2024, 3, 2);
    AttendanceRepo::upsert(&pool, a1.id, d1, "Present").await.unwrap();
    AttendanceRepo::upsert(&pool, a2.id, d1, "Absent").await.unwrap();
    AttendanceRepo::upsert(&pool, a1.id, d2, "Present").await.unwrap();

    let tally = AttendanceRepo::day_tally(&pool, d1).await.unwrap();
    assert_eq!(tally.total_students, 3);
    assert_eq!(tally.marked, 2);
    assert_eq!(tally.present, 1);
    assert_eq!(tally.absent, 1);

    let filter = AttendanceFilter {
        start_date: Some(d1),
        end_date: Some(d1),
        class_name: None,
    };
    let classes = AttendanceRepo::class_tallies(&pool, &filter).await.unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0].class_name, "CSE-A");
    assert_eq!(classes[0].students, 2);
    assert_eq!(classes[0].present, 1);
    assert_eq!(classes[0].absent, 1);
    assert_eq!(classes[1].class_name, "CSE-B");
    assert_eq!(classes[1].students, 1);
    assert_eq!(classes[1].present + classes[1].absent, 0);

    let students = AttendanceRepo::student_tallies(&pool, &AttendanceFilter::default())
        .await
        .unwrap();
    assert_eq!(students.len(), 2);
    assert!(students.iter().all(|t| t.student_id != b1.id));
    let a1_tally = students.iter().find(|t| t.student_id == a1.id).unwrap();
    assert_eq!((a1_tally.present, a1_tally.absent), (2, 0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_by_date(pool: PgPool) {
    let a = add_student(&pool, "A001", "CSE-A").await;
    let b = add_student(&pool, "A002", "CSE-A").await;
    let date = day(2024, 3, 1);
    AttendanceRepo::upsert(&pool, a.id, date, "Present").await.unwrap();
    AttendanceRepo::upsert(&pool, b.id, date, "Absent").await.unwrap();
    AttendanceRepo::upsert(&pool, a.id, day(2024, 3, 2), "Present")
        .await
        .unwrap();

    assert_eq!(AttendanceRepo::delete_by_date(&pool, date).await.unwrap(), 2);
    assert_eq!(AttendanceRepo::list_for_student(&pool, a.id).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Ledger through the reconciler
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_mark_isolates_bad_item(pool: PgPool) {
    let mut ids = Vec::new();
    for roll in ["A001", "A002", "A003", "A004"] {
        ids.push(add_student(&pool, roll, "CSE-A").await.id);
    }
    let ledger = PgAttendanceLedger::new(pool.clone());
    let clock = FixedClock::at(2024, 3, 4, 9, 30);
    let policy = MarkingPolicy::default();
    let reconciler = Reconciler::new(&ledger, &clock, &policy);
    let admin = Caller::new(1, "admin");
    let date = day(2024, 3, 1);

    let items = vec![
        BulkItem::new(ids[0], "Present"),
        BulkItem::new(ids[1], "Absent"),
        BulkItem::new(ids[2], "Late"),
        BulkItem::new(ids[3], "Present"),
        BulkItem::new(999_999, "Present"),
    ];
    let result = reconciler.mark_bulk(&admin, &items, Some(date)).await.unwrap();
    assert_eq!(result.succeeded.len(), 3);
    assert_eq!(result.failed.len(), 2);
    assert_eq!(result.failed[0].student_id, Some(ids[2]));
    assert_eq!(result.failed[1].error, "Student not found");

    let rows = AttendanceRepo::list_by_date(&pool, date).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.student_id != ids[2]));

    // A second identical run updates in place.
    let again = reconciler.mark_bulk(&admin, &items, Some(date)).await.unwrap();
    assert!(again
        .succeeded
        .iter()
        .all(|s| s.action == UpsertAction::Updated));
    assert_eq!(AttendanceRepo::list_by_date(&pool, date).await.unwrap().len(), 3);
}
