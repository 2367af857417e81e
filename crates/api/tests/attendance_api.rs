//! HTTP-level tests for attendance marking, queries, stats and deletion.

mod common;

use axum::http::StatusCode;
use common::{
    add_student, admin_token, body_json, delete_auth, get_auth, post_json, post_json_auth,
    teacher_token,
};
use rollcall_core::clock::FixedClock;
use rollcall_core::types::DbId;
use rollcall_db::models::timetable::CreateTimetablePeriod;
use rollcall_db::repositories::TimetableRepo;
use serde_json::json;
use sqlx::PgPool;

/// Give `teacher_id` a Monday 09:00-10:00 period.
async fn monday_morning_period(pool: &PgPool, teacher_id: DbId) {
    let input = CreateTimetablePeriod {
        day: "Monday".to_string(),
        period_number: 1,
        subject: "Mathematics".to_string(),
        class_name: "CSE-A".to_string(),
        teacher_id,
        start_time: "09:00".to_string(),
        end_time: "10:00".to_string(),
        color: None,
    };
    TimetableRepo::create(pool, &input).await.unwrap();
}

// ---------------------------------------------------------------------------
// Bulk marking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_bulk_end_to_end(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    let s2 = add_student(&pool, "A002", "CSE-A").await;
    assert_eq!((s1.id, s2.id), (1, 2));
    let app = common::build_test_app(pool);

    let body = json!({
        "students": [
            { "studentId": 1, "status": "Present" },
            { "studentId": 2, "status": "Absent" },
        ],
        "date": "2024-03-01",
    });
    let response = post_json_auth(app, "/api/v1/attendance/mark-bulk", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json,
        json!({
            "success": true,
            "data": {
                "success": 2,
                "failed": 0,
                "results": [
                    { "studentId": 1, "action": "created", "status": "Present" },
                    { "studentId": 2, "action": "created", "status": "Absent" },
                ],
                "errors": [],
            },
        })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_bulk_rerun_reports_updated(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    let body = json!({
        "students": [{ "studentId": s1.id, "status": "Present" }],
        "date": "2024-03-01",
    });

    let app = common::build_test_app(pool.clone());
    post_json_auth(app, "/api/v1/attendance/mark-bulk", body.clone(), &token).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(post_json_auth(app, "/api/v1/attendance/mark-bulk", body, &token).await).await;
    assert_eq!(json["data"]["results"][0]["action"], "updated");

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/attendance/date/2024-03-01", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_bulk_isolates_failures(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let mut ids = Vec::new();
    for roll in ["A001", "A002", "A003", "A004"] {
        ids.push(add_student(&pool, roll, "CSE-A").await.id);
    }
    let app = common::build_test_app(pool.clone());

    let body = json!({
        "students": [
            { "studentId": ids[0], "status": "Present" },
            { "studentId": ids[1], "status": "Absent" },
            { "studentId": ids[2], "status": "Late" },
            { "studentId": ids[3], "status": "Present" },
            { "studentId": 9999, "status": "Present" },
        ],
        "date": "2024-03-01",
    });
    let response = post_json_auth(app, "/api/v1/attendance/mark-bulk", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["success"], 3);
    assert_eq!(json["data"]["failed"], 2);
    assert_eq!(json["data"]["errors"][0]["studentId"], ids[2]);
    assert_eq!(json["data"]["errors"][1]["studentId"], 9999);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/attendance/date/2024-03-01", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_bulk_mistyped_item_fails_alone(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    let s2 = add_student(&pool, "A002", "CSE-A").await;
    let s3 = add_student(&pool, "A003", "CSE-A").await;
    let app = common::build_test_app(pool.clone());

    let body = json!({
        "students": [
            { "studentId": s1.id, "status": "Present" },
            { "studentId": s2.id.to_string(), "status": "Absent" },
            { "studentId": s3.id, "status": 7 },
            "not-an-object",
        ],
        "date": "2024-03-01",
    });
    let response = post_json_auth(app, "/api/v1/attendance/mark-bulk", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["success"], 1);
    assert_eq!(json["data"]["failed"], 3);
    assert_eq!(json["data"]["results"][0]["studentId"], s1.id);
    assert_eq!(
        json["data"]["errors"][0],
        json!({ "studentId": null, "error": "studentId must be an integer" })
    );
    assert_eq!(json["data"]["errors"][1]["studentId"], s3.id);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/attendance/date/2024-03-01", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_bulk_requires_students(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/attendance/mark-bulk", json!({ "date": "2024-03-01" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response =
        post_json_auth(app, "/api/v1/attendance/mark-bulk", json!({ "students": [] }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_bulk_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "students": [{ "studentId": 1, "status": "Present" }] });
    let response = post_json(app, "/api/v1/attendance/mark-bulk", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_teacher_bulk_is_not_window_gated_by_default(pool: PgPool) {
    let (_, token) = teacher_token(&pool, "t@test.com").await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    let app = common::build_test_app(pool);

    let body = json!({ "students": [{ "studentId": s1.id, "status": "Present" }] });
    let response = post_json_auth(app, "/api/v1/attendance/mark-bulk", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["success"], 1);
}

// ---------------------------------------------------------------------------
// Single marking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_creates_then_updates(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "studentId": s1.id, "status": "Present" });
    let response = post_json_auth(app, "/api/v1/attendance/mark", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Attendance marked successfully");
    // No date means the clock's today.
    assert_eq!(json["data"]["date"], "2024-03-04");
    assert_eq!(json["data"]["status"], "Present");

    let app = common::build_test_app(pool);
    let body = json!({ "studentId": s1.id, "status": "Absent", "date": "2024-03-04" });
    let json = body_json(post_json_auth(app, "/api/v1/attendance/mark", body, &token).await).await;
    assert_eq!(json["message"], "Attendance updated successfully");
    assert_eq!(json["data"]["status"], "Absent");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_validation_errors(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;

    let cases = [
        json!({ "status": "Present" }),
        json!({ "studentId": s1.id }),
        json!({ "studentId": s1.id, "status": "present" }),
        json!({ "studentId": s1.id, "status": "Present", "date": "03/01/2024" }),
    ];
    for body in cases {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(app, "/api/v1/attendance/mark", body.clone(), &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_unknown_student_returns_404(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({ "studentId": 9999, "status": "Present" });
    let response = post_json_auth(app, "/api/v1/attendance/mark", body, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_teacher_marks_inside_period_for_any_date(pool: PgPool) {
    let (teacher_id, token) = teacher_token(&pool, "t@test.com").await;
    monday_morning_period(&pool, teacher_id).await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    let app = common::build_test_app_at(pool, FixedClock::at(2024, 3, 4, 9, 30));

    let body = json!({ "studentId": s1.id, "status": "Present", "date": "2023-01-01" });
    let response = post_json_auth(app, "/api/v1/attendance/mark", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_teacher_outside_period_is_forbidden(pool: PgPool) {
    let (teacher_id, token) = teacher_token(&pool, "t@test.com").await;
    monday_morning_period(&pool, teacher_id).await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    let app = common::build_test_app_at(pool, FixedClock::at(2024, 3, 4, 10, 1));

    let body = json!({ "studentId": s1.id, "status": "Present" });
    let response = post_json_auth(app, "/api/v1/attendance/mark", body, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_teacher_without_periods_is_forbidden(pool: PgPool) {
    let (_, token) = teacher_token(&pool, "t@test.com").await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    let app = common::build_test_app(pool);

    let body = json!({ "studentId": s1.id, "status": "Present" });
    let response = post_json_auth(app, "/api/v1/attendance/mark", body, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_role_cannot_mark(pool: PgPool) {
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    let token = common::token_for(1, "janitor");
    let app = common::build_test_app(pool);

    let body = json!({ "studentId": s1.id, "status": "Present" });
    let response = post_json_auth(app, "/api/v1/attendance/mark", body, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Queries and stats
// ---------------------------------------------------------------------------

/// Three CSE-A/CSE-B students; A001 present and A002 absent on 2024-03-01.
async fn seed_day(pool: &PgPool, token: &str) {
    let s1 = add_student(pool, "A001", "CSE-A").await;
    let s2 = add_student(pool, "A002", "CSE-A").await;
    add_student(pool, "B001", "CSE-B").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "students": [
            { "studentId": s1.id, "status": "Present" },
            { "studentId": s2.id, "status": "Absent" },
        ],
        "date": "2024-03-01",
    });
    let response = post_json_auth(app, "/api/v1/attendance/mark-bulk", body, token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_students(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    add_student(&pool, "A002", "CSE-A").await;
    add_student(&pool, "A003", "CSE-A").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "studentId": s1.id, "status": "Present", "date": "2024-03-01" });
    post_json_auth(app, "/api/v1/attendance/mark", body, &token).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/attendance/missing/2024-03-01", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 2);
    let rolls: Vec<&str> = json["data"]["students"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["rollNumber"].as_str().unwrap())
        .collect();
    assert_eq!(rolls, vec!["A002", "A003"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_overview(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    seed_day(&pool, &token).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/attendance/stats/overview?date=2024-03-01", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["totalStudents"], 3);
    assert_eq!(data["marked"], 2);
    assert_eq!(data["present"], 1);
    assert_eq!(data["absent"], 1);
    assert_eq!(data["unmarked"], 1);
    assert_eq!(data["percentage"], 50);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_range_requires_both_dates(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    seed_day(&pool, &token).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/attendance/range?startDate=2024-03-01", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/attendance/range?startDate=2024-03-01&endDate=2024-03-31&class=CSE-A",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_history_summary(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let s1 = add_student(&pool, "A001", "CSE-A").await;
    for (date, status) in [
        ("2024-03-01", "Present"),
        ("2024-03-02", "Present"),
        ("2024-03-03", "Absent"),
    ] {
        let app = common::build_test_app(pool.clone());
        let body = json!({ "studentId": s1.id, "status": status, "date": date });
        post_json_auth(app, "/api/v1/attendance/mark", body, &token).await;
    }

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/attendance/student/{}", s1.id), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["records"].as_array().unwrap().len(), 3);
    assert_eq!(data["summary"]["total"], 3);
    assert_eq!(data["summary"]["percentage"], 67);
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_by_date(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    seed_day(&pool, &token).await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, "/api/v1/attendance/date/2024-03-01", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], 2);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/attendance/date/2024-03-01", &token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_teacher_cannot_delete_records(pool: PgPool) {
    let (_, admin) = admin_token(&pool).await;
    seed_day(&pool, &admin).await;
    let (_, teacher) = teacher_token(&pool, "t@test.com").await;
    let app = common::build_test_app(pool);

    let response = delete_auth(app, "/api/v1/attendance/date/2024-03-01", &teacher).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
