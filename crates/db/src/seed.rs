//! Demo data inserted on startup when `SEED_DEMO_DATA` is enabled.
//!
//! Each table is seeded only while it is empty, so restarting never
//! duplicates rows or overwrites edits.

use rollcall_core::roles::{ROLE_ADMIN, ROLE_TEACHER};
use sqlx::PgPool;

use crate::models::student::CreateStudent;
use crate::models::user::CreateUser;
use crate::repositories::{RoleRepo, StudentRepo, UserRepo};

/// `(roll_number, name, class)`
const DEMO_STUDENTS: &[(&str, &str, &str)] = &[
    ("A001", "John Doe", "CSE-A"),
    ("A002", "Jane Smith", "CSE-A"),
    ("A003", "Alex Brown", "CSE-A"),
    ("B001", "Bob Johnson", "CSE-B"),
    ("B002", "Carol White", "CSE-B"),
];

/// `(staff_id, name, email, role)`
const DEMO_USERS: &[(&str, &str, &str, &str)] = &[
    ("ADM001", "Admin User", "admin@pgp.com", ROLE_ADMIN),
    ("TCH001", "Teacher John", "teacher@pgp.com", ROLE_TEACHER),
    ("TCH002", "Teacher Sarah", "sarah@pgp.com", ROLE_TEACHER),
];

/// Rows inserted by [`seed_demo_data`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub students: usize,
    pub users: usize,
}

/// Insert demo students and staff. `password_hash` is shared by every demo user.
pub async fn seed_demo_data(pool: &PgPool, password_hash: &str) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();

    if StudentRepo::count(pool).await? == 0 {
        for (roll_number, name, class_name) in DEMO_STUDENTS {
            let input = CreateStudent {
                roll_number: roll_number.to_string(),
                name: name.to_string(),
                class_name: class_name.to_string(),
                course: Some("B.Tech".into()),
                year: Some("III".into()),
                branch: Some("CSE".into()),
            };
            StudentRepo::create(pool, &input).await?;
            report.students += 1;
        }
    }

    if UserRepo::count(pool).await? == 0 {
        for (staff_id, name, email, role_name) in DEMO_USERS {
            let Some(role) = RoleRepo::find_by_name(pool, role_name).await? else {
                tracing::warn!(role = *role_name, "Demo role missing, skipping user");
                continue;
            };
            let input = CreateUser {
                staff_id: Some(staff_id.to_string()),
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                role_id: role.id,
            };
            UserRepo::create(pool, &input).await?;
            report.users += 1;
        }
    }

    tracing::info!(
        students = report.students,
        users = report.users,
        "Demo data seeded"
    );
    Ok(report)
}
