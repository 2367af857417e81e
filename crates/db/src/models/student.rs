//! Roster entry model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `students` table. `class_name` is exposed as `class`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: DbId,
    pub roll_number: String,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub course: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudent {
    pub roll_number: String,
    pub name: String,
    #[serde(alias = "class")]
    pub class_name: String,
    pub course: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
}

/// Partial update. The roll number is fixed at creation and cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudent {
    pub name: Option<String>,
    #[serde(alias = "class")]
    pub class_name: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
}
