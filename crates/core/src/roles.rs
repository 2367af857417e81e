//! Role names, caller identity, and attendance-marking capability groups.
//!
//! The literal role names must match the seed data in
//! `20250101000002_create_users.sql`. Which names may mark attendance, and
//! under what restriction, is decided by [`RoleGroups`] rather than by a
//! hard-coded list.

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_ADVISOR: &str = "advisor";
pub const ROLE_PRINCIPAL: &str = "principal";
pub const ROLE_HOD: &str = "hod";

/// Roles allowed to create, update and delete timetable periods.
pub const TIMETABLE_MANAGER_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_HOD, ROLE_PRINCIPAL];

/// Roles whose dashboard includes today's attendance totals.
pub const DASHBOARD_STATS_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_PRINCIPAL, ROLE_HOD];

/// The authenticated identity a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: DbId,
    pub role: String,
}

impl Caller {
    pub fn new(id: DbId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
        }
    }
}

/// How a role is allowed to mark attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerClass {
    /// May mark at any time.
    Unrestricted,
    /// May mark only while inside one of their assigned timetable periods.
    WindowRestricted,
}

/// Maps literal role names onto [`MarkerClass`] groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGroups {
    pub unrestricted: Vec<String>,
    pub window_restricted: Vec<String>,
}

impl Default for RoleGroups {
    fn default() -> Self {
        Self {
            unrestricted: vec![
                ROLE_ADMIN.to_string(),
                ROLE_ADVISOR.to_string(),
                ROLE_PRINCIPAL.to_string(),
                ROLE_HOD.to_string(),
            ],
            window_restricted: vec![ROLE_TEACHER.to_string()],
        }
    }
}

impl RoleGroups {
    /// Build groups from two comma-separated role lists, e.g. `"admin, hod"`.
    pub fn from_lists(unrestricted: &str, window_restricted: &str) -> Self {
        Self {
            unrestricted: split_roles(unrestricted),
            window_restricted: split_roles(window_restricted),
        }
    }

    /// Classify a role name. A role listed in both groups is unrestricted.
    pub fn classify(&self, role: &str) -> Option<MarkerClass> {
        if self.unrestricted.iter().any(|r| r == role) {
            Some(MarkerClass::Unrestricted)
        } else if self.window_restricted.iter().any(|r| r == role) {
            Some(MarkerClass::WindowRestricted)
        } else {
            None
        }
    }

    pub fn is_unrestricted(&self, role: &str) -> bool {
        self.classify(role) == Some(MarkerClass::Unrestricted)
    }
}

fn split_roles(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
