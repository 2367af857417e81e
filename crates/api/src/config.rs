use std::path::PathBuf;
use std::time::Duration;

use rollcall_core::reconciler::MarkingPolicy;
use rollcall_core::roles::RoleGroups;
use rollcall_core::timetable::{WindowPolicy, WindowReference};

use crate::auth::jwt::JwtConfig;
use crate::export::PdfFonts;

/// Server configuration loaded from environment variables.
///
/// Every field has a default suitable for local development except the JWT
/// secret and the database URL (read in `main`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Connection pool size (default: `20`).
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    /// Role groups, window policy, and bulk item timeout for attendance marking.
    pub marking: MarkingPolicy,
    /// Default cut-off for the low-attendance report, in percent.
    pub low_attendance_threshold: i64,
    /// Font family used by the PDF report export.
    pub report_fonts: PdfFonts,
    /// Insert demo students and staff into empty tables on startup.
    pub seed_demo_data: bool,
    /// Plaintext password given to every seeded demo user.
    pub seed_demo_password: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                        |
    /// |----------------------------|--------------------------------|
    /// | `HOST`                     | `0.0.0.0`                      |
    /// | `PORT`                     | `3000`                         |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`        |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                           |
    /// | `DB_MAX_CONNECTIONS`       | `20`                           |
    /// | `UNRESTRICTED_ROLES`       | `admin,advisor,principal,hod`  |
    /// | `WINDOW_RESTRICTED_ROLES`  | `teacher`                      |
    /// | `BULK_WINDOW_CHECK`        | `false`                        |
    /// | `WINDOW_REFERENCE`         | `wall-clock`                   |
    /// | `BULK_ITEM_TIMEOUT_MS`     | `5000` (`0` disables)          |
    /// | `LOW_ATTENDANCE_THRESHOLD` | `75`                           |
    /// | `REPORT_FONT_DIR`          | `./fonts`                      |
    /// | `REPORT_FONT_FAMILY`       | `LiberationSans`               |
    /// | `SEED_DEMO_DATA`           | `false`                        |
    /// | `SEED_DEMO_PASSWORD`       | `password123`                  |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on any value that fails to parse. Misconfiguration should stop
    /// the server at startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), JwtConfig::from_env())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>, jwt: JwtConfig) -> Self {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");

        let port: u16 = var("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let db_max_connections: u32 = var("DB_MAX_CONNECTIONS", "20")
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let roles = RoleGroups::from_lists(
            &var("UNRESTRICTED_ROLES", "admin,advisor,principal,hod"),
            &var("WINDOW_RESTRICTED_ROLES", "teacher"),
        );

        let gate_bulk = parse_bool(&var("BULK_WINDOW_CHECK", "false"))
            .expect("BULK_WINDOW_CHECK must be true or false");

        let reference = WindowReference::parse(&var("WINDOW_REFERENCE", "wall-clock"))
            .unwrap_or_else(|e| panic!("WINDOW_REFERENCE: {e}"));

        let item_timeout_ms: u64 = var("BULK_ITEM_TIMEOUT_MS", "5000")
            .parse()
            .expect("BULK_ITEM_TIMEOUT_MS must be a valid u64");

        let low_attendance_threshold: i64 = var("LOW_ATTENDANCE_THRESHOLD", "75")
            .parse()
            .expect("LOW_ATTENDANCE_THRESHOLD must be a valid integer");

        let defaults = PdfFonts::default();
        let report_fonts = PdfFonts {
            dir: get("REPORT_FONT_DIR").map_or(defaults.dir, PathBuf::from),
            family: get("REPORT_FONT_FAMILY").unwrap_or(defaults.family),
        };

        let seed_demo_data = parse_bool(&var("SEED_DEMO_DATA", "false"))
            .expect("SEED_DEMO_DATA must be true or false");

        let seed_demo_password = var("SEED_DEMO_PASSWORD", "password123");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            db_max_connections,
            jwt,
            marking: MarkingPolicy {
                roles,
                window: WindowPolicy {
                    gate_bulk,
                    reference,
                },
                item_timeout: (item_timeout_ms > 0).then(|| Duration::from_millis(item_timeout_ms)),
            },
            low_attendance_threshold,
            report_fonts,
            seed_demo_data,
            seed_demo_password,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
