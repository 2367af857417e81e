use std::net::SocketAddr;
use std::sync::Arc;

use rollcall_core::clock::SystemClock;
use rollcall_db::repositories::RefreshSessionRepo;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rollcall_api::auth::password::hash_password;
use rollcall_api::config::ServerConfig;
use rollcall_api::router::build_app_router;
use rollcall_api::state::AppState;

/// Revoked or expired refresh sessions are kept this long for auditing.
const STALE_SESSION_RETENTION_DAYS: i32 = 30;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        unrestricted_roles = ?config.marking.roles.unrestricted,
        window_restricted_roles = ?config.marking.roles.window_restricted,
        gate_bulk = config.marking.window.gate_bulk,
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = rollcall_db::create_pool(&database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    rollcall_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    rollcall_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Session housekeeping ---
    match RefreshSessionRepo::purge_stale(&pool, STALE_SESSION_RETENTION_DAYS).await {
        Ok(purged) => tracing::info!(purged, "Stale refresh sessions purged"),
        Err(e) => tracing::warn!(error = %e, "Failed to purge stale refresh sessions"),
    }

    // --- Demo data ---
    if config.seed_demo_data {
        let password_hash =
            hash_password(&config.seed_demo_password).expect("Failed to hash demo password");
        let report = rollcall_db::seed::seed_demo_data(&pool, &password_hash)
            .await
            .expect("Failed to seed demo data");
        tracing::info!(
            students = report.students,
            users = report.users,
            "Demo data seeded"
        );
    }

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        clock: Arc::new(SystemClock),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
