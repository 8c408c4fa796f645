// Study Planner - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use log::info;
use study_planner::api::{build_router, AppState};
use study_planner::{logging, open_database, Config};

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    logging::init_logging(&config.log_level, config.log_dir.as_deref())
        .map_err(anyhow::Error::msg)?;

    println!("🌐 Study Planner - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Open database
    let conn = open_database(&config.db_path)?;
    println!("✓ Database opened: {:?}", config.db_path);

    // Create shared state
    let state = AppState::new(conn, config.account_rules());
    let app = build_router(state, &config.cors_origin)?;

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(
        "event=server_start addr={} db={} cors={}",
        config.bind_addr,
        config.db_path.display(),
        config.cors_origin
    );
    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/api/health", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
