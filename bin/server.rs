// Estate Tracker - Web Server

use anyhow::{Context, Result};
use estate_tracker::config::AppConfig;
use estate_tracker::db::open_database;
use estate_tracker::logging::init_logging;
use estate_tracker::web::{router, AppState};
use tracing::info;

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let verbose = std::env::args().any(|a| a == "-v" || a == "--verbose");
    init_logging(verbose);

    println!("⚖️  Estate Tracker - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = AppConfig::from_env()?;
    config.ensure_database_dir()?;

    // Open database (schema is created on first run)
    let conn = open_database(&config.database_path)?;
    println!("✓ Database opened: {}", config.database_path.display());

    let addr = config.bind_addr.clone();
    let state = AppState::new(conn, config);
    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "listening");
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/summary", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server error")?;
    Ok(())
}
