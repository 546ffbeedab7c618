// crates/server/src/main.rs
//! Pitchside server binary.
//!
//! Opens the SQLite store, builds the Axum app, and serves the academy
//! API. Configuration comes from the environment; there is no config
//! file.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use pitchside_db::Database;
use pitchside_server::create_app;

/// Default port for the server.
const DEFAULT_PORT: u16 = 47311;

/// Get the server port from environment or use default.
fn get_port() -> u16 {
    std::env::var("PITCHSIDE_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Database location override (PITCHSIDE_DB), for running against a
/// scratch file instead of the per-user cache directory.
fn get_db_path() -> Option<PathBuf> {
    std::env::var("PITCHSIDE_DB").ok().map(PathBuf::from)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    eprintln!("\npitchside v{}\n", env!("CARGO_PKG_VERSION"));

    let db = match get_db_path() {
        Some(path) => Database::new(&path).await?,
        None => Database::open_default().await?,
    };
    eprintln!("  database: {}", db.db_path().display());

    let app = create_app(db);

    let port = get_port();
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    eprintln!("  listening on http://localhost:{}\n", port);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_port_default() {
        // Neither variable is set under `cargo test`.
        if std::env::var("PITCHSIDE_PORT").is_err() && std::env::var("PORT").is_err() {
            assert_eq!(get_port(), DEFAULT_PORT);
        }
    }
}
