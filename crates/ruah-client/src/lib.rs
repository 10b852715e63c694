//! # ruah-client
//!
//! Client logic for Ruah Ignis, the group prayer-streak and quiz game:
//! session resolution, the secret friend draw, the daily prayer streak,
//! the daily quiz, leaderboards, and the angel-stamped dual-context chat.
//!
//! Everything talks to the hosted store through the
//! [`RemoteStore`](ruah_store::RemoteStore) contract, passed explicitly
//! into each operation; there is no ambient current-user singleton. A GUI
//! shell drives these operations and renders their results.

pub mod chat;
pub mod config;
pub mod directory;
pub mod events;
pub mod leaderboard;
pub mod quiz;
pub mod session;
pub mod state;
pub mod streak;

mod error;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use session::SessionFile;
pub use state::{AppState, Tab, Theme};

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging for a shell embedding this crate.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ruah_client=debug,ruah_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
