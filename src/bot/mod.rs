//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for Managea, including all slash
//! commands, autocomplete handlers, the roster cache and bot context management.

/// Roster cache that serves student autocomplete
pub mod cache;
/// Discord command implementations (mark, records, student, dashboard, manage, general)
pub mod commands;
/// Framework setup and error handling
pub mod framework;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::Settings,
    core::live::{LiveFeed, RecordKind},
};
use cache::RosterCache;
use sea_orm::DatabaseConnection;

/// Shared data available to all bot commands.
/// This structure holds the database connection, the live feed writers publish to,
/// the roster cache used by autocomplete and the loaded settings.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Change notifications for classes, students and violations
    pub feed: LiveFeed,
    /// In-memory roster kept fresh from the student feed
    pub roster: RosterCache,
    /// Settings loaded from config.toml
    pub settings: Settings,
}

impl BotData {
    /// Creates a new `BotData` instance with an empty roster cache and a fresh feed.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self {
            database,
            feed: LiveFeed::new(),
            roster: RosterCache::default(),
            settings,
        }
    }

    /// Announces that records of the given kinds changed.
    pub fn publish(&self, kinds: &[RecordKind]) {
        self.feed.publish_all(kinds);
    }
}

pub use commands::*;
pub use framework::run_bot;
pub use handlers::*;
