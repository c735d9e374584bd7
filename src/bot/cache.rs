//! Roster cache for autocomplete.
//!
//! Autocomplete runs on every keystroke, so student suggestions are served from memory.
//! A background task keeps the cache in step with the live student feed.

use crate::{
    core::{
        live::{LiveFeed, Subscription},
        student::get_all_students,
    },
    entities::student,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, trace};

/// Discord rejects choice names longer than this.
const MAX_LABEL_CHARS: usize = 100;

/// The parts of a student an autocomplete suggestion needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedStudent {
    /// Student ID, used as the choice value
    pub id: i64,
    /// Student's name
    pub name: String,
    /// Class name snapshot, empty while unassigned
    pub class_name: String,
    /// Room, if any
    pub room: Option<String>,
}

impl From<&student::Model> for CachedStudent {
    fn from(s: &student::Model) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            class_name: s.class_name.clone(),
            room: s.room.clone(),
        }
    }
}

impl CachedStudent {
    /// Display text that tells apart students sharing a name, e.g. `Ali (Grade 7, Room 12)`.
    #[must_use]
    pub fn label(&self) -> String {
        let mut details = Vec::new();
        if !self.class_name.is_empty() {
            details.push(self.class_name.clone());
        }
        if let Some(room) = &self.room {
            details.push(format!("Room {room}"));
        }

        let label = if details.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, details.join(", "))
        };
        label.chars().take(MAX_LABEL_CHARS).collect()
    }
}

/// Shared, cloneable roster snapshot.
#[derive(Debug, Clone, Default)]
pub struct RosterCache {
    students: Arc<RwLock<Vec<CachedStudent>>>,
}

impl RosterCache {
    /// Replaces the cached roster with a fresh snapshot.
    pub async fn replace(&self, snapshot: &[student::Model]) {
        let mut writer = self.students.write().await;
        *writer = snapshot.iter().map(CachedStudent::from).collect();
        trace!("Roster cache now holds {} students", writer.len());
    }

    /// Reloads the roster from the database.
    pub async fn refresh(&self, db: &DatabaseConnection) -> Result<()> {
        info!("Refreshing roster cache...");
        let students = get_all_students(db).await?;
        self.replace(&students).await;
        Ok(())
    }

    /// Number of cached students.
    pub async fn len(&self) -> usize {
        self.students.read().await.len()
    }

    /// Whether the cache holds no students.
    pub async fn is_empty(&self) -> bool {
        self.students.read().await.is_empty()
    }

    /// Students whose name contains `partial` (ignoring case), at most `limit`, in
    /// roster order.
    pub async fn suggest(&self, partial: &str, limit: usize) -> Vec<CachedStudent> {
        let needle = partial.trim().to_lowercase();
        self.students
            .read()
            .await
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Keeps `cache` equal to the latest student snapshot until the feed goes away.
pub fn spawn_roster_sync(
    feed: &LiveFeed,
    db: DatabaseConnection,
    cache: RosterCache,
) -> JoinHandle<()> {
    let subscription: Subscription<student::Model> = feed.subscribe(db);
    tokio::spawn(async move {
        let mut subscription = subscription;
        while let Some(snapshot) = subscription.next().await {
            match snapshot {
                Ok(students) => cache.replace(&students).await,
                Err(e) => error!("Failed to reload roster snapshot: {e}"),
            }
        }
        info!("Roster feed closed; cache sync stopped");
    })
}
