//! Live record feed - push-based snapshots of classes, students and violations.
//!
//! Writers call [`LiveFeed::publish`] after a write commits. Each [`Subscription`]
//! yields a full, ordered snapshot of its record kind: once right after subscribing and
//! again after every publish. Publishes that land while a subscriber is busy coalesce
//! into one snapshot. Dropping or unsubscribing releases the observer.

use crate::{
    core::{class, student, violation},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::marker::PhantomData;
use tokio::sync::watch;
use tracing::trace;

/// The record kinds a subscriber can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Classes, ordered by name
    Classes,
    /// Students, ordered by name
    Students,
    /// Violations, newest first
    Violations,
}

/// A record type that can be observed through the live feed.
pub trait LiveRecord: Sized + Send + 'static {
    /// Kind whose publishes trigger a new snapshot
    const KIND: RecordKind;

    /// Loads every record of this kind in its order.
    fn load_ordered(db: &DatabaseConnection) -> impl Future<Output = Result<Vec<Self>>> + Send;
}

impl LiveRecord for entities::class::Model {
    const KIND: RecordKind = RecordKind::Classes;

    async fn load_ordered(db: &DatabaseConnection) -> Result<Vec<Self>> {
        class::get_all_classes(db).await
    }
}

impl LiveRecord for entities::student::Model {
    const KIND: RecordKind = RecordKind::Students;

    async fn load_ordered(db: &DatabaseConnection) -> Result<Vec<Self>> {
        student::get_all_students(db).await
    }
}

impl LiveRecord for entities::violation::Model {
    const KIND: RecordKind = RecordKind::Violations;

    async fn load_ordered(db: &DatabaseConnection) -> Result<Vec<Self>> {
        violation::get_all_violations(db).await
    }
}

/// Change notifier shared by writers and subscribers. Cloning shares the same channels.
#[derive(Debug, Clone)]
pub struct LiveFeed {
    classes: watch::Sender<u64>,
    students: watch::Sender<u64>,
    violations: watch::Sender<u64>,
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveFeed {
    /// Creates a feed with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            classes: watch::Sender::new(0),
            students: watch::Sender::new(0),
            violations: watch::Sender::new(0),
        }
    }

    const fn channel(&self, kind: RecordKind) -> &watch::Sender<u64> {
        match kind {
            RecordKind::Classes => &self.classes,
            RecordKind::Students => &self.students,
            RecordKind::Violations => &self.violations,
        }
    }

    /// Signals that records of `kind` were added, updated or deleted.
    pub fn publish(&self, kind: RecordKind) {
        self.channel(kind).send_modify(|version| *version += 1);
        trace!(?kind, "Published change");
    }

    /// Signals several kinds at once, e.g. after a cascade.
    pub fn publish_all(&self, kinds: &[RecordKind]) {
        for &kind in kinds {
            self.publish(kind);
        }
    }

    /// Subscribes to snapshots of `M`. The first [`Subscription::next`] yields the
    /// current records immediately.
    #[must_use]
    pub fn subscribe<M: LiveRecord>(&self, db: DatabaseConnection) -> Subscription<M> {
        let mut changes = self.channel(M::KIND).subscribe();
        changes.mark_changed();
        Subscription {
            db,
            changes,
            _record: PhantomData,
        }
    }

    /// Number of live subscriptions to `kind`.
    #[must_use]
    pub fn observers(&self, kind: RecordKind) -> usize {
        self.channel(kind).receiver_count()
    }
}

/// Cancelable handle yielding ordered snapshots of one record kind.
#[derive(Debug)]
pub struct Subscription<M> {
    db: DatabaseConnection,
    changes: watch::Receiver<u64>,
    _record: PhantomData<fn() -> M>,
}

impl<M: LiveRecord> Subscription<M> {
    /// Waits for the next change and returns a fresh snapshot.
    ///
    /// Returns `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<Result<Vec<M>>> {
        self.changes.changed().await.ok()?;
        Some(M::load_ordered(&self.db).await)
    }

    /// Stops observing. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}
