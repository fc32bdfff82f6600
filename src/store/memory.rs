//! In-process keyed snapshot store with change notification

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::Utc;
use rand::Rng;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::StoreError;
use crate::state::{TimerPatch, TimerSnapshot};

/// Alphabet shared by session and timer ids
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const SESSION_ID_LEN: usize = 6;
const TIMER_ID_LEN: usize = 20;

/// One row of the per-session timer list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEntry {
    pub id: String,
    pub name: String,
}

/// Session existence marker plus owner metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub created_at: i64,
    pub owner: String,
}

#[derive(Debug)]
struct TimerDoc {
    tx: watch::Sender<Option<TimerSnapshot>>,
    /// Keep the receiver alive to prevent channel closure
    _rx: watch::Receiver<Option<TimerSnapshot>>,
}

#[derive(Debug)]
struct SessionDoc {
    created_at: i64,
    owner: String,
    timers: HashMap<String, TimerDoc>,
    list_tx: watch::Sender<Vec<TimerEntry>>,
    /// Keep the receiver alive to prevent channel closure
    _list_rx: watch::Receiver<Vec<TimerEntry>>,
}

impl SessionDoc {
    fn publish_list(&self) {
        let mut entries: Vec<TimerEntry> = self
            .timers
            .iter()
            .filter_map(|(id, doc)| {
                doc.tx.borrow().as_ref().map(|snapshot| TimerEntry {
                    id: id.clone(),
                    name: snapshot.name.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        if let Err(e) = self.list_tx.send(entries) {
            warn!("Failed to publish timer list: {}", e);
        }
    }
}

/// In-process stand-in for the hosted document store. Cloning shares the
/// same underlying directory, so every clone sees every write.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    sessions: Arc<Mutex<HashMap<String, SessionDoc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, SessionDoc>>, StoreError> {
        self.sessions.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Create a new session and return its shareable id
    pub fn create_session(&self, owner: &str) -> Result<String, StoreError> {
        let mut sessions = self.lock()?;
        let session_id = loop {
            let candidate = random_id(SESSION_ID_LEN);
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let (list_tx, list_rx) = watch::channel(Vec::new());
        sessions.insert(
            session_id.clone(),
            SessionDoc {
                created_at: Utc::now().timestamp_millis(),
                owner: owner.to_string(),
                timers: HashMap::new(),
                list_tx,
                _list_rx: list_rx,
            },
        );
        info!("Created session {}", session_id);
        Ok(session_id)
    }

    /// Look up a session's existence marker and owner metadata
    pub fn session(&self, session_id: &str) -> Result<SessionInfo, StoreError> {
        let sessions = self.lock()?;
        let doc = sessions
            .get(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        Ok(SessionInfo {
            created_at: doc.created_at,
            owner: doc.owner.clone(),
        })
    }

    /// Create a timer with default state inside a session
    pub fn create_timer(&self, session_id: &str, name: &str) -> Result<String, StoreError> {
        let mut sessions = self.lock()?;
        let doc = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        let timer_id = loop {
            let candidate = random_id(TIMER_ID_LEN);
            if !doc.timers.contains_key(&candidate) {
                break candidate;
            }
        };
        let (tx, rx) = watch::channel(Some(TimerSnapshot::new(name)));
        doc.timers.insert(timer_id.clone(), TimerDoc { tx, _rx: rx });
        doc.publish_list();
        info!("Created timer {} ({}) in session {}", timer_id, name, session_id);
        Ok(timer_id)
    }

    /// Read the current snapshot of a timer
    pub fn timer(&self, session_id: &str, timer_id: &str) -> Result<TimerSnapshot, StoreError> {
        let sessions = self.lock()?;
        let doc = sessions
            .get(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        let timer = doc
            .timers
            .get(timer_id)
            .ok_or_else(|| StoreError::TimerNotFound(timer_id.to_string()))?;
        let snapshot = timer.tx.borrow().clone();
        snapshot.ok_or_else(|| StoreError::TimerNotFound(timer_id.to_string()))
    }

    /// Merge a partial update into a timer, stamping the write with the
    /// current wall clock, and notify subscribers
    pub fn update_timer(
        &self,
        session_id: &str,
        timer_id: &str,
        patch: &TimerPatch,
    ) -> Result<(), StoreError> {
        self.update_timer_at(session_id, timer_id, patch, Utc::now().timestamp_millis())
    }

    /// Merge a partial update stamped with an explicit timestamp
    pub fn update_timer_at(
        &self,
        session_id: &str,
        timer_id: &str,
        patch: &TimerPatch,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let sessions = self.lock()?;
        let doc = sessions
            .get(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        let timer = doc
            .timers
            .get(timer_id)
            .ok_or_else(|| StoreError::TimerNotFound(timer_id.to_string()))?;

        let mut snapshot = timer
            .tx
            .borrow()
            .clone()
            .ok_or_else(|| StoreError::TimerNotFound(timer_id.to_string()))?;
        let renamed = patch.name.is_some() && patch.name.as_deref() != Some(snapshot.name.as_str());
        patch.apply(&mut snapshot, now_ms);
        debug!("Updated timer {} in session {}", timer_id, session_id);
        if let Err(e) = timer.tx.send(Some(snapshot)) {
            warn!("Failed to notify timer subscribers: {}", e);
        }
        if renamed {
            doc.publish_list();
        }
        Ok(())
    }

    /// Delete a timer; subscribers observe the deletion as an absent snapshot
    pub fn delete_timer(&self, session_id: &str, timer_id: &str) -> Result<(), StoreError> {
        let mut sessions = self.lock()?;
        let doc = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        let timer = doc
            .timers
            .remove(timer_id)
            .ok_or_else(|| StoreError::TimerNotFound(timer_id.to_string()))?;
        if let Err(e) = timer.tx.send(None) {
            warn!("Failed to notify timer subscribers of deletion: {}", e);
        }
        doc.publish_list();
        info!("Deleted timer {} from session {}", timer_id, session_id);
        Ok(())
    }

    /// Subscribe to one timer's snapshot. The receiver yields the full
    /// current snapshot on every change; `None` signals deletion.
    pub fn subscribe_timer(
        &self,
        session_id: &str,
        timer_id: &str,
    ) -> Result<watch::Receiver<Option<TimerSnapshot>>, StoreError> {
        let sessions = self.lock()?;
        let doc = sessions
            .get(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        let timer = doc
            .timers
            .get(timer_id)
            .ok_or_else(|| StoreError::TimerNotFound(timer_id.to_string()))?;
        Ok(timer.tx.subscribe())
    }

    /// Subscribe to the set of timers within a session
    pub fn subscribe_timers(
        &self,
        session_id: &str,
    ) -> Result<watch::Receiver<Vec<TimerEntry>>, StoreError> {
        let sessions = self.lock()?;
        let doc = sessions
            .get(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        Ok(doc.list_tx.subscribe())
    }

    /// Current timer list of a session
    pub fn timers(&self, session_id: &str) -> Result<Vec<TimerEntry>, StoreError> {
        let sessions = self.lock()?;
        let doc = sessions
            .get(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        let timers = doc.list_tx.borrow().clone();
        Ok(timers)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn random_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Direction;

    #[test]
    fn joining_a_missing_session_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.session("NOSUCH"),
            Err(StoreError::SessionNotFound(_))
        ));
    }

    #[test]
    fn created_session_is_visible_with_owner_metadata() {
        let store = MemoryStore::new();
        let session_id = store.create_session("user-1").unwrap();
        assert_eq!(session_id.len(), SESSION_ID_LEN);
        assert!(session_id
            .bytes()
            .all(|b| ID_ALPHABET.contains(&b)));

        let info = store.session(&session_id).unwrap();
        assert_eq!(info.owner, "user-1");
    }

    #[test]
    fn new_timer_starts_with_defaults_and_joins_the_list() {
        let store = MemoryStore::new();
        let session_id = store.create_session("user-1").unwrap();
        let timer_id = store.create_timer(&session_id, "Tea").unwrap();

        let snapshot = store.timer(&session_id, &timer_id).unwrap();
        assert_eq!(snapshot.name, "Tea");
        assert!(!snapshot.running);
        assert_eq!(snapshot.time, 0.0);

        let list = store.timers(&session_id).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, timer_id);
        assert_eq!(list[0].name, "Tea");
    }

    #[test]
    fn update_merges_only_the_given_fields() {
        let store = MemoryStore::new();
        let session_id = store.create_session("user-1").unwrap();
        let timer_id = store.create_timer(&session_id, "Tea").unwrap();

        let patch = TimerPatch {
            time: Some(120.0),
            direction: Some(Direction::Down),
            ..Default::default()
        };
        store
            .update_timer_at(&session_id, &timer_id, &patch, 5_000)
            .unwrap();

        let snapshot = store.timer(&session_id, &timer_id).unwrap();
        assert_eq!(snapshot.time, 120.0);
        assert_eq!(snapshot.direction, Direction::Down);
        assert_eq!(snapshot.name, "Tea");
        assert_eq!(snapshot.speed, 1.0);
        assert_eq!(snapshot.last_updated_timestamp, 5_000);
    }

    #[test]
    fn updating_a_deleted_timer_is_not_found() {
        let store = MemoryStore::new();
        let session_id = store.create_session("user-1").unwrap();
        let timer_id = store.create_timer(&session_id, "Tea").unwrap();
        store.delete_timer(&session_id, &timer_id).unwrap();

        let patch = TimerPatch {
            running: Some(true),
            ..Default::default()
        };
        assert!(matches!(
            store.update_timer(&session_id, &timer_id, &patch),
            Err(StoreError::TimerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn subscribers_observe_updates_and_deletion_as_absence() {
        let store = MemoryStore::new();
        let session_id = store.create_session("user-1").unwrap();
        let timer_id = store.create_timer(&session_id, "Tea").unwrap();

        let mut rx = store.subscribe_timer(&session_id, &timer_id).unwrap();
        assert!(rx.borrow_and_update().is_some());

        let patch = TimerPatch {
            running: Some(true),
            ..Default::default()
        };
        store.update_timer(&session_id, &timer_id, &patch).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().as_ref().unwrap().running);

        store.delete_timer(&session_id, &timer_id).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn timer_list_tracks_creation_and_deletion() {
        let store = MemoryStore::new();
        let session_id = store.create_session("user-1").unwrap();
        let mut list_rx = store.subscribe_timers(&session_id).unwrap();
        assert!(list_rx.borrow_and_update().is_empty());

        let first = store.create_timer(&session_id, "One").unwrap();
        list_rx.changed().await.unwrap();
        assert_eq!(list_rx.borrow_and_update().len(), 1);

        let _second = store.create_timer(&session_id, "Two").unwrap();
        list_rx.changed().await.unwrap();
        assert_eq!(list_rx.borrow_and_update().len(), 2);

        store.delete_timer(&session_id, &first).unwrap();
        list_rx.changed().await.unwrap();
        let remaining = list_rx.borrow_and_update().clone();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Two");
    }

    #[tokio::test]
    async fn rename_refreshes_the_list() {
        let store = MemoryStore::new();
        let session_id = store.create_session("user-1").unwrap();
        let timer_id = store.create_timer(&session_id, "Old").unwrap();
        let mut list_rx = store.subscribe_timers(&session_id).unwrap();
        list_rx.borrow_and_update();

        let patch = TimerPatch {
            name: Some("New".to_string()),
            ..Default::default()
        };
        store.update_timer(&session_id, &timer_id, &patch).unwrap();
        list_rx.changed().await.unwrap();
        assert_eq!(list_rx.borrow_and_update()[0].name, "New");
    }
}
