//! Session membership and the joined-session context

use std::{path::Path, time::Duration};

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};

use super::prefs::PrefsFile;
use super::timer::TimerContext;
use crate::store::{MemoryStore, StoreError, TimerEntry};

/// A joined session: the shared id plus the live timer list. Dropping the
/// context drops the list subscription.
#[derive(Debug)]
pub struct SessionContext {
    session_id: String,
    timers: watch::Receiver<Vec<TimerEntry>>,
}

impl SessionContext {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn timers(&self) -> Vec<TimerEntry> {
        self.timers.borrow().clone()
    }

    pub fn watch_timers(&self) -> watch::Receiver<Vec<TimerEntry>> {
        self.timers.clone()
    }
}

/// Client-side entry point: identity, remembered session, and session
/// create/join/leave
#[derive(Debug)]
pub struct SessionClient {
    store: MemoryStore,
    prefs: PrefsFile,
    user_id: String,
}

impl SessionClient {
    pub fn new(store: MemoryStore, prefs_path: &Path) -> Result<Self> {
        let mut prefs = PrefsFile::load(prefs_path)?;
        // Identity is resolved before any store operation; the store only
        // ever sees it as owner metadata.
        let user_id = prefs.ensure_user_id()?;
        Ok(Self {
            store,
            prefs,
            user_id,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Create a fresh session owned by this user and join it
    pub fn create_session(&mut self) -> Result<SessionContext, StoreError> {
        let session_id = self.store.create_session(&self.user_id)?;
        self.join_session(&session_id)
    }

    /// Join an existing session by id. A missing session forgets any
    /// remembered id so the next start does not retry it.
    pub fn join_session(&mut self, session_id: &str) -> Result<SessionContext, StoreError> {
        if let Err(e) = self.store.session(session_id) {
            if matches!(e, StoreError::SessionNotFound(_)) {
                if let Err(forget) = self.prefs.forget_session() {
                    warn!("Failed to forget remembered session: {}", forget);
                }
            }
            return Err(e);
        }

        let timers = self.store.subscribe_timers(session_id)?;
        if let Err(e) = self.prefs.remember_session(session_id) {
            warn!("Failed to remember session {}: {}", session_id, e);
        }
        info!("Joined session {}", session_id);
        Ok(SessionContext {
            session_id: session_id.to_string(),
            timers,
        })
    }

    /// Leave the session, forgetting the remembered id
    pub fn leave_session(&mut self, context: SessionContext) {
        info!("Leaving session {}", context.session_id);
        drop(context);
        if let Err(e) = self.prefs.forget_session() {
            warn!("Failed to forget remembered session: {}", e);
        }
    }

    /// The session id to re-join on startup, if any
    pub fn remembered_session(&self) -> Option<String> {
        self.prefs.remembered_session().map(str::to_string)
    }

    /// Create a timer in the joined session
    pub fn create_timer(&self, context: &SessionContext, name: &str) -> Result<String, StoreError> {
        let name = name.trim();
        let name = if name.is_empty() { "Untitled Timer" } else { name };
        self.store.create_timer(context.session_id(), name)
    }

    /// Select a timer for viewing and control. The caller must dispose any
    /// previously selected context first; only one is ever live.
    pub fn select_timer(
        &self,
        context: &SessionContext,
        timer_id: &str,
        tick_interval: Duration,
    ) -> Result<TimerContext, StoreError> {
        TimerContext::open(&self.store, context.session_id(), timer_id, tick_interval)
    }
}
