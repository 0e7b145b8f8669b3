//! Filter sessions
//!
//! Each client works against its own [`FilterState`]. Sessions live in a
//! concurrent map keyed by UUID and expire after an idle period. Queries run
//! on a snapshot of the filters, so the session lock is never held across
//! the store round trip; the request sequencer discards any result that a
//! newer query or a filter change has superseded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::catalog::Catalog;
use super::error::{QueryError, ValidationError};
use super::filter::FilterState;
use super::query::{Projection, QueryExecutor, QueryOutcome};
use super::sequence::RequestSequencer;
use crate::core::config::SessionsConfig;
use crate::core::constants::SESSION_SWEEP_INTERVAL_SECS;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),

    #[error("session limit of {0} reached")]
    CapacityReached(usize),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("query superseded by a newer request")]
    Stale,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub struct Session {
    id: Uuid,
    filters: Mutex<FilterState>,
    sequencer: RequestSequencer,
    last_used: Mutex<Instant>,
}

impl Session {
    fn new(filters: FilterState) -> Self {
        Self {
            id: Uuid::new_v4(),
            filters: Mutex::new(filters),
            sequencer: RequestSequencer::new(),
            last_used: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&self) {
        *self.last_used.lock() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_used.lock().elapsed()
    }

    /// Copy of the current filters
    pub fn snapshot(&self) -> FilterState {
        self.touch();
        self.filters.lock().clone()
    }

    /// Mutate the filters; a successful change supersedes in-flight queries
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut FilterState) -> Result<R, ValidationError>,
    ) -> Result<R, ValidationError> {
        self.touch();
        let mut filters = self.filters.lock();
        let result = f(&mut *filters)?;
        self.sequencer.invalidate();
        Ok(result)
    }

    /// Run a query on a snapshot of the filters.
    ///
    /// Returns [`SessionError::Stale`] when another query or a filter change
    /// happened while the store was working.
    pub async fn query(
        &self,
        executor: &QueryExecutor,
        projection: &Projection,
    ) -> Result<QueryOutcome, SessionError> {
        let (ticket, filters) = {
            let guard = self.filters.lock();
            (self.sequencer.issue(), guard.clone())
        };
        self.touch();

        let outcome = executor.execute(projection, &filters).await?;
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(session = %self.id, "Discarding stale query result");
            return Err(SessionError::Stale);
        }
        Ok(outcome)
    }
}

/// Live filter sessions
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Session>>,
    /// Serializes the capacity check with the insert
    create_lock: Mutex<()>,
    catalog: Arc<Catalog>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(catalog: Arc<Catalog>, config: &SessionsConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            create_lock: Mutex::new(()),
            catalog,
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            max_sessions: config.max_sessions,
        }
    }

    /// Open a session, optionally starting from a preset's stored filters
    pub fn create(&self, preset: Option<&str>) -> Result<Arc<Session>, SessionError> {
        let mut filters = FilterState::new(self.catalog.clone());
        if let Some(name) = preset {
            let preset = self
                .catalog
                .preset(name)
                .ok_or_else(|| SessionError::UnknownPreset(name.to_string()))?;
            filters.apply_preset(preset)?;
        }
        let session = Arc::new(Session::new(filters));

        {
            let _guard = self.create_lock.lock();
            if self.sessions.len() >= self.max_sessions {
                self.sweep_idle();
                if self.sessions.len() >= self.max_sessions {
                    tracing::warn!(max = self.max_sessions, "Session limit reached");
                    return Err(SessionError::CapacityReached(self.max_sessions));
                }
            }
            self.sessions.insert(session.id(), session.clone());
        }

        tracing::debug!(session = %session.id(), preset = ?preset, "Session created");
        Ok(session)
    }

    pub fn get(&self, id: Uuid) -> Result<Arc<Session>, SessionError> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(SessionError::NotFound(id))
    }

    pub fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        match self.sessions.remove(&id) {
            Some(_) => {
                tracing::debug!(session = %id, "Session closed");
                Ok(())
            }
            None => Err(SessionError::NotFound(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for longer than the timeout; returns how many
    pub fn sweep_idle(&self) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.idle_for() < self.idle_timeout);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(removed, "Expired idle sessions");
        }
        removed
    }

    /// Periodically expire idle sessions until shutdown
    pub fn start_sweep_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::debug!("Session sweep task shutting down");
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        store.sweep_idle();
                    }
                }
            }
        })
    }
}
