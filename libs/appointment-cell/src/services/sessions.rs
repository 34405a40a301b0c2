// libs/appointment-cell/src/services/sessions.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::error::SchedulingError;
use shared_utils::clock::Clock;

use crate::services::workflow::BookingWorkflow;

pub type SharedWorkflow = Arc<Mutex<BookingWorkflow>>;

struct Session {
    workflow: SharedWorkflow,
    last_used: DateTime<Utc>,
}

/// Live booking sessions. Each owns exactly one workflow; requests against
/// the same session serialize on its mutex.
pub struct BookingSessions {
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl BookingSessions {
    pub fn new(idle_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
            clock,
        }
    }

    /// Opens a session at the first step. Idle sessions are purged first.
    pub async fn start(&self) -> (Uuid, SharedWorkflow) {
        self.purge_expired().await;

        let id = Uuid::new_v4();
        let workflow: SharedWorkflow = Arc::new(Mutex::new(BookingWorkflow::new()));
        self.sessions.write().await.insert(id, Session {
            workflow: Arc::clone(&workflow),
            last_used: self.clock.now(),
        });

        debug!("Started booking session {}", id);
        (id, workflow)
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedWorkflow, SchedulingError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| SchedulingError::not_found(format!("Booking session {}", id)))?;

        session.last_used = self.clock.now();
        Ok(Arc::clone(&session.workflow))
    }

    /// Drops the session and its draft. Nothing persisted is touched.
    pub async fn abandon(&self, id: Uuid) -> Result<(), SchedulingError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                debug!("Abandoned booking session {}", id);
                Ok(())
            }
            None => Err(SchedulingError::not_found(format!("Booking session {}", id))),
        }
    }

    pub async fn purge_expired(&self) -> usize {
        let cutoff = self.clock.now() - self.idle_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_used >= cutoff);

        let purged = before - sessions.len();
        if purged > 0 {
            info!("Purged {} idle booking sessions", purged);
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
