use crate::domain::error::{AppError, Result};
use crate::domain::test_case::Session;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

const SESSION_ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Owner of every generated session.
///
/// `get` hands out snapshots; all mutation goes through `update`, which runs the
/// closure while the store is locked.
pub trait SessionStore: Send + Sync {
    fn create(&self, session: Session) -> String;
    fn get(&self, session_id: &str) -> Result<Session>;
    fn update(&self, session_id: &str, mutation: &mut dyn FnMut(&mut Session)) -> Result<()>;
    fn len(&self) -> usize;
}

/// Volatile, process-lifetime store. Empty at startup, never evicts.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Timestamp ids collide within one second; later sessions get a `-N` suffix.
    pub fn create_at(&self, mut session: Session, now: DateTime<Local>) -> String {
        let base = now.format(SESSION_ID_FORMAT).to_string();
        let mut sessions = self.lock();

        let mut session_id = base.clone();
        let mut suffix = 1;
        while sessions.contains_key(&session_id) {
            session_id = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        session.session_id = session_id.clone();
        sessions.insert(session_id.clone(), session);
        session_id
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, session: Session) -> String {
        self.create_at(session, Local::now())
    }

    fn get(&self, session_id: &str) -> Result<Session> {
        self.lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))
    }

    fn update(&self, session_id: &str, mutation: &mut dyn FnMut(&mut Session)) -> Result<()> {
        let mut sessions = self.lock();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))?;
        mutation(session);
        Ok(())
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
