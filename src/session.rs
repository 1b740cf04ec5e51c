use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::search_page::SearchPage;

pub const SESSION_COOKIE: &str = "king_airlines_session";

pub type SharedPage = Arc<Mutex<SearchPage>>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to acquire session store lock")]
    StoreLock,
    #[error("Failed to acquire search page lock")]
    PageLock,
}

struct SessionEntry {
    page: SharedPage,
    last_seen: Instant,
}

/// In-memory search pages keyed by the session cookie.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    /// `capacity` bounds the number of live sessions; at least one is kept.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Returns the page for a known, unexpired id, or opens a fresh session.
    /// Ids presented by the client are never adopted.
    pub fn resolve(&self, session_id: Option<&str>) -> Result<(String, SharedPage), SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::StoreLock)?;
        let now = Instant::now();

        if let Some(id) = session_id {
            if let Some(entry) = sessions.get_mut(id) {
                if now.duration_since(entry.last_seen) < self.ttl {
                    entry.last_seen = now;
                    return Ok((id.to_string(), entry.page.clone()));
                }
                debug!("Session {} expired", id);
                sessions.remove(id);
            }
        }

        // Make room by dropping the least recently seen sessions
        while sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    debug!("Evicted session {}, store is full", oldest);
                }
                None => break,
            }
        }

        let id = new_session_id();
        let page = SharedPage::default();
        sessions.insert(
            id.clone(),
            SessionEntry {
                page: page.clone(),
                last_seen: now,
            },
        );
        debug!("Opened session {}, {} active", id, sessions.len());

        Ok((id, page))
    }

    /// Drops sessions idle for longer than the ttl. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::StoreLock)?;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        Ok(before - sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|sessions| sessions.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn lock_page(page: &SharedPage) -> Result<MutexGuard<'_, SearchPage>, SessionError> {
    page.lock().map_err(|_| SessionError::PageLock)
}

fn new_session_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}
