use clokwerk::{Scheduler, TimeUnits};
use log::{debug, error, info};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::session::SessionStore;

/// Periodically drops idle sessions from the store.
#[derive(Clone)]
pub struct SessionScheduler {
    sessions: SessionStore,
    interval_minutes: u32,
}

impl SessionScheduler {
    pub fn new(sessions: SessionStore, interval_minutes: u32) -> Self {
        Self {
            sessions,
            interval_minutes: interval_minutes.max(1),
        }
    }

    pub fn start(&self) -> JoinHandle<()> {
        let mut scheduler = Scheduler::new();
        let sessions = self.sessions.clone();

        scheduler
            .every(self.interval_minutes.minutes())
            .run(move || Self::sweep(&sessions));

        info!(
            "Session scheduler started, sweeping every {} minute(s)",
            self.interval_minutes
        );

        thread::spawn(move || loop {
            scheduler.run_pending();
            thread::sleep(Duration::from_secs(10));
        })
    }

    fn sweep(sessions: &SessionStore) {
        match sessions.purge_expired() {
            Ok(0) => debug!("Session sweep found nothing to purge"),
            Ok(purged) => info!(
                "Purged {} idle session(s), {} remaining",
                purged,
                sessions.len()
            ),
            Err(e) => error!("Session sweep failed: {}", e),
        }
    }
}
