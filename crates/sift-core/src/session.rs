//! Capture session lifecycle
//!
//! Groups raw capture events into `BraindumpSession` records. A session is
//! created when a capture episode starts, its item count and end time
//! advance with each captured item, and it is finalized exactly once when
//! every item originating from it has been committed out of the braindump.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{BraindumpSession, SessionStats};

/// Capture-gap configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minutes of inactivity after which the capture context is considered
    /// closed and the next capture starts a new session
    pub idle_gap_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_gap_minutes: 30,
        }
    }
}

/// Tracks capture episodes over the session collection
pub struct SessionTracker<'a> {
    sessions: &'a mut Vec<BraindumpSession>,
    config: SessionConfig,
}

impl<'a> SessionTracker<'a> {
    pub fn new(sessions: &'a mut Vec<BraindumpSession>) -> Self {
        Self {
            sessions,
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(sessions: &'a mut Vec<BraindumpSession>, config: SessionConfig) -> Self {
        Self { sessions, config }
    }

    /// Session to attach the next capture to
    ///
    /// Reuses the most recent unprocessed session while its last activity
    /// is within the idle gap; otherwise opens a new one. Returns the
    /// session id.
    pub fn ensure_open(&mut self, now: DateTime<Utc>) -> String {
        let gap = Duration::minutes(self.config.idle_gap_minutes);

        if let Some(open) = self
            .sessions
            .iter()
            .rev()
            .find(|s| !s.processed)
            .filter(|s| now - s.end_time.unwrap_or(s.start_time) <= gap)
        {
            return open.id.clone();
        }

        let session = BraindumpSession::new(now);
        let id = session.id.clone();
        debug!(session_id = %id, "opened capture session");
        self.sessions.push(session);
        id
    }

    /// Record one captured item against a session
    ///
    /// Bumps the item count and rolls the end time forward to the capture
    /// instant.
    pub fn record_item(&mut self, session_id: &str, at: DateTime<Utc>) -> Result<()> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        session.item_count += 1;
        session.end_time = Some(at);
        Ok(())
    }

    /// Mark a session processed and attach its stats, exactly once
    ///
    /// Finalizing an already-processed session is a no-op, not an error.
    pub fn finalize(&mut self, session_id: &str, stats: SessionStats) -> Result<()> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        if session.processed {
            debug!(session_id, "session already finalized, skipping");
            return Ok(());
        }

        session.processed = true;
        session.processed_at = Some(Utc::now());
        session.stats = Some(stats);
        Ok(())
    }
}
