use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::deadline_notifier::DeadlineNotifier;
use super::deadline_sink::{ChannelSink, ReminderSender};

pub type SessionNotifier = DeadlineNotifier<ChannelSink>;

struct Session {
    notifier: Arc<SessionNotifier>,
    last_seen: DateTime<Utc>,
    streams: usize,
}

impl Session {
    fn is_idle(&self, cutoff: DateTime<Utc>) -> bool {
        self.streams == 0 && self.last_seen <= cutoff
    }
}

/// One deadline notifier per signed-in user, all feeding the same reminder
/// channel.
#[derive(Clone)]
pub struct NotifierRegistry {
    sessions: Arc<DashMap<Uuid, Session>>,
    reminder_tx: ReminderSender,
}

impl NotifierRegistry {
    pub fn new(reminder_tx: ReminderSender) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            reminder_tx,
        }
    }

    fn start(&self, user_id: Uuid, now: DateTime<Utc>) -> Session {
        tracing::info!("Starting deadline session for user {}", user_id);
        Session {
            notifier: Arc::new(DeadlineNotifier::new(ChannelSink::new(
                user_id,
                self.reminder_tx.clone(),
            ))),
            last_seen: now,
            streams: 0,
        }
    }

    /// Get the user's notifier, starting a session if there is none.
    pub fn session(&self, user_id: Uuid) -> Arc<SessionNotifier> {
        self.session_at(user_id, Utc::now())
    }

    pub fn session_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Arc<SessionNotifier> {
        let mut session = self
            .sessions
            .entry(user_id)
            .or_insert_with(|| self.start(user_id, now));
        session.last_seen = now;
        Arc::clone(&session.notifier)
    }

    /// Marks a reminder stream as open for the user. The session cannot go
    /// idle until the returned guard is dropped.
    pub fn open_stream(&self, user_id: Uuid) -> StreamGuard {
        let now = Utc::now();
        let mut session = self
            .sessions
            .entry(user_id)
            .or_insert_with(|| self.start(user_id, now));
        session.streams += 1;
        session.last_seen = now;

        StreamGuard {
            sessions: Arc::clone(&self.sessions),
            user_id,
            notifier: Arc::clone(&session.notifier),
        }
    }

    pub fn get(&self, user_id: &Uuid) -> Option<Arc<SessionNotifier>> {
        self.sessions
            .get(user_id)
            .map(|session| Arc::clone(&session.notifier))
    }

    /// Snapshot of every live session.
    pub fn sessions(&self) -> Vec<(Uuid, Arc<SessionNotifier>)> {
        self.sessions
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(&entry.value().notifier)))
            .collect()
    }

    /// Drop the user's session and its reminder history (logout).
    pub fn end_session(&self, user_id: &Uuid) -> bool {
        match self.sessions.remove(user_id) {
            Some((_, session)) => {
                session.notifier.clear_all_history();
                tracing::info!("Ended deadline session for user {}", user_id);
                true
            }
            None => false,
        }
    }

    pub fn expire_idle(&self, ttl: Duration) -> usize {
        self.expire_idle_at(ttl, Utc::now())
    }

    /// Ends sessions with no open stream and no activity within `ttl`.
    pub fn expire_idle_at(&self, ttl: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - ttl;
        let candidates: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().is_idle(cutoff))
            .map(|entry| *entry.key())
            .collect();

        let mut expired = 0;
        for user_id in candidates {
            if let Some((_, session)) = self
                .sessions
                .remove_if(&user_id, |_, session| session.is_idle(cutoff))
            {
                session.notifier.clear_all_history();
                tracing::info!("Expired idle deadline session for user {}", user_id);
                expired += 1;
            }
        }
        expired
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

/// Held by an open reminder stream.
pub struct StreamGuard {
    sessions: Arc<DashMap<Uuid, Session>>,
    user_id: Uuid,
    notifier: Arc<SessionNotifier>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        let Some(mut session) = self.sessions.get_mut(&self.user_id) else {
            return;
        };
        // A newer session for the same user is not ours to touch.
        if !Arc::ptr_eq(&session.notifier, &self.notifier) {
            return;
        }
        session.streams = session.streams.saturating_sub(1);
        session.last_seen = Utc::now();
        tracing::debug!(
            "Reminder stream closed for user {} ({} still open)",
            self.user_id,
            session.streams
        );
    }
}
