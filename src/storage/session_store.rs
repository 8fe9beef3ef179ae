use crate::domain::session::{Session, SessionId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Per-session token state keyed by the cookie-carried session id.
///
/// Every operation is atomic for its key; sessions never observe each other.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Returns the stored session, or an unauthenticated one if the id is unknown or expired.
    async fn get(&self, id: &SessionId) -> Session;

    /// Replaces the token pair of a session, creating the entry if needed.
    ///
    /// Returns `false` if the id was destroyed and the tokens were not stored.
    async fn set_tokens(&self, id: &SessionId, access_token: String, refresh_token: Option<String>) -> bool;

    /// Forgets everything about a session.
    async fn destroy(&self, id: &SessionId);

    /// Drops sessions that have been idle past their time-to-live, returning how many were removed.
    async fn purge_expired(&self) -> usize;
}

#[derive(Debug)]
struct Record {
    session: Session,
    last_seen: Instant,
    // Set by `destroy`. Tokens are never written to a retired id again.
    retired: bool,
}

impl Record {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= ttl
    }
}

/// Process-local store. State is lost on restart.
///
/// Destroyed ids keep a token-free tombstone until they expire, so a code
/// exchange that finishes after a logout for the same id cannot bring the
/// session back.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, Record>,
    ttl: Duration,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: DashMap::new(), ttl }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &SessionId) -> Session {
        let now = Instant::now();

        let expired = match self.sessions.get_mut(id) {
            Some(record) if record.retired && !record.is_expired(now, self.ttl) => return Session::default(),
            Some(mut record) if !record.is_expired(now, self.ttl) => {
                record.last_seen = now;
                return record.session.clone();
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.sessions.remove_if(id, |_, record| record.is_expired(now, self.ttl));
            tracing::debug!("Session expired");
        }

        Session::default()
    }

    async fn set_tokens(&self, id: &SessionId, access_token: String, refresh_token: Option<String>) -> bool {
        let now = Instant::now();
        let mut record = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| Record { session: Session::default(), last_seen: now, retired: false });

        if record.retired {
            tracing::debug!("Refusing tokens for a destroyed session");
            return false;
        }

        record.session = Session::with_tokens(access_token, refresh_token);
        record.last_seen = now;
        true
    }

    async fn destroy(&self, id: &SessionId) {
        let tombstone = Record { session: Session::default(), last_seen: Instant::now(), retired: true };
        self.sessions.insert(id.clone(), tombstone);
    }

    async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.sessions.retain(|_, record| {
            let keep = !record.is_expired(now, self.ttl);
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }
}
