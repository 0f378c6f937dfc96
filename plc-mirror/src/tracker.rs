use std::sync::Arc;

use crate::store::Store;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("store: {0}")]
    Store(#[from] crate::store::Error),

    #[error("parsing timestamp {0:?}: {1}")]
    Timestamp(String, time::error::Parse),
}

pub fn parse_timestamp(ts: &str) -> Result<time::OffsetDateTime, time::error::Parse> {
    time::OffsetDateTime::parse(ts, &time::format_description::well_known::Rfc3339)
}

#[derive(Default)]
struct State {
    last_record: Option<time::OffsetDateTime>,
    last_completion: Option<time::OffsetDateTime>,
}

/// Ingestion progress shared between the mirror (sole writer) and query
/// handlers. The newest record timestamp is cached in memory and falls back
/// to the log table when nothing has been ingested by this process yet.
pub struct Tracker {
    store: Arc<dyn Store>,
    state: tokio::sync::RwLock<State>,
}

impl Tracker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            state: tokio::sync::RwLock::new(State::default()),
        }
    }

    pub async fn last_record_timestamp(&self) -> Result<Option<time::OffsetDateTime>, Error> {
        if let Some(ts) = self.state.read().await.last_record {
            return Ok(Some(ts));
        }

        let Some(stored) = self.store.latest_timestamp().await? else {
            return Ok(None);
        };
        let stored = parse_timestamp(&stored).map_err(|e| Error::Timestamp(stored, e))?;

        let mut state = self.state.write().await;
        let ts = match state.last_record {
            Some(cached) if cached > stored => cached,
            _ => stored,
        };
        state.last_record = Some(ts);
        Ok(Some(ts))
    }

    /// Moves the cached newest record timestamp forward. Older values are
    /// ignored.
    pub async fn advance(&self, ts: time::OffsetDateTime) {
        let mut state = self.state.write().await;
        if state.last_record.map_or(true, |cached| ts > cached) {
            state.last_record = Some(ts);
        }
    }

    pub async fn last_completion(&self) -> Option<time::OffsetDateTime> {
        self.state.read().await.last_completion
    }

    pub async fn record_completion(&self, at: time::OffsetDateTime) {
        self.state.write().await.last_completion = Some(at);
    }
}
