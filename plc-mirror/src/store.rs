#[cfg(test)]
pub mod memory;
pub mod postgres;

use plc_directory::{Entry, Operation};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migrate: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// A row of the append-only operation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub did: String,
    pub cid: String,
    pub plc_timestamp: String,
    pub nullified: bool,
    pub operation: Operation,
}

impl From<Entry> for LogEntry {
    fn from(entry: Entry) -> Self {
        Self {
            did: entry.did,
            cid: entry.cid,
            plc_timestamp: entry.created_at,
            nullified: entry.nullified,
            operation: entry.operation,
        }
    }
}

/// The derived columns of an account projection, as written by ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub did: String,
    pub plc_timestamp: String,
    pub pds: String,
    pub handle: String,
}

impl AccountInfo {
    /// Derives the projection for an entry. Tombstones derive nothing so the
    /// last live projection is kept.
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        let op = entry.operation.clone().normalize()?;
        Some(Self {
            did: entry.did.clone(),
            plc_timestamp: entry.created_at.clone(),
            pds: op.pds().unwrap_or_default().to_string(),
            handle: op.handle().unwrap_or_default().to_string(),
        })
    }
}

/// A stored account projection.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct AccountRow {
    pub did: String,
    pub plc_timestamp: String,
    pub pds: String,
    pub handle: String,
    pub last_checked: Option<time::OffsetDateTime>,
    pub updated_at: time::OffsetDateTime,
}

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// The newest upstream timestamp among all stored log entries.
    async fn latest_timestamp(&self) -> Result<Option<String>, Error>;

    /// Appends `entries`, ignoring ones already stored under the same
    /// (did, cid), and overwrites the projections in `accounts`.
    async fn persist(&self, entries: &[LogEntry], accounts: &[AccountInfo]) -> Result<(), Error>;

    /// The most recent non-nullified entry for `did`. Timestamp ties are
    /// broken by the highest cid.
    async fn latest_entry(&self, did: &str) -> Result<Option<LogEntry>, Error>;

    async fn account_by_did(&self, did: &str) -> Result<Option<AccountRow>, Error>;

    /// The most recently derived projection claiming `handle`.
    async fn account_by_handle(&self, handle: &str) -> Result<Option<AccountRow>, Error>;
}
