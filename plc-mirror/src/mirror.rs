use std::sync::Arc;

use tracing::Instrument;

use crate::export::Export;
use crate::pacing::RateGovernor;
use crate::shutdown::{Cancelled, Shutdown};
use crate::store::{AccountInfo, LogEntry, Store};
use crate::tracker::{parse_timestamp, Tracker};

pub const CYCLE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(10);

/// PDS endpoint of placeholder accounts that carry no real identity data.
pub const BOGUS_PDS: &str = "https://uwu";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("export: {0}")]
    Export(#[from] crate::export::Error),

    #[error("store: {0}")]
    Store(#[from] crate::store::Error),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// One decoded page, ready to persist.
#[derive(Debug, Default)]
pub struct Batch {
    pub entries: Vec<LogEntry>,
    /// At most one projection per DID: the one with the newest timestamp.
    pub accounts: Vec<AccountInfo>,
    /// Newest `createdAt` of the page, used as the next `after`.
    pub cursor: Option<String>,
    pub last_timestamp: Option<time::OffsetDateTime>,
}

impl Batch {
    pub fn new(entries: Vec<plc_directory::Entry>) -> Self {
        let mut accounts = std::collections::BTreeMap::<String, AccountInfo>::new();
        let mut batch = Batch::default();

        for entry in entries {
            match parse_timestamp(&entry.created_at) {
                Ok(ts) => {
                    if batch.last_timestamp.map_or(true, |last| ts > last) {
                        batch.last_timestamp = Some(ts);
                    }
                }
                Err(e) => {
                    tracing::warn!(created_at = %entry.created_at, error = %e, "failed to parse timestamp");
                }
            }
            if batch
                .cursor
                .as_deref()
                .map_or(true, |cursor| entry.created_at.as_str() > cursor)
            {
                batch.cursor = Some(entry.created_at.clone());
            }

            // Nullified entries never project; a later live operation of the same
            // DID supersedes them anyway.
            if !entry.nullified {
                match AccountInfo::from_entry(&entry) {
                    Some(info) if info.pds == BOGUS_PDS => {
                        tracing::debug!(did = %entry.did, "skipping placeholder account");
                    }
                    Some(info) => {
                        if accounts
                            .get(&info.did)
                            .map_or(true, |prev| prev.plc_timestamp <= info.plc_timestamp)
                        {
                            accounts.insert(info.did.clone(), info);
                        }
                    }
                    None => {}
                }
            }

            batch.entries.push(entry.into());
        }

        batch.accounts = accounts.into_values().collect();
        batch
    }
}

/// The ingestion worker: pulls the upstream log page by page into the store.
pub struct Mirror {
    store: Arc<dyn Store>,
    export: Box<dyn Export>,
    tracker: Arc<Tracker>,
    governor: RateGovernor,
    shutdown: Shutdown,
}

impl Mirror {
    pub fn new(
        store: Arc<dyn Store>,
        export: Box<dyn Export>,
        tracker: Arc<Tracker>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            store,
            export,
            tracker,
            governor: RateGovernor::default(),
            shutdown,
        }
    }

    /// Runs cycles until shutdown, sleeping `CYCLE_INTERVAL` after each one
    /// whether it succeeded or not.
    pub async fn run(mut self) {
        loop {
            match self
                .cycle()
                .instrument(tracing::info_span!("mirror_cycle"))
                .await
            {
                Ok(()) => {
                    self.tracker
                        .record_completion(time::OffsetDateTime::now_utc())
                        .await
                }
                Err(Error::Cancelled(_)) => break,
                Err(err) => {
                    if !self.shutdown.is_cancelled() {
                        tracing::error!(error = %err, "failed to get new log entries");
                    }
                }
            }

            if self
                .shutdown
                .run_until_cancelled(tokio::time::sleep(CYCLE_INTERVAL))
                .await
                .is_err()
            {
                break;
            }
        }
        tracing::info!("mirror stopped");
    }

    /// Pages through the upstream log from the newest stored timestamp until
    /// a page brings nothing new.
    pub async fn cycle(&mut self) -> Result<(), Error> {
        let mut cursor = self.store.latest_timestamp().await?;
        match cursor.as_deref().map(parse_timestamp) {
            Some(Ok(ts)) => self.governor.observe(ts, time::OffsetDateTime::now_utc()),
            Some(Err(e)) => {
                tracing::error!(cursor = ?cursor, error = %e, "failed to parse cursor, starting from empty");
                cursor = None;
            }
            None => {}
        }

        loop {
            self.governor.acquire(&self.shutdown).await?;
            tracing::info!(cursor = ?cursor, "listing log entries");
            let entries = self
                .shutdown
                .run_until_cancelled(self.export.page(cursor.as_deref()))
                .await??;

            let batch = Batch::new(entries);
            if batch.entries.is_empty() || batch.cursor <= cursor {
                break;
            }

            self.shutdown
                .run_until_cancelled(self.store.persist(&batch.entries, &batch.accounts))
                .await??;

            if let Some(ts) = batch.last_timestamp {
                self.tracker.advance(ts).await;
                self.governor.observe(ts, time::OffsetDateTime::now_utc());
                metrics::gauge!("plcmirror_last_op_timestamp", ts.unix_timestamp() as f64);
            }

            tracing::info!(
                entries = batch.entries.len(),
                accounts = batch.accounts.len(),
                cursor = ?batch.cursor,
                "got log entries"
            );
            cursor = batch.cursor;
        }
        Ok(())
    }
}
