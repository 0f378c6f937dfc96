use std::sync::Arc;

use plc_directory::{Document, Operation};

use crate::store::Store;
use crate::tracker::Tracker;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown DID")]
    UnknownDid,

    #[error("DID deleted")]
    Retired,

    #[error("mirror is {0} behind")]
    Stale(time::Duration),

    #[error(transparent)]
    Tracker(#[from] crate::tracker::Error),

    #[error("store: {0}")]
    Store(#[from] crate::store::Error),
}

/// Renders current identity documents from the mirrored log.
pub struct Resolver {
    store: Arc<dyn Store>,
    tracker: Arc<Tracker>,
    max_delay: time::Duration,
}

impl Resolver {
    pub fn new(store: Arc<dyn Store>, tracker: Arc<Tracker>, max_delay: time::Duration) -> Self {
        Self {
            store,
            tracker,
            max_delay,
        }
    }

    /// Age of the newest ingested record. An empty mirror is infinitely old.
    async fn record_delay(&self, now: time::OffsetDateTime) -> Result<time::Duration, Error> {
        Ok(self
            .tracker
            .last_record_timestamp()
            .await?
            .map_or(time::Duration::MAX, |ts| now - ts))
    }

    /// Readiness: the newest ingested record is within the maximum delay.
    pub async fn ready(&self, now: time::OffsetDateTime) -> Result<(), Error> {
        let delay = self.record_delay(now).await?;
        if delay > self.max_delay {
            return Err(Error::Stale(delay));
        }
        Ok(())
    }

    /// Fails with `Stale` unless either the newest record or the last full
    /// ingestion pass is within the maximum delay. A recent pass with an old
    /// newest record means upstream simply had nothing new.
    pub async fn check_freshness(&self, now: time::OffsetDateTime) -> Result<(), Error> {
        let delay = self.record_delay(now).await?;
        if delay > self.max_delay {
            let completion_delay = self
                .tracker
                .last_completion()
                .await
                .map_or(time::Duration::MAX, |ts| now - ts);
            if completion_delay > self.max_delay {
                return Err(Error::Stale(delay));
            }
        }
        Ok(())
    }

    pub async fn resolve(&self, did: &str, now: time::OffsetDateTime) -> Result<Document, Error> {
        self.check_freshness(now).await?;

        let entry = self
            .store
            .latest_entry(did)
            .await?
            .ok_or(Error::UnknownDid)?;

        let op = match entry.operation {
            Operation::Tombstone(_) => return Err(Error::Retired),
            Operation::Op(op) => op,
            Operation::Create(create) => create.into(),
        };
        Ok(Document::render(&entry.did, &op))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::LogEntry;
    use plc_directory::{LegacyCreateOp, Tombstone};

    fn ts(s: &str) -> time::OffsetDateTime {
        crate::tracker::parse_timestamp(s).unwrap()
    }

    fn create(did: &str, cid: &str, at: &str, handle: &str) -> LogEntry {
        LogEntry {
            did: did.to_string(),
            cid: cid.to_string(),
            plc_timestamp: at.to_string(),
            nullified: false,
            operation: Operation::Create(LegacyCreateOp {
                signing_key: "did:key:zSigning".to_string(),
                recovery_key: "did:key:zRecovery".to_string(),
                handle: handle.to_string(),
                service: "https://pds.example".to_string(),
                prev: (),
                sig: "sig".to_string(),
            }),
        }
    }

    fn tombstone(did: &str, cid: &str, at: &str) -> LogEntry {
        LogEntry {
            did: did.to_string(),
            cid: cid.to_string(),
            plc_timestamp: at.to_string(),
            nullified: false,
            operation: Operation::Tombstone(Tombstone {
                prev: "bafy1".to_string(),
                sig: "sig".to_string(),
            }),
        }
    }

    async fn setup(entries: &[LogEntry]) -> (Resolver, Arc<Tracker>) {
        let store = Arc::new(MemoryStore::default());
        store.persist(entries, &[]).await.unwrap();
        let tracker = Arc::new(Tracker::new(store.clone()));
        (
            Resolver::new(store, tracker.clone(), time::Duration::minutes(5)),
            tracker,
        )
    }

    #[tokio::test]
    async fn test_resolve() {
        let (resolver, _) =
            setup(&[create("did:plc:a", "bafy1", "2024-01-01T00:00:00Z", "alice.example")])
                .await;

        let doc = resolver
            .resolve("did:plc:a", ts("2024-01-01T00:01:00Z"))
            .await
            .unwrap();
        assert_eq!(doc.id, "did:plc:a");
        assert_eq!(doc.also_known_as, vec!["alice.example"]);
        assert_eq!(doc.service[0].service_endpoint, "https://pds.example");
    }

    #[tokio::test]
    async fn test_resolve_unknown() {
        let (resolver, _) =
            setup(&[create("did:plc:a", "bafy1", "2024-01-01T00:00:00Z", "alice.example")])
                .await;
        assert!(matches!(
            resolver
                .resolve("did:plc:b", ts("2024-01-01T00:01:00Z"))
                .await,
            Err(Error::UnknownDid)
        ));
    }

    #[tokio::test]
    async fn test_resolve_tombstone_is_terminal() {
        let (resolver, _) = setup(&[
            create("did:plc:a", "bafy1", "2024-01-01T00:00:00Z", "alice.example"),
            tombstone("did:plc:a", "bafy2", "2024-01-01T00:01:00Z"),
        ])
        .await;

        for _ in 0..2 {
            assert!(matches!(
                resolver
                    .resolve("did:plc:a", ts("2024-01-01T00:02:00Z"))
                    .await,
                Err(Error::Retired)
            ));
        }
    }

    #[tokio::test]
    async fn test_resolve_skips_nullified() {
        let mut nullified = create("did:plc:a", "bafy2", "2024-01-01T00:01:00Z", "mallory.example");
        nullified.nullified = true;
        let (resolver, _) = setup(&[
            create("did:plc:a", "bafy1", "2024-01-01T00:00:00Z", "alice.example"),
            nullified,
        ])
        .await;

        let doc = resolver
            .resolve("did:plc:a", ts("2024-01-01T00:02:00Z"))
            .await
            .unwrap();
        assert_eq!(doc.also_known_as, vec!["alice.example"]);
    }

    #[tokio::test]
    async fn test_resolve_timestamp_tie_breaks_on_cid() {
        let (resolver, _) = setup(&[
            create("did:plc:a", "bafyb", "2024-01-01T00:00:00Z", "bob.example"),
            create("did:plc:a", "bafya", "2024-01-01T00:00:00Z", "alice.example"),
        ])
        .await;

        let doc = resolver
            .resolve("did:plc:a", ts("2024-01-01T00:01:00Z"))
            .await
            .unwrap();
        assert_eq!(doc.also_known_as, vec!["bob.example"]);
    }

    #[tokio::test]
    async fn test_staleness_gate() {
        let (resolver, tracker) =
            setup(&[create("did:plc:a", "bafy1", "2024-01-01T00:00:00Z", "alice.example")])
                .await;
        let now = ts("2024-01-01T00:06:00Z");

        tracker.record_completion(ts("2024-01-01T00:00:00Z")).await;
        assert!(matches!(
            resolver.resolve("did:plc:a", now).await,
            Err(Error::Stale(delay)) if delay == time::Duration::minutes(6)
        ));

        tracker.record_completion(ts("2024-01-01T00:05:00Z")).await;
        assert!(resolver.resolve("did:plc:a", now).await.is_ok());
    }

    #[tokio::test]
    async fn test_staleness_gate_without_completed_pass() {
        let (resolver, _) =
            setup(&[create("did:plc:a", "bafy1", "2024-01-01T00:00:00Z", "alice.example")])
                .await;
        assert!(matches!(
            resolver
                .resolve("did:plc:a", ts("2024-01-01T00:06:00Z"))
                .await,
            Err(Error::Stale(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_mirror_is_stale_until_a_pass_completes() {
        let (resolver, tracker) = setup(&[]).await;
        let now = ts("2024-01-01T00:00:00Z");
        assert!(matches!(
            resolver.resolve("did:plc:a", now).await,
            Err(Error::Stale(_))
        ));

        tracker.record_completion(now).await;
        assert!(matches!(
            resolver.resolve("did:plc:a", now).await,
            Err(Error::UnknownDid)
        ));
    }

    #[tokio::test]
    async fn test_ready() {
        let (resolver, tracker) =
            setup(&[create("did:plc:a", "bafy1", "2024-01-01T00:00:00Z", "alice.example")])
                .await;
        resolver.ready(ts("2024-01-01T00:04:00Z")).await.unwrap();

        tracker.record_completion(ts("2024-01-01T00:06:00Z")).await;
        assert!(matches!(
            resolver.ready(ts("2024-01-01T00:06:00Z")).await,
            Err(Error::Stale(_))
        ));
    }
}
