use super::{AccountInfo, AccountRow, Error, LogEntry};

/// In-memory `Store` with the same conflict policies as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: std::sync::Mutex<Inner>,
    fail_writes: std::sync::atomic::AtomicBool,
}

#[derive(Default)]
struct Inner {
    entries: Vec<LogEntry>,
    accounts: std::collections::BTreeMap<String, AccountRow>,
}

impl MemoryStore {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.lock().unwrap().entries.clone()
    }

    pub fn accounts(&self) -> Vec<AccountRow> {
        self.inner.lock().unwrap().accounts.values().cloned().collect()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl super::Store for MemoryStore {
    async fn latest_timestamp(&self) -> Result<Option<String>, Error> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|e| e.plc_timestamp.clone())
            .max())
    }

    async fn persist(&self, entries: &[LogEntry], accounts: &[AccountInfo]) -> Result<(), Error> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(Error::Sqlx(sqlx::Error::PoolClosed));
        }

        let mut inner = self.inner.lock().unwrap();
        for entry in entries {
            if !inner
                .entries
                .iter()
                .any(|e| e.did == entry.did && e.cid == entry.cid)
            {
                inner.entries.push(entry.clone());
            }
        }

        let now = time::OffsetDateTime::now_utc();
        for account in accounts {
            let last_checked = inner
                .accounts
                .get(&account.did)
                .and_then(|row| row.last_checked);
            inner.accounts.insert(
                account.did.clone(),
                AccountRow {
                    did: account.did.clone(),
                    plc_timestamp: account.plc_timestamp.clone(),
                    pds: account.pds.clone(),
                    handle: account.handle.clone(),
                    last_checked,
                    updated_at: now,
                },
            );
        }
        Ok(())
    }

    async fn latest_entry(&self, did: &str) -> Result<Option<LogEntry>, Error> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.did == did && !e.nullified)
            .max_by(|a, b| {
                (&a.plc_timestamp, &a.cid).cmp(&(&b.plc_timestamp, &b.cid))
            })
            .cloned())
    }

    async fn account_by_did(&self, did: &str) -> Result<Option<AccountRow>, Error> {
        Ok(self.inner.lock().unwrap().accounts.get(did).cloned())
    }

    async fn account_by_handle(&self, handle: &str) -> Result<Option<AccountRow>, Error> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .accounts
            .values()
            .filter(|row| row.handle == handle)
            .max_by(|a, b| a.plc_timestamp.cmp(&b.plc_timestamp))
            .cloned())
    }
}
