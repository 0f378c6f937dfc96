use super::{AccountInfo, AccountRow, Error, LogEntry};

pub struct PgStore {
    pool: sqlx::PgPool,
}

#[derive(sqlx::FromRow)]
struct LogEntryRow {
    did: String,
    cid: String,
    plc_timestamp: String,
    nullified: bool,
    operation: sqlx::types::Json<plc_directory::Operation>,
}

impl From<LogEntryRow> for LogEntry {
    fn from(row: LogEntryRow) -> Self {
        Self {
            did: row.did,
            cid: row.cid,
            plc_timestamp: row.plc_timestamp,
            nullified: row.nullified,
            operation: row.operation.0,
        }
    }
}

impl PgStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl super::Store for PgStore {
    async fn latest_timestamp(&self) -> Result<Option<String>, Error> {
        Ok(sqlx::query_scalar::<_, String>(
            r#"--sql
            SELECT plc_timestamp
            FROM plc_log_entries
            ORDER BY plc_timestamp DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn persist(&self, entries: &[LogEntry], accounts: &[AccountInfo]) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        if !entries.is_empty() {
            let mut q = sqlx::QueryBuilder::<sqlx::Postgres>::new(
                "INSERT INTO plc_log_entries (did, cid, plc_timestamp, nullified, operation) ",
            );
            q.push_values(entries, |mut b, entry| {
                b.push_bind(&entry.did)
                    .push_bind(&entry.cid)
                    .push_bind(&entry.plc_timestamp)
                    .push_bind(entry.nullified)
                    .push_bind(sqlx::types::Json(&entry.operation));
            });
            q.push(" ON CONFLICT (did, cid) DO NOTHING");
            q.build().execute(&mut *tx).await?;
        }

        if !accounts.is_empty() {
            let mut q = sqlx::QueryBuilder::<sqlx::Postgres>::new(
                "INSERT INTO account_info (did, plc_timestamp, pds, handle) ",
            );
            q.push_values(accounts, |mut b, account| {
                b.push_bind(&account.did)
                    .push_bind(&account.plc_timestamp)
                    .push_bind(&account.pds)
                    .push_bind(&account.handle);
            });
            q.push(
                r#"
                ON CONFLICT (did) DO
                UPDATE SET
                    plc_timestamp = excluded.plc_timestamp,
                    pds = excluded.pds,
                    handle = excluded.handle,
                    updated_at = now()
                "#,
            );
            q.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn latest_entry(&self, did: &str) -> Result<Option<LogEntry>, Error> {
        Ok(sqlx::query_as::<_, LogEntryRow>(
            r#"--sql
            SELECT did, cid, plc_timestamp, nullified, operation
            FROM plc_log_entries
            WHERE did = $1 AND NOT nullified
            ORDER BY plc_timestamp DESC, cid DESC
            LIMIT 1
            "#,
        )
        .bind(did)
        .fetch_optional(&self.pool)
        .await?
        .map(LogEntry::from))
    }

    async fn account_by_did(&self, did: &str) -> Result<Option<AccountRow>, Error> {
        Ok(sqlx::query_as::<_, AccountRow>(
            r#"--sql
            SELECT did, plc_timestamp, pds, handle, last_checked, updated_at
            FROM account_info
            WHERE did = $1
            "#,
        )
        .bind(did)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn account_by_handle(&self, handle: &str) -> Result<Option<AccountRow>, Error> {
        Ok(sqlx::query_as::<_, AccountRow>(
            r#"--sql
            SELECT did, plc_timestamp, pds, handle, last_checked, updated_at
            FROM account_info
            WHERE handle = $1
            ORDER BY plc_timestamp DESC
            LIMIT 1
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?)
    }
}
