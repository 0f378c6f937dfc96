use plc_directory::Entry;

pub const PAGE_SIZE: usize = 1000;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("sending request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status code: {0}")]
    Status(reqwest::StatusCode),

    #[error(transparent)]
    Decode(#[from] plc_directory::Error),
}

/// One page of the upstream operation log.
#[async_trait::async_trait]
pub trait Export: Send + Sync {
    /// Up to `PAGE_SIZE` entries created strictly after `after`, in upstream
    /// order.
    async fn page(&self, after: Option<&str>) -> Result<Vec<Entry>, Error>;
}

pub struct HttpExport {
    client: reqwest::Client,
    url: String,
}

impl HttpExport {
    pub fn new(client: reqwest::Client, plcdirectory_host: &str) -> Self {
        Self {
            client,
            url: format!("{}/export", plcdirectory_host.trim_end_matches('/')),
        }
    }
}

#[async_trait::async_trait]
impl Export for HttpExport {
    async fn page(&self, after: Option<&str>) -> Result<Vec<Entry>, Error> {
        let mut query = vec![("count", PAGE_SIZE.to_string())];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }
        tracing::debug!(url = %self.url, after = ?after, "listing log entries");

        let resp = self.client.get(&self.url).query(&query).send().await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Err(Error::Status(resp.status()));
        }
        Ok(plc_directory::decode_entries(&resp.bytes().await?)?)
    }
}
