pub mod document;
pub mod key;
pub mod operation;

pub use document::Document;
pub use operation::{Entry, LegacyCreateOp, Op, Operation, Service, Tombstone};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("parsing log entry {index}: {source}")]
    Decode {
        index: usize,
        source: serde_json::Error,
    },
}

/// Decodes a newline-delimited export page. Decoding stops cleanly at the
/// end of the body; a malformed entry (including one with an unrecognized
/// operation type) fails the whole page.
pub fn decode_entries(body: &[u8]) -> Result<Vec<Entry>, Error> {
    serde_json::Deserializer::from_slice(body)
        .into_iter::<Entry>()
        .enumerate()
        .map(|(index, r)| r.map_err(|source| Error::Decode { index, source }))
        .collect()
}
