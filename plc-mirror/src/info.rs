use crate::store::{AccountRow, Store};

pub const DID_PREFIX: &str = "did:";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown DID")]
    UnknownDid,

    #[error("unknown handle")]
    UnknownHandle,

    #[error("store: {0}")]
    Store(#[from] crate::store::Error),
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub did: String,
    pub pds: String,
    pub handle: String,
    pub plc_time: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_time: time::OffsetDateTime,
}

impl From<AccountRow> for AccountView {
    fn from(row: AccountRow) -> Self {
        Self {
            did: row.did,
            pds: row.pds,
            handle: row.handle,
            plc_time: row.plc_timestamp,
            last_time: row.updated_at,
        }
    }
}

/// Looks up the account projection for a DID, or for a handle when `actor`
/// is not a DID.
pub async fn lookup(store: &dyn Store, actor: &str) -> Result<AccountView, Error> {
    let row = if actor.starts_with(DID_PREFIX) {
        store.account_by_did(actor).await?.ok_or(Error::UnknownDid)?
    } else {
        store
            .account_by_handle(actor)
            .await?
            .ok_or(Error::UnknownHandle)?
    };
    Ok(row.into())
}
