use std::collections::BTreeMap;

/// Service name under which an account's PDS is published.
pub const PDS_SERVICE: &str = "atproto_pds";
pub const PDS_SERVICE_TYPE: &str = "AtprotoPersonalDataServer";

/// Verification method name for the signing key of a legacy create.
pub const SIGNING_KEY_METHOD: &str = "atproto";

pub const AT_URI_PREFIX: &str = "at://";

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub did: String,
    pub operation: Operation,
    pub cid: String,
    #[serde(default)]
    pub nullified: bool,
    pub created_at: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub r#type: String,
    pub endpoint: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Op {
    pub rotation_keys: Vec<String>,
    pub verification_methods: BTreeMap<String, String>,
    pub also_known_as: Vec<String>,
    pub services: BTreeMap<String, Service>,
    pub prev: Option<String>,
    pub sig: String,
}

impl Op {
    /// The primary alias with its `at://` scheme removed.
    pub fn handle(&self) -> Option<&str> {
        self.also_known_as
            .first()
            .map(|aka| aka.strip_prefix(AT_URI_PREFIX).unwrap_or(aka))
    }

    pub fn pds(&self) -> Option<&str> {
        self.services
            .get(PDS_SERVICE)
            .map(|service| service.endpoint.as_str())
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tombstone {
    pub prev: String,
    pub sig: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCreateOp {
    pub signing_key: String,
    pub recovery_key: String,
    pub handle: String,
    pub service: String,
    pub prev: (),
    pub sig: String,
}

impl From<LegacyCreateOp> for Op {
    fn from(create: LegacyCreateOp) -> Self {
        Op {
            rotation_keys: vec![create.recovery_key, create.signing_key.clone()],
            verification_methods: [(SIGNING_KEY_METHOD.to_string(), create.signing_key)]
                .into_iter()
                .collect(),
            also_known_as: vec![format!("{}{}", AT_URI_PREFIX, create.handle)],
            services: [(
                PDS_SERVICE.to_string(),
                Service {
                    r#type: PDS_SERVICE_TYPE.to_string(),
                    endpoint: create.service,
                },
            )]
            .into_iter()
            .collect(),
            prev: None,
            sig: create.sig,
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Operation {
    #[serde(rename = "plc_operation")]
    Op(Op),

    #[serde(rename = "plc_tombstone")]
    Tombstone(Tombstone),

    #[serde(rename = "create")]
    Create(LegacyCreateOp),
}

impl Operation {
    /// Lifts the operation into the current `Op` shape. Tombstones have no
    /// such shape; callers branch on them first.
    pub fn normalize(self) -> Option<Op> {
        match self {
            Operation::Op(op) => Some(op),
            Operation::Create(create) => Some(create.into()),
            Operation::Tombstone(_) => None,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Operation::Tombstone(_))
    }
}
