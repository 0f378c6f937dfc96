use crate::key;
use crate::operation::{Op, AT_URI_PREFIX};

pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
pub const MULTIKEY_CONTEXT: &str = "https://w3id.org/security/multikey/v1";
pub const MULTIKEY_TYPE: &str = "Multikey";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub also_known_as: Vec<String>,
    pub verification_method: Vec<VerificationMethod>,
    pub service: Vec<ServiceEndpoint>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    pub r#type: String,
    pub controller: String,
    pub public_key_multibase: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    pub id: String,
    pub r#type: String,
    pub service_endpoint: String,
}

impl Document {
    pub fn render(did: &str, op: &Op) -> Self {
        let mut context = vec![DID_CONTEXT.to_string(), MULTIKEY_CONTEXT.to_string()];

        let verification_method = op
            .verification_methods
            .iter()
            .map(|(name, public_key)| {
                if let Some(family) = key::classify(public_key) {
                    if !context.iter().any(|c| c == family.context()) {
                        context.push(family.context().to_string());
                    }
                }
                VerificationMethod {
                    id: format!("{did}#{name}"),
                    r#type: MULTIKEY_TYPE.to_string(),
                    controller: did.to_string(),
                    public_key_multibase: public_key
                        .strip_prefix(key::DID_KEY_PREFIX)
                        .unwrap_or(public_key)
                        .to_string(),
                }
            })
            .collect();

        Document {
            context,
            id: did.to_string(),
            also_known_as: op
                .also_known_as
                .iter()
                .map(|aka| aka.strip_prefix(AT_URI_PREFIX).unwrap_or(aka).to_string())
                .collect(),
            verification_method,
            service: op
                .services
                .iter()
                .map(|(name, service)| ServiceEndpoint {
                    id: format!("#{name}"),
                    r#type: service.r#type.clone(),
                    service_endpoint: service.endpoint.clone(),
                })
                .collect(),
        }
    }
}
