pub const DID_KEY_PREFIX: &str = "did:key:";

const SECP256K1_PUB: [u8; 2] = [0xe7, 0x01];
const P256_PUB: [u8; 2] = [0x80, 0x24];
const COMPRESSED_POINT_LEN: usize = 33;
const COMPRESSED_POINT_TAGS: [u8; 2] = [0x02, 0x03];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Secp256k1,
    P256,
}

impl KeyFamily {
    /// JSON-LD context contributed to a document carrying a key of this family.
    pub fn context(self) -> &'static str {
        match self {
            KeyFamily::Secp256k1 => "https://w3id.org/security/suites/secp256k1-2019/v1",
            KeyFamily::P256 => "https://w3id.org/security/suites/ecdsa-2019/v1",
        }
    }
}

/// Classifies a `did:key` public key by its multicodec prefix. Anything that
/// is not a base58btc compressed secp256k1 or P-256 point is unrecognized.
pub fn classify(key: &str) -> Option<KeyFamily> {
    let (base, bytes) = multibase::decode(key.strip_prefix(DID_KEY_PREFIX)?).ok()?;
    if base != multibase::Base::Base58Btc {
        return None;
    }
    if bytes.len() != SECP256K1_PUB.len() + COMPRESSED_POINT_LEN {
        return None;
    }
    let (codec, point) = bytes.split_at(SECP256K1_PUB.len());
    if !COMPRESSED_POINT_TAGS.contains(&point[0]) {
        return None;
    }
    match codec {
        c if c == SECP256K1_PUB => Some(KeyFamily::Secp256k1),
        c if c == P256_PUB => Some(KeyFamily::P256),
        _ => None,
    }
}
