use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

// ---------------------------------------------------------------------------
// ClientType
// ---------------------------------------------------------------------------

/// Destination kind of a client. Unknown values are kept verbatim so they can
/// be reported, but only `api` and `file` can be dispatched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClientType {
    Api,
    File,
    Other(String),
}

impl ClientType {
    pub fn as_str(&self) -> &str {
        match self {
            ClientType::Api => "api",
            ClientType::File => "file",
            ClientType::Other(s) => s,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, ClientType::Api | ClientType::File)
    }
}

impl From<String> for ClientType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "api" => ClientType::Api,
            "file" => ClientType::File,
            _ => ClientType::Other(s),
        }
    }
}

impl From<ClientType> for String {
    fn from(t: ClientType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Identifier parsing
// ---------------------------------------------------------------------------

/// Parse an operator-supplied record identifier. Only positive base-10
/// integers are accepted; anything else (missing, empty, `0`, signs,
/// fractions, exponents) is `None`.
pub fn parse_id(raw: Option<&str>) -> Option<u64> {
    let s = raw?.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>().ok().filter(|id| *id > 0)
}

// ---------------------------------------------------------------------------
// RunKey
// ---------------------------------------------------------------------------

/// Identifies one in-flight dispatch attempt.
///
/// Built from the option values before validation, so the lock is taken
/// first. A component that parses as an identifier is rendered as that
/// number, so `042`, ` 42` and `42` share one key. Anything else is
/// percent-encoded outside `[0-9A-Za-z]`, and components longer than
/// [`MAX_COMPONENT_LEN`] are cut short and suffixed with a digest of the raw
/// value. The two parts are joined with labelled delimiters, so `(1, 23)`
/// and `(12, 3)` never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RunKey(String);

/// Longest rendered component. Keeps marker file names well under the
/// 255-byte limit of common filesystems.
pub const MAX_COMPONENT_LEN: usize = 64;

/// Encoded bytes kept in front of the digest for long components.
const DIGEST_PREFIX_LEN: usize = 24;

impl RunKey {
    pub fn new(client: Option<&str>, contact: Option<&str>) -> Self {
        Self(format!(
            "client-{}.contact-{}",
            key_component(client),
            key_component(contact)
        ))
    }

    pub fn for_ids(client: u64, contact: u64) -> Self {
        Self(format!("client-{client}.contact-{contact}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn key_component(raw: Option<&str>) -> String {
    if let Some(id) = parse_id(raw) {
        return id.to_string();
    }
    let raw = raw.unwrap_or_default();
    let encoded = encode_component(raw);
    if encoded.len() <= MAX_COMPONENT_LEN {
        return encoded;
    }
    // `~` never appears in encoded output, so a digested component cannot
    // equal a short one.
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest[..16].iter().map(|b| format!("{b:02x}")).collect();
    format!("{}~{hex}", &encoded[..DIGEST_PREFIX_LEN])
}

fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
