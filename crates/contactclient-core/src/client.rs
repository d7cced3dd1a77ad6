use crate::error::{ContactClientError, Result};
use crate::paths;
use crate::types::ClientType;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A configured destination that contacts are dispatched to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub client_type: ClientType,
    #[serde(default)]
    pub published: bool,
    /// Contact fields the destination demands. Contacts missing any of them
    /// are rejected by the integration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
}

impl Client {
    pub fn new(id: u64, name: impl Into<String>, client_type: ClientType) -> Self {
        Self {
            id,
            name: name.into(),
            client_type,
            published: true,
            required_fields: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the record for `id`. `Ok(None)` when no record exists.
    pub fn load(root: &Path, id: u64) -> Result<Option<Self>> {
        let path = paths::client_record(root, id);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let client: Client = serde_yaml::from_str(&data)?;
        if client.id != id {
            return Err(ContactClientError::MalformedRecord {
                path: path.display().to_string(),
                reason: format!("record declares id {} but is stored as {id}", client.id),
            });
        }
        Ok(Some(client))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::client_record(root, self.id), data.as_bytes())
    }
}
