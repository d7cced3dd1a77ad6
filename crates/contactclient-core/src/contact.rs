use crate::error::{ContactClientError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The record being dispatched. Payload fields are opaque to the pipeline;
/// only integrations look inside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_yaml::Value>,
}

impl Contact {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_yaml::Value>,
    ) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// True when `name` is present and not null or blank.
    pub fn has_value(&self, name: &str) -> bool {
        match self.fields.get(name) {
            None | Some(serde_yaml::Value::Null) => false,
            Some(serde_yaml::Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    pub fn load(root: &Path, id: u64) -> Result<Option<Self>> {
        let path = paths::contact_record(root, id);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let contact: Contact = serde_yaml::from_str(&data)?;
        if contact.id != id {
            return Err(ContactClientError::MalformedRecord {
                path: path.display().to_string(),
                reason: format!("record declares id {} but is stored as {id}", contact.id),
            });
        }
        Ok(Some(contact))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::contact_record(root, self.id), data.as_bytes())
    }
}
