use crate::client::Client;
use crate::config::Config;
use crate::contact::Contact;
use crate::error::Result;
use crate::integration::{DispatchLogs, DispatchOutcome, Integration, IntegrationSettings};
use crate::paths;
use crate::types::ClientType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Delivery documents
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Delivery<'a> {
    /// Staged request body for an `api` client.
    Request {
        client: u64,
        contact: u64,
        created_at: DateTime<Utc>,
        body: &'a BTreeMap<String, serde_yaml::Value>,
    },
    /// One row destined for a `file` client's export.
    FileRow {
        client: u64,
        contact: u64,
        created_at: DateTime<Utc>,
        row: &'a BTreeMap<String, serde_yaml::Value>,
    },
}

// ---------------------------------------------------------------------------
// LocalIntegration
// ---------------------------------------------------------------------------

/// Integration that validates contacts against the client's required fields
/// and stages accepted deliveries under `.contactclient/outbox/<client>/`.
/// A transport process picks them up from there.
#[derive(Debug, Clone)]
pub struct LocalIntegration {
    root: PathBuf,
    settings: IntegrationSettings,
}

impl LocalIntegration {
    /// `None` when the config does not install the integration.
    pub fn from_config(root: &Path, config: &Config) -> Option<Self> {
        let settings = config.integration.clone()?;
        Some(Self {
            root: root.to_path_buf(),
            settings,
        })
    }

    fn delivery_path(&self, client: &Client, contact: &Contact, at: DateTime<Utc>) -> PathBuf {
        paths::outbox_dir(&self.root, client.id).join(format!(
            "{}-{}.yaml",
            contact.id,
            at.format("%Y%m%dT%H%M%S%.6fZ")
        ))
    }
}

impl Integration for LocalIntegration {
    fn settings(&self) -> IntegrationSettings {
        self.settings.clone()
    }

    fn send_contact(
        &self,
        client: &Client,
        contact: &Contact,
        test: bool,
    ) -> Result<DispatchOutcome> {
        let mut logs = DispatchLogs::new();
        if test {
            logs.push("mode", "test: no delivery will be written");
        }

        let missing: Vec<&str> = client
            .required_fields
            .iter()
            .map(String::as_str)
            .filter(|f| !contact.has_value(f))
            .collect();
        if !missing.is_empty() {
            logs.push(
                "validate",
                format!("missing required fields: {}", missing.join(", ")),
            );
            return Ok(DispatchOutcome::rejected(logs));
        }
        logs.push(
            "validate",
            format!("{} required field(s) present", client.required_fields.len()),
        );

        let now = Utc::now();
        let delivery = match &client.client_type {
            ClientType::Api => Delivery::Request {
                client: client.id,
                contact: contact.id,
                created_at: now,
                body: &contact.fields,
            },
            ClientType::File => Delivery::FileRow {
                client: client.id,
                contact: contact.id,
                created_at: now,
                row: &contact.fields,
            },
            ClientType::Other(t) => {
                logs.push("deliver", format!("client type '{t}' has no delivery format"));
                return Ok(DispatchOutcome::rejected(logs));
            }
        };
        let data = serde_yaml::to_string(&delivery)?;
        let path = self.delivery_path(client, contact, now);

        if test {
            logs.push("deliver", format!("would write {} bytes", data.len()));
        } else {
            crate::io::atomic_write(&path, data.as_bytes())?;
            let shown = path.strip_prefix(&self.root).unwrap_or(&path);
            logs.push("deliver", format!("wrote {}", shown.display()));
        }
        Ok(DispatchOutcome::accepted(logs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn integration(dir: &TempDir) -> LocalIntegration {
        LocalIntegration::from_config(dir.path(), &Config::initial()).unwrap()
    }

    fn outbox_files(dir: &TempDir, client: u64) -> Vec<PathBuf> {
        let outbox = paths::outbox_dir(dir.path(), client);
        if !outbox.exists() {
            return Vec::new();
        }
        std::fs::read_dir(outbox)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    fn client_requiring(client_type: ClientType, fields: &[&str]) -> Client {
        let mut c = Client::new(42, "Acme", client_type);
        c.required_fields = fields.iter().map(|f| f.to_string()).collect();
        c
    }

    #[test]
    fn not_installed_without_config_section() {
        let dir = TempDir::new().unwrap();
        assert!(LocalIntegration::from_config(dir.path(), &Config::default()).is_none());
    }

    #[test]
    fn api_delivery_is_written() {
        let dir = TempDir::new().unwrap();
        let client = client_requiring(ClientType::Api, &["email"]);
        let contact = Contact::new(7).with_field("email", "jo@example.com");

        let outcome = integration(&dir).send_contact(&client, &contact, false).unwrap();
        assert!(outcome.accepted);

        let files = outbox_files(&dir, 42);
        assert_eq!(files.len(), 1);
        let doc = std::fs::read_to_string(&files[0]).unwrap();
        assert!(doc.contains("kind: request"));
        assert!(doc.contains("email: jo@example.com"));
    }

    #[test]
    fn file_delivery_uses_row_document() {
        let dir = TempDir::new().unwrap();
        let client = client_requiring(ClientType::File, &[]);
        let outcome = integration(&dir)
            .send_contact(&client, &Contact::new(7), false)
            .unwrap();
        assert!(outcome.accepted);
        let doc = std::fs::read_to_string(&outbox_files(&dir, 42)[0]).unwrap();
        assert!(doc.contains("kind: file_row"));
    }

    #[test]
    fn missing_required_field_rejects_without_writing() {
        let dir = TempDir::new().unwrap();
        let client = client_requiring(ClientType::Api, &["email", "phone"]);
        let contact = Contact::new(7).with_field("email", "jo@example.com");

        let outcome = integration(&dir).send_contact(&client, &contact, false).unwrap();
        assert!(!outcome.accepted);
        assert!(outcome.logs.to_yaml().contains("missing required fields: phone"));
        assert!(outbox_files(&dir, 42).is_empty());
    }

    #[test]
    fn test_mode_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let client = client_requiring(ClientType::Api, &["email"]);
        let contact = Contact::new(7).with_field("email", "jo@example.com");

        let outcome = integration(&dir).send_contact(&client, &contact, true).unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.logs.entries()[0].step, "mode");
        assert!(outbox_files(&dir, 42).is_empty());
        assert!(!dir.path().join(paths::OUTBOX_DIR).exists());
    }

    #[test]
    fn test_mode_reports_same_verdict_as_live() {
        let dir = TempDir::new().unwrap();
        let client = client_requiring(ClientType::File, &["zip"]);
        let contact = Contact::new(7);
        let live = integration(&dir).send_contact(&client, &contact, false).unwrap();
        let test = integration(&dir).send_contact(&client, &contact, true).unwrap();
        assert_eq!(live.accepted, test.accepted);
    }
}
