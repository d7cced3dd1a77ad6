use crate::client::Client;
use crate::contact::Contact;
use crate::error::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// IntegrationSettings
// ---------------------------------------------------------------------------

/// Publish state of the integration itself, independent of any client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    #[serde(default)]
    pub published: bool,
}

// ---------------------------------------------------------------------------
// DispatchLogs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub step: String,
    pub message: String,
}

/// Ordered diagnostic log an integration returns with its verdict.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchLogs(Vec<LogEntry>);

impl DispatchLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: impl Into<String>, message: impl Into<String>) {
        self.0.push(LogEntry {
            step: step.into(),
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable YAML block, as shown under `--verbose`.
    pub fn to_yaml(&self) -> String {
        match serde_yaml::to_string(self) {
            Ok(s) => s.trim_end().to_string(),
            Err(e) => format!("# logs could not be rendered: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub accepted: bool,
    pub logs: DispatchLogs,
}

impl DispatchOutcome {
    pub fn accepted(logs: DispatchLogs) -> Self {
        Self {
            accepted: true,
            logs,
        }
    }

    pub fn rejected(logs: DispatchLogs) -> Self {
        Self {
            accepted: false,
            logs,
        }
    }
}

// ---------------------------------------------------------------------------
// Integration
// ---------------------------------------------------------------------------

/// The pluggable component that actually transmits a contact.
///
/// `send_contact` with `test = true` must leave no durable trace at the
/// destination while still returning a representative outcome.
pub trait Integration {
    fn settings(&self) -> IntegrationSettings;

    fn send_contact(
        &self,
        client: &Client,
        contact: &Contact,
        test: bool,
    ) -> Result<DispatchOutcome>;
}

// ---------------------------------------------------------------------------
// IntegrationInvoker
// ---------------------------------------------------------------------------

/// Calls the integration once and always yields an outcome: integration
/// failures become rejections carrying the error text.
pub struct IntegrationInvoker<'a> {
    integration: &'a dyn Integration,
}

impl<'a> IntegrationInvoker<'a> {
    pub fn new(integration: &'a dyn Integration) -> Self {
        Self { integration }
    }

    pub fn invoke(&self, client: &Client, contact: &Contact, test: bool) -> DispatchOutcome {
        tracing::debug!(client = client.id, contact = contact.id, test, "invoking integration");
        match self.integration.send_contact(client, contact, test) {
            Ok(outcome) => {
                tracing::info!(
                    client = client.id,
                    contact = contact.id,
                    accepted = outcome.accepted,
                    test,
                    "integration finished"
                );
                outcome
            }
            Err(e) => {
                tracing::warn!(
                    client = client.id,
                    contact = contact.id,
                    error = %e,
                    "integration failed"
                );
                let mut logs = DispatchLogs::new();
                logs.push("error", e.to_string());
                DispatchOutcome::rejected(logs)
            }
        }
    }
}
