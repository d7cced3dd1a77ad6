//! The `send-contact` pipeline.
//!
//! `LockCheck → ValidateInputs → ResolveClient → ResolveContact → GateCheck
//! → Invoke → Report → Unlock`. A held lock ends the run before anything
//! else happens; every other early stop still passes through Unlock.

use crate::error::Result;
use crate::gate::{DispatchGate, GateRejection};
use crate::integration::{DispatchOutcome, Integration, IntegrationInvoker};
use crate::lock::{RunGuard, RunLock};
use crate::report::{OutcomeReporter, ReportLine};
use crate::resolver::EntityResolver;
use crate::types::{parse_id, RunKey};
use serde::Serialize;

pub const LOCK_HELD_MESSAGE: &str =
    "Script in progress. Another run is dispatching this contact to this client.";
pub const CLIENT_REQUIRED_MESSAGE: &str = "Client is required.";
pub const CONTACT_REQUIRED_MESSAGE: &str = "Contact is required.";
pub const CONTACT_NOT_FOUND_MESSAGE: &str = "Could not load Contact.";

// ---------------------------------------------------------------------------
// DispatchOptions
// ---------------------------------------------------------------------------

/// Operator input for one run. Identifiers stay raw so the pipeline can
/// report malformed values itself.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    pub client: Option<String>,
    pub contact: Option<String>,
    pub test: bool,
    pub force: bool,
    pub verbose: bool,
}

// ---------------------------------------------------------------------------
// Termination / DispatchReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Client,
    Contact,
}

/// Where a run ended. None of these is a failure of the command itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Termination {
    LockHeld,
    InvalidInput { field: InputField },
    ContactNotFound,
    Gated { reason: GateRejection },
    Completed { accepted: bool },
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub key: RunKey,
    pub test: bool,
    #[serde(flatten)]
    pub termination: Termination,
    pub lines: Vec<ReportLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DispatchOutcome>,
}

impl DispatchReport {
    /// `Some(accepted)` when the integration ran.
    pub fn accepted(&self) -> Option<bool> {
        match self.termination {
            Termination::Completed { accepted } => Some(accepted),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchCommand
// ---------------------------------------------------------------------------

type Finish = (Termination, Vec<ReportLine>, Option<DispatchOutcome>);

pub struct DispatchCommand<'a> {
    lock: &'a dyn RunLock,
    resolver: &'a dyn EntityResolver,
    /// `None` when no integration is installed.
    integration: Option<&'a dyn Integration>,
}

impl<'a> DispatchCommand<'a> {
    pub fn new(
        lock: &'a dyn RunLock,
        resolver: &'a dyn EntityResolver,
        integration: Option<&'a dyn Integration>,
    ) -> Self {
        Self {
            lock,
            resolver,
            integration,
        }
    }

    /// Run the pipeline once. `Err` only for infrastructure failures (lock
    /// or record I/O); the lock is released before such an error returns.
    pub fn run(&self, options: &DispatchOptions) -> Result<DispatchReport> {
        let key = RunKey::new(options.client.as_deref(), options.contact.as_deref());
        let reporter = OutcomeReporter::new(options.verbose);

        let Some(guard) = RunGuard::acquire(self.lock, key.clone())? else {
            tracing::info!(key = %key, "run already in progress, skipping");
            return Ok(DispatchReport {
                key,
                test: options.test,
                termination: Termination::LockHeld,
                lines: reporter.abort(LOCK_HELD_MESSAGE),
                outcome: None,
            });
        };

        let (termination, lines, outcome) = self.run_locked(options, &reporter)?;

        if let Err(e) = guard.release() {
            tracing::warn!(key = %key, error = %e, "failed to release run lock");
        }

        Ok(DispatchReport {
            key,
            test: options.test,
            termination,
            lines,
            outcome,
        })
    }

    fn run_locked(&self, options: &DispatchOptions, reporter: &OutcomeReporter) -> Result<Finish> {
        let stop = |termination: Termination, message: &str| -> Result<Finish> {
            tracing::debug!(?termination, "dispatch stopped");
            Ok((termination, reporter.abort(message), None))
        };

        let Some(client_id) = parse_id(options.client.as_deref()) else {
            return stop(
                Termination::InvalidInput {
                    field: InputField::Client,
                },
                CLIENT_REQUIRED_MESSAGE,
            );
        };
        let Some(contact_id) = parse_id(options.contact.as_deref()) else {
            return stop(
                Termination::InvalidInput {
                    field: InputField::Contact,
                },
                CONTACT_REQUIRED_MESSAGE,
            );
        };

        let Some(client) = self.resolver.resolve_client(client_id)? else {
            let reason = GateRejection::ClientNotFound;
            return stop(Termination::Gated { reason }, reason.message());
        };
        let Some(contact) = self.resolver.resolve_contact(contact_id)? else {
            return stop(Termination::ContactNotFound, CONTACT_NOT_FOUND_MESSAGE);
        };

        let gate = DispatchGate::new(options.force);
        let integration = match gate.admit(&client, self.integration) {
            Ok(integration) => integration,
            Err(reason) => return stop(Termination::Gated { reason }, reason.message()),
        };

        let outcome = IntegrationInvoker::new(integration).invoke(&client, &contact, options.test);
        let lines = reporter.outcome(&outcome);
        Ok((
            Termination::Completed {
                accepted: outcome.accepted,
            },
            lines,
            Some(outcome),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
