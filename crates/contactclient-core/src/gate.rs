use crate::client::Client;
use crate::integration::{Integration, IntegrationSettings};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// GateRejection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRejection {
    ClientNotFound,
    ClientNotPublished,
    UnsupportedClientType,
    IntegrationNotPublished,
}

impl GateRejection {
    pub fn message(&self) -> &'static str {
        match self {
            GateRejection::ClientNotFound => "Could not load Client.",
            GateRejection::ClientNotPublished => {
                "This client is not published. Publish it or use --force"
            }
            GateRejection::UnsupportedClientType => "Client type is not recognized.",
            GateRejection::IntegrationNotPublished => {
                "The Contact Clients plugin is not published."
            }
        }
    }
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ---------------------------------------------------------------------------
// DispatchGate
// ---------------------------------------------------------------------------

/// Decides whether a dispatch may reach the integration. Rules run in order
/// and the first failure wins:
///
/// 1. the client exists
/// 2. the client is published, unless forced
/// 3. the client type is `api` or `file` (never overridden by force)
/// 4. the integration is installed, and published unless forced
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchGate {
    force: bool,
}

impl DispatchGate {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn check(
        &self,
        client: Option<&Client>,
        integration: Option<&IntegrationSettings>,
    ) -> Result<(), GateRejection> {
        let client = client.ok_or(GateRejection::ClientNotFound)?;
        self.check_client(client)?;
        match integration {
            Some(settings) if self.allows(settings) => Ok(()),
            _ => Err(GateRejection::IntegrationNotPublished),
        }
    }

    /// Rules 2 to 4 for a resolved client. On success yields the integration
    /// the dispatch may invoke.
    pub fn admit<'i>(
        &self,
        client: &Client,
        integration: Option<&'i dyn Integration>,
    ) -> Result<&'i dyn Integration, GateRejection> {
        self.check_client(client)?;
        match integration {
            Some(integration) if self.allows(&integration.settings()) => Ok(integration),
            _ => Err(GateRejection::IntegrationNotPublished),
        }
    }

    fn check_client(&self, client: &Client) -> Result<(), GateRejection> {
        if !client.published && !self.force {
            return Err(GateRejection::ClientNotPublished);
        }
        if !client.client_type.is_supported() {
            return Err(GateRejection::UnsupportedClientType);
        }
        Ok(())
    }

    fn allows(&self, settings: &IntegrationSettings) -> bool {
        settings.published || self.force
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::Contact;
    use crate::error::Result;
    use crate::integration::DispatchOutcome;
    use crate::types::ClientType;

    const PUBLISHED: IntegrationSettings = IntegrationSettings { published: true };
    const UNPUBLISHED: IntegrationSettings = IntegrationSettings { published: false };

    fn client(client_type: ClientType, published: bool) -> Client {
        let mut c = Client::new(42, "Acme", client_type);
        c.published = published;
        c
    }

    #[test]
    fn published_api_and_file_pass() {
        let gate = DispatchGate::new(false);
        for t in [ClientType::Api, ClientType::File] {
            assert_eq!(gate.check(Some(&client(t, true)), Some(&PUBLISHED)), Ok(()));
        }
    }

    #[test]
    fn missing_client_rejected_first() {
        for force in [false, true] {
            assert_eq!(
                DispatchGate::new(force).check(None, None),
                Err(GateRejection::ClientNotFound)
            );
        }
    }

    #[test]
    fn unpublished_client_needs_force() {
        let c = client(ClientType::Api, false);
        assert_eq!(
            DispatchGate::new(false).check(Some(&c), Some(&PUBLISHED)),
            Err(GateRejection::ClientNotPublished)
        );
        assert_eq!(DispatchGate::new(true).check(Some(&c), Some(&PUBLISHED)), Ok(()));
    }

    #[test]
    fn unpublished_check_precedes_type_check() {
        let c = client(ClientType::Other("webhook".to_string()), false);
        assert_eq!(
            DispatchGate::new(false).check(Some(&c), Some(&PUBLISHED)),
            Err(GateRejection::ClientNotPublished)
        );
    }

    #[test]
    fn unsupported_type_rejected_even_when_forced() {
        for t in ["webhook", "", "API", "ftp"] {
            let c = client(ClientType::Other(t.to_string()), true);
            for force in [false, true] {
                assert_eq!(
                    DispatchGate::new(force).check(Some(&c), Some(&PUBLISHED)),
                    Err(GateRejection::UnsupportedClientType),
                    "type {t:?} force {force}"
                );
            }
        }
    }

    #[test]
    fn unpublished_integration_needs_force() {
        let c = client(ClientType::File, true);
        assert_eq!(
            DispatchGate::new(false).check(Some(&c), Some(&UNPUBLISHED)),
            Err(GateRejection::IntegrationNotPublished)
        );
        assert_eq!(DispatchGate::new(true).check(Some(&c), Some(&UNPUBLISHED)), Ok(()));
    }

    #[test]
    fn missing_integration_rejected_even_when_forced() {
        let c = client(ClientType::Api, true);
        assert_eq!(
            DispatchGate::new(true).check(Some(&c), None),
            Err(GateRejection::IntegrationNotPublished)
        );
    }

    #[test]
    fn repeated_checks_agree() {
        let cases = [
            (client(ClientType::Api, true), PUBLISHED, false),
            (client(ClientType::Api, false), PUBLISHED, false),
            (client(ClientType::Other("x".into()), true), PUBLISHED, true),
            (client(ClientType::File, true), UNPUBLISHED, false),
        ];
        for (c, settings, force) in &cases {
            let gate = DispatchGate::new(*force);
            let first = gate.check(Some(c), Some(settings));
            let second = gate.check(Some(c), Some(settings));
            assert_eq!(first, second);
        }
    }

    struct Installed(IntegrationSettings);

    impl Integration for Installed {
        fn settings(&self) -> IntegrationSettings {
            self.0.clone()
        }

        fn send_contact(&self, _: &Client, _: &Contact, _: bool) -> Result<DispatchOutcome> {
            unreachable!("the gate never sends")
        }
    }

    #[test]
    fn admit_yields_installed_integration() {
        let installed = Installed(PUBLISHED);
        let c = client(ClientType::Api, true);
        let admitted = DispatchGate::new(false).admit(&c, Some(&installed as &dyn Integration));
        assert!(admitted.is_ok());
    }

    #[test]
    fn admit_applies_the_same_rules_as_check() {
        let published = Installed(PUBLISHED);
        let unpublished = Installed(UNPUBLISHED);
        let cases = [
            (client(ClientType::Api, false), &published, false),
            (client(ClientType::Other("x".into()), true), &published, true),
            (client(ClientType::File, true), &unpublished, false),
            (client(ClientType::File, true), &unpublished, true),
        ];
        for (c, integration, force) in cases {
            let gate = DispatchGate::new(force);
            let admitted = gate
                .admit(&c, Some(integration as &dyn Integration))
                .map(|_| ());
            assert_eq!(admitted, gate.check(Some(&c), Some(&integration.0)));
        }
        for force in [false, true] {
            let c = client(ClientType::Api, true);
            assert_eq!(
                DispatchGate::new(force).admit(&c, None).map(|_| ()),
                Err(GateRejection::IntegrationNotPublished)
            );
        }
    }

    #[test]
    fn messages_match_operator_text() {
        assert_eq!(
            GateRejection::ClientNotPublished.to_string(),
            "This client is not published. Publish it or use --force"
        );
        assert_eq!(
            GateRejection::UnsupportedClientType.message(),
            "Client type is not recognized."
        );
    }
}
