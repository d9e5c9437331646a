// ── Session ──
//
// An authenticated handle on one Panorama instance. Acquired once per
// run and passed by reference; `oneshot` scopes it to a closure so the
// handle is released as soon as the work finishes.

use std::future::Future;
use std::sync::Arc;

use pansync_api::{ApiKey, PanoramaClient, Rulebase, SecurityRuleEntry, TlsMode, TransportConfig};
use tracing::{debug, info};

use crate::config::{AuthCredentials, SessionConfig, TlsVerification};
use crate::device::DeviceApi;
use crate::error::{CoreError, CreateError};
use crate::model::{ManagedDevice, RemoteRuleSummary, SecurityRule};

/// Cheaply cloneable authenticated session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: PanoramaClient,
    rulebase: Rulebase,
}

impl Session {
    /// Authenticate and build the REST client.
    ///
    /// With credentials this performs keygen; with an API key no request
    /// is made until the first call.
    pub async fn connect(config: &SessionConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);

        let key = match &config.auth {
            AuthCredentials::ApiKey(key) => {
                debug!("using configured API key");
                ApiKey::new(key.clone())
            }
            AuthCredentials::Credentials { username, password } => {
                info!(url = %config.url, username, "authenticating");
                ApiKey::generate(&config.url, username, password, &transport).await?
            }
        };

        let client =
            PanoramaClient::new(config.url.clone(), &key, config.api_version.clone(), &transport)?;

        Ok(Self {
            inner: Arc::new(SessionInner {
                client,
                rulebase: config.rulebase,
            }),
        })
    }

    /// Connect, run `f`, and drop the session.
    pub async fn oneshot<F, Fut, T>(config: &SessionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let session = Self::connect(config).await?;
        f(session).await
    }
}

impl DeviceApi for Session {
    async fn list_devices(&self) -> Result<Vec<ManagedDevice>, CoreError> {
        let groups = self.inner.client.list_device_groups().await?;
        Ok(groups.into_iter().map(ManagedDevice::from).collect())
    }

    async fn list_existing_rules(&self, group: &str) -> Result<Vec<RemoteRuleSummary>, CoreError> {
        let rules = self
            .inner
            .client
            .list_security_rules(group, self.inner.rulebase)
            .await?;
        Ok(rules.into_iter().map(RemoteRuleSummary::from).collect())
    }

    async fn create_rule(&self, group: &str, rule: &SecurityRule) -> Result<(), CreateError> {
        let entry = SecurityRuleEntry::from(rule);
        self.inner
            .client
            .create_security_rule(group, self.inner.rulebase, &entry)
            .await
            .map_err(CreateError::from)
    }
}

fn build_transport(config: &SessionConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
