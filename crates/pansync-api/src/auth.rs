// API key generation
//
// Panorama only issues keys through the XML API:
// `POST /api/` with `type=keygen&user=..&password=..`.
// The key is then sent as `X-PAN-KEY` on every REST call.

use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::client::{endpoint_url, preview};
use crate::error::Error;
use crate::transport::TransportConfig;

/// REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v10.1";

static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<response\s+status\s*=\s*['"](\w+)['"]"#).expect("valid status regex")
});
static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<key>\s*([^<\s]+)\s*</key>").expect("valid key regex"));
static MSG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<msg>\s*(?:<line>)?(.*?)(?:</line>)?\s*</msg>").expect("valid msg regex")
});

/// A Panorama API key, either supplied directly or generated from credentials.
#[derive(Debug, Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    pub fn new(key: SecretString) -> Self {
        Self(key)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Exchange a username/password for an API key.
    ///
    /// `POST {base}/api/` with form fields `type=keygen`, `user`, `password`.
    /// Credentials travel in the body, never in the query string.
    pub async fn generate(
        base_url: &Url,
        username: &str,
        password: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let url = endpoint_url(base_url, "api/")?;
        let http = transport.build_client()?;

        debug!(%url, username, "requesting API key");

        let resp = http
            .post(url)
            .form(&[
                ("type", "keygen"),
                ("user", username),
                ("password", password.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        timeout_secs: transport.timeout.as_secs(),
                    }
                } else {
                    Error::Transport(e)
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: error_message(&body)
                    .unwrap_or_else(|| format!("keygen rejected (HTTP {status})")),
            });
        }
        if !status.is_success() {
            return Err(Error::Api {
                message: format!("keygen failed: {}", preview(&body)),
                code: None,
                status: status.as_u16(),
            });
        }

        let key = parse_keygen_response(&body)?;
        debug!("API key issued");
        Ok(Self(key))
    }
}

/// Extract the key from an XML keygen response.
///
/// Success: `<response status="success"><result><key>K</key></result></response>`
/// Failure: `<response status="error"><result><msg>Invalid Credential</msg></result></response>`
pub fn parse_keygen_response(body: &str) -> Result<SecretString, Error> {
    let status = STATUS_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());

    match status {
        Some("success") => KEY_RE
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| SecretString::from(m.as_str().to_owned()))
            .ok_or_else(|| Error::Deserialization {
                message: "keygen response has no <key> element".into(),
                body: body.to_owned(),
            }),
        Some(_) => Err(Error::Authentication {
            message: error_message(body).unwrap_or_else(|| "keygen returned an error".into()),
        }),
        None => Err(Error::Deserialization {
            message: "keygen response is not a <response> document".into(),
            body: body.to_owned(),
        }),
    }
}

fn error_message(body: &str) -> Option<String> {
    MSG_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|m| !m.is_empty())
}
