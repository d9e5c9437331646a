// REST API HTTP client
//
// Wraps `reqwest::Client` with Panorama-specific URL construction and
// envelope unwrapping. Endpoint modules (devices, policies) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::ApiKey;
use crate::error::Error;
use crate::models::{EntryBody, RestResponse};
use crate::transport::TransportConfig;

/// Raw HTTP client for the Panorama REST API.
///
/// Handles the `{ "@status", "result": { "entry": [...] } }` envelope and
/// versioned URL construction. All list methods return unwrapped `entry`
/// payloads; the envelope is stripped before the caller sees it.
pub struct PanoramaClient {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
    timeout_secs: u64,
}

impl PanoramaClient {
    /// Create a client that authenticates every request with `key`.
    ///
    /// `base_url` is the management root, e.g. `https://panorama.example.com`.
    pub fn new(
        base_url: Url,
        key: &ApiKey,
        api_version: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut header = HeaderValue::from_str(key.expose()).map_err(|_| Error::Authentication {
            message: "API key contains characters not allowed in a header".into(),
        })?;
        header.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("X-PAN-KEY", header);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url,
            api_version: api_version.into(),
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for the `X-PAN-KEY` header.
    pub fn with_client(http: reqwest::Client, base_url: Url, api_version: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            api_version: api_version.into(),
            timeout_secs: 0,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/restapi/{version}/{collection}?{query}`.
    pub(crate) fn rest_url(&self, collection: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = endpoint_url(
            &self.base_url,
            &format!("restapi/{}/{collection}", self.api_version),
        )?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap `result.entry`.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let envelope: RestResponse<T> = self.parse_envelope(resp).await?;
        Ok(envelope.result.map(|r| r.entry).unwrap_or_default())
    }

    /// Send a POST request wrapping `entry` as `{"entry": ...}`.
    pub(crate) async fn post_entry<T: Serialize + Sync>(
        &self,
        url: Url,
        entry: &T,
    ) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(&EntryBody { entry })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let _: RestResponse<serde_json::Value> = self.parse_envelope(resp).await?;
        Ok(())
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(e)
        }
    }

    /// Parse the REST envelope, failing on non-2xx or `@status: "error"`.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<RestResponse<T>, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(%status, body = %preview(&body), "response");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "API key rejected or expired".into(),
            });
        }

        if !status.is_success() {
            // Error bodies are usually still JSON with a message; fall back to raw text.
            let parsed = serde_json::from_str::<RestResponse<serde_json::Value>>(&body).ok();
            let (message, code) = parsed
                .map(|r| (error_text(&r), code_text(r.code.as_ref())))
                .unwrap_or((None, None));
            return Err(Error::Api {
                message: message.unwrap_or_else(|| format!("HTTP {status}: {}", preview(&body))),
                code,
                status: status.as_u16(),
            });
        }

        let envelope: RestResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        if envelope.status.as_deref() == Some("error") {
            return Err(Error::Api {
                message: error_text(&envelope).unwrap_or_else(|| "request failed".into()),
                code: code_text(envelope.code.as_ref()),
                status: status.as_u16(),
            });
        }

        Ok(envelope)
    }
}

/// Best human-readable message from an error envelope, including nested causes.
fn error_text<T>(resp: &RestResponse<T>) -> Option<String> {
    let head = resp.message.clone().or_else(|| resp.msg.clone());
    let causes: Vec<String> = resp
        .details
        .as_ref()
        .and_then(serde_json::Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|d| d.get("causes").and_then(serde_json::Value::as_array))
        .flatten()
        .filter_map(|c| c.get("description").and_then(serde_json::Value::as_str))
        .map(String::from)
        .collect();

    match (head, causes.is_empty()) {
        (Some(h), true) => Some(h),
        (Some(h), false) => Some(format!("{h}: {}", causes.join("; "))),
        (None, false) => Some(causes.join("; ")),
        (None, true) => None,
    }
}

fn code_text(code: Option<&serde_json::Value>) -> Option<String> {
    match code? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Append `path` below `base`, keeping any path prefix the base carries
/// (a reverse proxy mounting Panorama under `/pano`, for instance).
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Turn a user-supplied host (`panorama.lab`, `10.0.0.5:8443`, `https://pano`)
/// into a management base URL. Bare hosts default to HTTPS.
pub fn base_url_from_host(host: &str) -> Result<Url, Error> {
    let host = host.trim();
    if host.contains("://") {
        Ok(Url::parse(host)?)
    } else {
        Ok(Url::parse(&format!("https://{host}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_defaults_to_https() {
        let url = base_url_from_host("panorama.lab").expect("url");
        assert_eq!(url.as_str(), "https://panorama.lab/");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let url = base_url_from_host("http://10.0.0.5:8080").expect("url");
        assert_eq!(url.as_str(), "http://10.0.0.5:8080/");
    }

    #[test]
    fn rest_url_encodes_query() {
        let client = PanoramaClient::with_client(
            reqwest::Client::new(),
            base_url_from_host("pano").expect("url"),
            "v10.1",
        );
        let url = client
            .rest_url("Policies/SecurityPreRules", &[("device-group", "DG 1")])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://pano/restapi/v10.1/Policies/SecurityPreRules?device-group=DG+1"
        );
    }

    #[test]
    fn endpoint_url_keeps_path_prefix() {
        let base = base_url_from_host("https://gw.lab/pano/").expect("url");
        assert_eq!(
            endpoint_url(&base, "api/").expect("url").as_str(),
            "https://gw.lab/pano/api/"
        );

        let client = PanoramaClient::with_client(reqwest::Client::new(), base, "v11.0");
        let url = client.rest_url("Panorama/DeviceGroups", &[]).expect("url");
        assert_eq!(
            url.as_str(),
            "https://gw.lab/pano/restapi/v11.0/Panorama/DeviceGroups"
        );
    }

    #[test]
    fn error_text_joins_causes() {
        let resp: RestResponse<serde_json::Value> = serde_json::from_value(serde_json::json!({
            "code": 3,
            "message": "Invalid Object",
            "details": [{
                "@type": "CauseInfo",
                "causes": [{ "code": 12, "module": "panui_mgmt", "description": "from is missing" }]
            }]
        }))
        .expect("envelope");
        assert_eq!(
            error_text(&resp).as_deref(),
            Some("Invalid Object: from is missing")
        );
        assert_eq!(code_text(resp.code.as_ref()).as_deref(), Some("3"));
    }
}
