//! Typed client for the licensing REST backend.
//!
//! ## API Paths
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/api/v1/licenses` | Register an issued license |
//! | GET    | `/api/v1/licenses/{key}` | Look up a license (404 → unknown) |
//! | POST   | `/api/v1/licenses/{key}/revoke` | Revoke a license |
//! | GET    | `/api/v1/tenants/{tenantId}/installation-package?version=` | Packaging metadata |
//!
//! Every request carries `Authorization: Bearer <token>` read from the
//! session store at request time, and a fresh `x-request-id`. Path
//! parameters are percent-encoded as single segments. Endpoint labels in
//! errors and logs use the path template, and transport errors are
//! rendered without their URL, so license keys never appear there. No request is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use uuid::Uuid;
use vtp_core::{LicenseKey, TenantId};
use vtp_license::{BackendError, License, LicenseBackend, PackageMetadata};

use crate::config::ConsoleConfig;
use crate::error::ClientError;
use crate::session::SessionStore;

/// Path prefix of every backend route.
const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Body of `POST /licenses/{key}/revoke`.
#[derive(Debug, Serialize)]
struct RevokeRequest<'a> {
    reason: &'a str,
}

/// [`LicenseBackend`] over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Create a client for `config.api_url` that authenticates from `session`.
    pub fn new(config: &ConsoleConfig, session: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, endpoint: &str, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Unreachable {
                endpoint: endpoint.to_string(),
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, endpoint: &str) -> Result<RequestBuilder, BackendError> {
        let token = self
            .session
            .access_token()
            .map_err(|e| BackendError::Credentials(e.to_string()))?;
        let request_id = Uuid::new_v4();

        let mut builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        match token {
            Some(token) => builder = builder.bearer_auth(token.expose()),
            None => tracing::debug!(endpoint, "no access token in session"),
        }
        tracing::debug!(endpoint, %request_id, "sending request");
        Ok(builder)
    }

    async fn send(&self, endpoint: &str, builder: RequestBuilder) -> Result<Response, BackendError> {
        builder.send().await.map_err(|e| BackendError::Unreachable {
            endpoint: endpoint.to_string(),
            message: without_url(e),
        })
    }
}

async fn ensure_success(endpoint: &str, resp: Response) -> Result<Response, BackendError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(endpoint, status, "backend returned an error status");
    Err(BackendError::Status {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}

async fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, BackendError> {
    resp.json().await.map_err(|e| BackendError::Decode {
        endpoint: endpoint.to_string(),
        message: without_url(e),
    })
}

/// Error text with the request URL stripped. Paths carry license keys.
fn without_url(e: reqwest::Error) -> String {
    e.without_url().to_string()
}

async fn body_text(resp: Response) -> String {
    resp.text().await.unwrap_or_default()
}

#[async_trait]
impl LicenseBackend for HttpBackend {
    /// Calls `POST {base_url}/api/v1/licenses`. 409 means the key is taken.
    async fn register_license(&self, license: &License) -> Result<License, BackendError> {
        let endpoint = "POST /licenses";
        let url = self.url(endpoint, &["licenses"])?;
        let resp = self
            .send(endpoint, self.request(Method::POST, url, endpoint)?.json(license))
            .await?;

        if resp.status() == StatusCode::CONFLICT {
            return Err(BackendError::Rejected(body_text(resp).await));
        }
        decode(endpoint, ensure_success(endpoint, resp).await?).await
    }

    /// Calls `GET {base_url}/api/v1/licenses/{key}`.
    async fn find_license(&self, key: &str) -> Result<Option<License>, BackendError> {
        let endpoint = "GET /licenses/{key}";
        let url = self.url(endpoint, &["licenses", key])?;
        let resp = self
            .send(endpoint, self.request(Method::GET, url, endpoint)?)
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(endpoint, ensure_success(endpoint, resp).await?)
            .await
            .map(Some)
    }

    /// Calls `POST {base_url}/api/v1/licenses/{key}/revoke`. 404 and 409 are rejections.
    async fn revoke_license(&self, key: &LicenseKey, reason: &str) -> Result<(), BackendError> {
        let endpoint = "POST /licenses/{key}/revoke";
        let url = self.url(endpoint, &["licenses", key.as_str(), "revoke"])?;
        let resp = self
            .send(
                endpoint,
                self.request(Method::POST, url, endpoint)?
                    .json(&RevokeRequest { reason }),
            )
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(BackendError::Rejected("unknown license key".to_string())),
            StatusCode::CONFLICT => Err(BackendError::Rejected(body_text(resp).await)),
            _ => ensure_success(endpoint, resp).await.map(|_| ()),
        }
    }

    /// Calls `GET {base_url}/api/v1/tenants/{tenantId}/installation-package?version=`.
    async fn package_metadata(
        &self,
        tenant_id: &TenantId,
        version: &str,
    ) -> Result<PackageMetadata, BackendError> {
        let endpoint = "GET /tenants/{tenantId}/installation-package";
        let mut url = self.url(
            endpoint,
            &["tenants", tenant_id.as_str(), "installation-package"],
        )?;
        url.query_pairs_mut().append_pair("version", version);

        let resp = self
            .send(endpoint, self.request(Method::GET, url, endpoint)?)
            .await?;
        decode(endpoint, ensure_success(endpoint, resp).await?).await
    }
}
