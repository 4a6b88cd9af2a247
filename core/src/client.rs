//! HTTP client for the BloodLink API.
//!
//! # Design
//! `ApiClient` holds the base address, the session store and a transport.
//! As in the rest of the crate, building and parsing are split from I/O:
//! `build_request` and `parse_response` are pure and deterministic, and
//! `call` glues them around a single `Transport::execute`. No retries are
//! performed; a failed call surfaces one `ApiError` to the caller.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::api::{
    AnalyticsApi, AuthApi, CampaignsApi, DashboardApi, HospitalsApi, InventoryApi, SettingsApi, TransfersApi,
};
use crate::config::ClientConfig;
use crate::error::{ApiError, UNKNOWN_ERROR};
use crate::http::{find_header, HttpRequest, HttpResponse, RequestDescriptor};
use crate::normalize::{normalize, ResponseEnvelope};
use crate::session::SessionStore;
use crate::transport::{Transport, UreqTransport};

/// Client for the BloodLink API. Cheap to clone; clones share the session
/// store and transport.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            transport,
        }
    }

    /// Client that talks to the network through `UreqTransport`.
    pub fn from_config(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Self {
        Self::new(&config.base_url, session, Arc::new(UreqTransport::new()))
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Resolve a descriptor into an absolute request.
    ///
    /// Adds `Authorization: Bearer <token>` when a session is stored, and
    /// `content-type: application/json` when a body is present and the
    /// descriptor does not override the content type.
    pub fn build_request(&self, descriptor: &RequestDescriptor) -> HttpRequest {
        let mut headers = descriptor.headers.clone();

        if descriptor.body.is_some() && find_header(&headers, "content-type").is_none() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        if let Some(token) = self.session.token() {
            headers.retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }

        let separator = if descriptor.path.starts_with('/') { "" } else { "/" };
        HttpRequest {
            method: descriptor.method,
            url: format!("{}{separator}{}", self.base_url, descriptor.path),
            headers,
            body: descriptor.body.as_ref().map(|b| b.to_string()),
        }
    }

    /// Interpret a response: decode by content type, map non-2xx statuses,
    /// reject non-JSON successes, then normalize into `T`.
    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        let envelope = ResponseEnvelope::parse(&response)?;

        if !response.is_success() {
            let raw = envelope.raw().map(str::to_string);
            return Err(ApiError::from_status(response.status, envelope.message(), raw));
        }

        match envelope {
            ResponseEnvelope::Json(value) => normalize(response.status, value),
            ResponseEnvelope::Raw(raw) => Err(ApiError::NonJsonSuccess {
                status: response.status,
                raw,
            }),
        }
    }

    /// Build, execute and parse one request.
    pub async fn call<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T, ApiError> {
        let request = self.build_request(&descriptor);
        let method = request.method.as_str();
        tracing::debug!(method, url = %request.url, "sending request");

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.message.is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    e.message
                };
                tracing::warn!(method, path = %descriptor.path, error = %message, "transport failure");
                return Err(ApiError::Transport { message });
            }
        };

        let status = response.status;
        let result = self.parse_response(response);
        match &result {
            Ok(_) => tracing::debug!(method, path = %descriptor.path, status, "request succeeded"),
            Err(e) => tracing::warn!(method, path = %descriptor.path, status, error = %e, "request failed"),
        }
        result
    }

    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(self)
    }

    pub fn inventory(&self) -> InventoryApi<'_> {
        InventoryApi::new(self)
    }

    pub fn hospitals(&self) -> HospitalsApi<'_> {
        HospitalsApi::new(self)
    }

    pub fn campaigns(&self) -> CampaignsApi<'_> {
        CampaignsApi::new(self)
    }

    pub fn transfers(&self) -> TransfersApi<'_> {
        TransfersApi::new(self)
    }

    pub fn analytics(&self) -> AnalyticsApi<'_> {
        AnalyticsApi::new(self)
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn settings(&self) -> SettingsApi<'_> {
        SettingsApi::new(self)
    }
}
