use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::RequestDescriptor;
use crate::session::Session;
use crate::types::{CurrentUser, LoginRequest, LoginResponse};

/// Login type sent by the admin dashboard.
pub const DEFAULT_LOGIN_TYPE: i64 = 1;

/// Authentication. The only catalog that writes the session store.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Authenticate and store the returned token as the active session,
    /// replacing any previous one.
    pub async fn login(&self, email: &str, password: &str, login_type: i64) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            login_type,
        };
        let response: LoginResponse = self
            .client
            .call(RequestDescriptor::post("/auth/login").json(&body)?)
            .await?;

        let token = response
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingToken)?;
        let session = Session {
            token,
            hospital_id: response.hospital_id.as_ref().and_then(id_string),
        };
        self.client.session().set(session)?;
        tracing::info!(email, "session established");
        Ok(response)
    }

    /// Tell the server, then drop the local session whatever it answered.
    pub async fn logout(&self) -> Result<Value, ApiError> {
        let result = self.client.call(RequestDescriptor::post("/auth/logout")).await;
        self.client.session().clear()?;
        tracing::info!("session cleared");
        result
    }

    pub async fn get_current_user(&self) -> Result<CurrentUser, ApiError> {
        self.client.call(RequestDescriptor::get("/auth/me")).await
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
