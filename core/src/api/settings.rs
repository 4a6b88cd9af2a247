use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::RequestDescriptor;
use crate::types::{NotificationSettings, PasswordChange, Profile};

/// Operator profile, password and notification preferences.
#[derive(Debug, Clone, Copy)]
pub struct SettingsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SettingsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        self.client.call(RequestDescriptor::get("/settings/profile")).await
    }

    pub async fn update_profile(&self, data: &Profile) -> Result<Profile, ApiError> {
        self.client
            .call(RequestDescriptor::put("/settings/profile").json(data)?)
            .await
    }

    pub async fn update_password(&self, current_password: &str, new_password: &str) -> Result<Value, ApiError> {
        let body = PasswordChange {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.client
            .call(RequestDescriptor::put("/settings/password").json(&body)?)
            .await
    }

    pub async fn get_notifications(&self) -> Result<NotificationSettings, ApiError> {
        self.client.call(RequestDescriptor::get("/settings/notifications")).await
    }

    pub async fn update_notifications(&self, data: &NotificationSettings) -> Result<NotificationSettings, ApiError> {
        self.client
            .call(RequestDescriptor::put("/settings/notifications").json(data)?)
            .await
    }
}
