use std::fmt::Display;

use crate::api::encode;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::RequestDescriptor;
use crate::types::{InventoryItem, InventoryStats, InventoryUpdate};

/// Blood unit stock, per hospital and per blood group.
#[derive(Debug, Clone, Copy)]
pub struct InventoryApi<'a> {
    client: &'a ApiClient,
}

impl<'a> InventoryApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Hospital the current session is scoped to.
    pub fn hospital_id(&self) -> Option<String> {
        self.client.session().get().and_then(|s| s.hospital_id)
    }

    pub async fn get_all(&self, hospital_id: impl Display) -> Result<Vec<InventoryItem>, ApiError> {
        let path = format!("/BloodUnits/{}", encode(&hospital_id.to_string()));
        self.client.call(RequestDescriptor::get(path)).await
    }

    pub async fn get_stats(&self, hospital_id: impl Display) -> Result<InventoryStats, ApiError> {
        let path = format!("/BloodUnits/stats/{}", encode(&hospital_id.to_string()));
        self.client.call(RequestDescriptor::get(path)).await
    }

    /// Inventory of the session's hospital; fails fast without a session.
    pub async fn get_all_for_session(&self) -> Result<Vec<InventoryItem>, ApiError> {
        let hospital_id = self.hospital_id().ok_or(ApiError::MissingSession)?;
        self.get_all(hospital_id).await
    }

    pub async fn get_stats_for_session(&self) -> Result<InventoryStats, ApiError> {
        let hospital_id = self.hospital_id().ok_or(ApiError::MissingSession)?;
        self.get_stats(hospital_id).await
    }

    pub async fn get_by_type(&self, blood_type: &str) -> Result<InventoryItem, ApiError> {
        let path = format!("/BloodUnits/{}", encode(blood_type));
        self.client.call(RequestDescriptor::get(path)).await
    }

    pub async fn update(&self, blood_type: &str, data: &InventoryUpdate) -> Result<InventoryItem, ApiError> {
        let path = format!("/BloodUnits/{}", encode(blood_type));
        self.client.call(RequestDescriptor::put(path).json(data)?).await
    }
}
