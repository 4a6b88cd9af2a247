use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::RequestDescriptor;
use crate::types::{Campaign, CampaignInput};

/// Donation campaigns and mobile units.
#[derive(Debug, Clone, Copy)]
pub struct CampaignsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CampaignsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Vec<Campaign>, ApiError> {
        self.client.call(RequestDescriptor::get("/campaigns")).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Campaign, ApiError> {
        self.client.call(RequestDescriptor::get(format!("/campaigns/{id}"))).await
    }

    pub async fn create(&self, data: &CampaignInput) -> Result<Campaign, ApiError> {
        self.client.call(RequestDescriptor::post("/campaigns").json(data)?).await
    }

    pub async fn update(&self, id: i64, data: &CampaignInput) -> Result<Campaign, ApiError> {
        self.client
            .call(RequestDescriptor::put(format!("/campaigns/{id}")).json(data)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.client.call(RequestDescriptor::delete(format!("/campaigns/{id}"))).await
    }
}
