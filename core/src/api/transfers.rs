use crate::api::encode;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::RequestDescriptor;
use crate::types::{StatusUpdate, Transfer, TransferInput};

/// Transfers of blood units between sites.
#[derive(Debug, Clone, Copy)]
pub struct TransfersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TransfersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Vec<Transfer>, ApiError> {
        self.client.call(RequestDescriptor::get("/transfers")).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Transfer, ApiError> {
        self.client
            .call(RequestDescriptor::get(format!("/transfers/{}", encode(id))))
            .await
    }

    pub async fn create(&self, data: &TransferInput) -> Result<Transfer, ApiError> {
        self.client.call(RequestDescriptor::post("/transfers").json(data)?).await
    }

    pub async fn update_status(&self, id: &str, status: &str) -> Result<Transfer, ApiError> {
        let body = StatusUpdate {
            status: status.to_string(),
        };
        let descriptor = RequestDescriptor::patch(format!("/transfers/{}/status", encode(id))).json(&body)?;
        self.client.call(descriptor).await
    }
}
