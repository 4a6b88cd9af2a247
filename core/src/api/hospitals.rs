use serde_json::Value;

use crate::api::query_string;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::RequestDescriptor;
use crate::types::{Hospital, HospitalRequest, RequestDecision, RequestFilters};

/// Hospitals and the blood requests (appointments) they raise.
#[derive(Debug, Clone, Copy)]
pub struct HospitalsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> HospitalsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Vec<Hospital>, ApiError> {
        self.client.call(RequestDescriptor::get("/hospitals")).await
    }

    pub async fn get_requests(&self, filters: &RequestFilters) -> Result<Vec<HospitalRequest>, ApiError> {
        let path = format!("/Appointments/Hospital{}", query_string(&filters.pairs()));
        self.client.call(RequestDescriptor::get(path)).await
    }

    pub async fn approve_request(&self, id: i64, hospital_id: i64) -> Result<Value, ApiError> {
        self.decide(id, hospital_id, "accept").await
    }

    pub async fn reject_request(&self, id: i64, hospital_id: i64) -> Result<Value, ApiError> {
        self.decide(id, hospital_id, "reject").await
    }

    async fn decide(&self, id: i64, hospital_id: i64, action: &str) -> Result<Value, ApiError> {
        let descriptor =
            RequestDescriptor::post(format!("/Appointments/{id}/{action}")).json(&RequestDecision { hospital_id, id })?;
        self.client.call(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http::HttpMethod;
    use crate::session::MemorySessionStore;
    use crate::testing::{client_with, ScriptedTransport};
    use serde_json::json;

    #[tokio::test]
    async fn approve_posts_decision_body() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(&transport, MemorySessionStore::new());

        client.hospitals().approve_request(10, 3).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "http://api.test/Appointments/10/accept");
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"hospitalId": 3, "id": 10}));
    }

    #[tokio::test]
    async fn reject_posts_to_reject_path() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(&transport, MemorySessionStore::new());

        client.hospitals().reject_request(11, 4).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.url, "http://api.test/Appointments/11/reject");
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"hospitalId": 4, "id": 11}));
    }

    #[tokio::test]
    async fn requests_render_filters_as_query() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(&transport, MemorySessionStore::new());
        transport.push_json(200, "[]");
        transport.push_json(
            200,
            r#"[{"id":1,"hospitalId":2,"bloodType":"O-","units":2,"status":"Pending","priority":"urgent"}]"#,
        );

        client.hospitals().get_requests(&RequestFilters::default()).await.unwrap();
        assert_eq!(transport.last_request().url, "http://api.test/Appointments/Hospital");

        let filters = RequestFilters::default().for_hospital("2").urgent_only();
        let requests = client.hospitals().get_requests(&filters).await.unwrap();
        assert!(requests[0].is_urgent());
        assert_eq!(
            transport.last_request().url,
            "http://api.test/Appointments/Hospital?hospitalId=2&priority=urgent"
        );
    }

    #[tokio::test]
    async fn hospital_list_shape_mismatch_is_reported() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(&transport, MemorySessionStore::new());
        transport.push_json(200, r#"{"items": []}"#);

        let err = client.hospitals().get_all().await.unwrap_err();
        assert!(matches!(err, ApiError::SchemaMismatch { status: 200, .. }));
    }
}
