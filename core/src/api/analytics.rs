use serde_json::Value;

use crate::api::query_string;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::RequestDescriptor;
use crate::types::{AgeGroupPoint, BloodTypeCount, MonthlyPoint};

#[derive(Debug, Clone, Copy)]
pub struct AnalyticsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AnalyticsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_monthly_data(&self) -> Result<Vec<MonthlyPoint>, ApiError> {
        self.client.call(RequestDescriptor::get("/analytics/monthly")).await
    }

    pub async fn get_blood_type_distribution(&self) -> Result<Vec<BloodTypeCount>, ApiError> {
        self.client.call(RequestDescriptor::get("/analytics/blood-types")).await
    }

    pub async fn get_donor_age_groups(&self) -> Result<Vec<AgeGroupPoint>, ApiError> {
        self.client.call(RequestDescriptor::get("/analytics/donors/age-groups")).await
    }

    /// Request a report export. Success must still be JSON; a server that
    /// streams the file back directly surfaces as `NonJsonSuccess`.
    pub async fn export_report(&self, report_type: &str, period: &str) -> Result<Value, ApiError> {
        let query = query_string(&[("type", report_type), ("period", period)]);
        self.client
            .call(RequestDescriptor::get(format!("/analytics/export{query}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::MemorySessionStore;
    use crate::testing::{client_with, ScriptedTransport};

    #[tokio::test]
    async fn chart_endpoints() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(&transport, MemorySessionStore::new());
        transport.push_json(200, r#"[{"month":"Jan","donations":120,"consumption":98}]"#);
        transport.push_json(200, r#"[{"bloodType":"B-","count":4}]"#);
        transport.push_json(200, r#"[{"ageGroup":"18-25","count":40}]"#);

        let monthly = client.analytics().get_monthly_data().await.unwrap();
        assert!(monthly[0].wastage.is_none());
        client.analytics().get_blood_type_distribution().await.unwrap();
        let ages = client.analytics().get_donor_age_groups().await.unwrap();
        assert_eq!(ages[0].age_group, "18-25");

        let urls: Vec<_> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://api.test/analytics/monthly",
                "http://api.test/analytics/blood-types",
                "http://api.test/analytics/donors/age-groups",
            ]
        );
    }

    #[tokio::test]
    async fn export_encodes_query() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(&transport, MemorySessionStore::new());

        client.analytics().export_report("inventory", "last 30 days").await.unwrap();
        assert_eq!(
            transport.last_request().url,
            "http://api.test/analytics/export?type=inventory&period=last%2030%20days"
        );
    }
}
