use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::RequestDescriptor;
use crate::types::{BloodTypeCount, ConsumptionPoint, DashboardStats, HospitalSite};

/// Overview screen: KPIs, consumption trend, weekly donations, map sites.
#[derive(Debug, Clone, Copy)]
pub struct DashboardApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DashboardApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_stats(&self) -> Result<DashboardStats, ApiError> {
        self.client.call(RequestDescriptor::get("/dashboard/stats")).await
    }

    pub async fn get_daily_consumption(&self) -> Result<Vec<ConsumptionPoint>, ApiError> {
        self.client.call(RequestDescriptor::get("/dashboard/consumption")).await
    }

    pub async fn get_weekly_donations(&self) -> Result<Vec<BloodTypeCount>, ApiError> {
        self.client.call(RequestDescriptor::get("/dashboard/donations/weekly")).await
    }

    pub async fn get_hospitals(&self) -> Result<Vec<HospitalSite>, ApiError> {
        self.client.call(RequestDescriptor::get("/dashboard/hospitals")).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::http::HttpMethod;
    use crate::session::MemorySessionStore;
    use crate::testing::{client_with, ScriptedTransport};

    #[tokio::test]
    async fn dashboard_paths() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(&transport, MemorySessionStore::new());
        transport.push_json(200, r#"{"totalUnitsAvailable": 420, "openUrgentRequests": 3}"#);
        transport.push_json(200, r#"[{"day":"Mon","consumption":12,"donations":9}]"#);
        transport.push_json(200, r#"[{"bloodType":"O+","count":31}]"#);
        transport.push_json(200, r#"[{"id":1,"name":"Central","lat":30.0,"lng":31.2}]"#);

        let stats = client.dashboard().get_stats().await.unwrap();
        assert_eq!(stats.total_units_available, Some(420.0));
        assert_eq!(stats.open_urgent_requests, Some(3));
        assert!(stats.campaigns_today.is_none());

        let trend = client.dashboard().get_daily_consumption().await.unwrap();
        assert_eq!(trend[0].day, "Mon");

        let weekly = client.dashboard().get_weekly_donations().await.unwrap();
        assert_eq!(weekly[0].count, 31);

        let sites = client.dashboard().get_hospitals().await.unwrap();
        assert!(sites[0].blood_types.is_empty());

        let urls: Vec<_> = transport.requests().into_iter().map(|r| (r.method, r.url)).collect();
        assert_eq!(
            urls,
            vec![
                (HttpMethod::Get, "http://api.test/dashboard/stats".to_string()),
                (HttpMethod::Get, "http://api.test/dashboard/consumption".to_string()),
                (HttpMethod::Get, "http://api.test/dashboard/donations/weekly".to_string()),
                (HttpMethod::Get, "http://api.test/dashboard/hospitals".to_string()),
            ]
        );
    }
}
