//! Domain DTOs for the BloodLink API.
//!
//! # Design
//! The backend is loosely specified, so response types only require the
//! fields every screen depends on and default or make optional everything
//! else. Anything that still does not fit fails as `SchemaMismatch` at the
//! client boundary. Request payloads are one concrete type per operation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_units_available: Option<f64>,
    pub open_urgent_requests: Option<u32>,
    pub expiring_soon_percent: Option<f64>,
    pub avg_response_time_hours: Option<f64>,
    pub campaigns_today: Option<u32>,
    pub campaigns_this_week: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionPoint {
    pub day: String,
    pub consumption: f64,
    pub donations: f64,
}

/// A count per blood group, used by weekly donations and the analytics
/// distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodTypeCount {
    pub blood_type: String,
    pub count: u64,
}

/// A hospital as plotted on the dashboard map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalSite {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub status: Option<String>,
    pub inventory: Option<f64>,
    #[serde(default)]
    pub blood_types: Vec<String>,
    pub address: Option<String>,
    pub open_requests: Option<u32>,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub blood_type: String,
    #[serde(default)]
    pub units_available: f64,
    #[serde(default)]
    pub expiring_soon: f64,
    pub average_demand: Option<f64>,
    pub status: Option<String>,
    pub fill_percentage: Option<f64>,
}

impl InventoryItem {
    /// Whether the backend flagged this blood group as low or critical.
    pub fn is_short(&self) -> bool {
        matches!(
            self.status.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("low") | Some("critical")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_units: Option<f64>,
    pub expiring_soon: Option<f64>,
    pub critical_types: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units_available: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiring_soon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Hospitals & requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: i64,
    pub name: String,
    pub region: Option<String>,
}

/// A blood request (appointment) raised by a hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRequest {
    pub id: i64,
    pub hospital_id: i64,
    pub hospital_name: Option<String>,
    /// Either a group label ("A+") or the backend's numeric code.
    #[serde(default)]
    pub blood_type: serde_json::Value,
    pub component: Option<String>,
    #[serde(default)]
    pub units: f64,
    pub priority: Option<String>,
    pub status: String,
    pub created_at: Option<String>,
}

impl HospitalRequest {
    pub fn is_urgent(&self) -> bool {
        self.priority.as_deref().is_some_and(|p| p.eq_ignore_ascii_case("urgent"))
    }

    /// Blood group label, decoding the backend's numeric codes.
    pub fn blood_type_label(&self) -> Option<String> {
        match &self.blood_type {
            serde_json::Value::String(label) => Some(label.clone()),
            serde_json::Value::Number(code) => code
                .as_u64()
                .and_then(blood_type_from_code)
                .map(str::to_string),
            _ => None,
        }
    }
}

/// Numeric blood group codes used by the appointments backend.
pub fn blood_type_from_code(code: u64) -> Option<&'static str> {
    Some(match code {
        1 => "O+",
        2 => "O-",
        3 => "A+",
        4 => "A-",
        5 => "B+",
        6 => "B-",
        7 => "AB+",
        8 => "AB-",
        _ => return None,
    })
}

/// Body of approve/reject decisions on a hospital request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDecision {
    pub hospital_id: i64,
    pub id: i64,
}

/// Query filters for the hospital request list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilters {
    pub hospital_id: Option<String>,
    pub priority: Option<String>,
}

impl RequestFilters {
    pub fn urgent_only(mut self) -> Self {
        self.priority = Some("urgent".to_string());
        self
    }

    pub fn for_hospital(mut self, hospital_id: impl Into<String>) -> Self {
        self.hospital_id = Some(hospital_id.into());
        self
    }

    pub(crate) fn pairs(&self) -> Vec<(&'static str, &str)> {
        [("hospitalId", self.hospital_id.as_deref()), ("priority", self.priority.as_deref())]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: String,
    pub donors_count: Option<u32>,
    pub units_collected: Option<f64>,
    #[serde(default)]
    pub blood_types_collected: Vec<String>,
    pub eligible_percent: Option<f64>,
    pub avg_wait_minutes: Option<f64>,
}

/// Dashboard grouping of campaign statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignPhase {
    Active,
    Completed,
    Upcoming,
    Other,
}

impl Campaign {
    pub fn phase(&self) -> CampaignPhase {
        match self.status.to_ascii_lowercase().as_str() {
            "active" | "live" => CampaignPhase::Active,
            "completed" => CampaignPhase::Completed,
            "upcoming" | "scheduled" => CampaignPhase::Upcoming,
            _ => CampaignPhase::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub blood_type: Option<String>,
    pub component: Option<String>,
    pub units: Option<f64>,
    pub status: String,
    pub temperature: Option<f64>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInput {
    pub from: String,
    pub to: String,
    pub blood_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub units: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub month: String,
    pub donations: f64,
    pub consumption: f64,
    pub wastage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroupPoint {
    pub age_group: String,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub login_type: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: Option<String>,
    /// Present when the operator is scoped to one hospital. Accepted as a
    /// string or a number.
    pub hospital_id: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: serde_json::Value,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub hospital_id: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub urgent_requests: bool,
    pub low_stock: bool,
    pub campaign_updates: bool,
    pub daily_reports: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decision_serializes_camel_case() {
        let body = serde_json::to_value(RequestDecision { hospital_id: 3, id: 10 }).unwrap();
        assert_eq!(body, json!({"hospitalId": 3, "id": 10}));
    }

    #[test]
    fn login_request_field_names() {
        let body = serde_json::to_value(LoginRequest {
            email: "a@b.com".into(),
            password: "x".into(),
            login_type: 1,
        })
        .unwrap();
        assert_eq!(body, json!({"email": "a@b.com", "password": "x", "loginType": 1}));
    }

    #[test]
    fn inventory_item_tolerates_missing_optional_fields() {
        let item: InventoryItem = serde_json::from_value(json!({"bloodType": "O-", "status": "Critical"})).unwrap();
        assert_eq!(item.units_available, 0.0);
        assert!(item.is_short());
    }

    #[test]
    fn request_blood_type_codes_decode() {
        let request: HospitalRequest = serde_json::from_value(json!({
            "id": 1, "hospitalId": 2, "bloodType": 7, "units": 3, "status": "Pending", "priority": "URGENT"
        }))
        .unwrap();
        assert_eq!(request.blood_type_label().as_deref(), Some("AB+"));
        assert!(request.is_urgent());
        assert_eq!(blood_type_from_code(9), None);
    }

    #[test]
    fn campaign_phase_groups_statuses() {
        let mut campaign: Campaign =
            serde_json::from_value(json!({"id": 1, "name": "Drive", "status": "Live"})).unwrap();
        assert_eq!(campaign.phase(), CampaignPhase::Active);
        campaign.status = "scheduled".into();
        assert_eq!(campaign.phase(), CampaignPhase::Upcoming);
        campaign.status = "cancelled".into();
        assert_eq!(campaign.phase(), CampaignPhase::Other);
    }

    #[test]
    fn filters_skip_absent_fields() {
        assert!(RequestFilters::default().pairs().is_empty());
        let filters = RequestFilters::default().for_hospital("4").urgent_only();
        assert_eq!(filters.pairs(), vec![("hospitalId", "4"), ("priority", "urgent")]);
    }
}
