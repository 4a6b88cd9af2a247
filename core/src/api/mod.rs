//! Endpoint catalogs.
//!
//! Each catalog borrows an `ApiClient` and maps one method to one remote
//! operation: method, path template and body type. They carry no logic
//! beyond interpolating parameters into the path or query string.

mod analytics;
mod auth;
mod campaigns;
mod dashboard;
mod hospitals;
mod inventory;
mod settings;
mod transfers;

pub use analytics::AnalyticsApi;
pub use auth::{AuthApi, DEFAULT_LOGIN_TYPE};
pub use campaigns::CampaignsApi;
pub use dashboard::DashboardApi;
pub use hospitals::HospitalsApi;
pub use inventory::InventoryApi;
pub use settings::SettingsApi;
pub use transfers::TransfersApi;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except RFC 3986 unreserved characters is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encode a path segment or query component.
pub(crate) fn encode(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

/// Render `?k=v&...`, or an empty string when there are no pairs.
pub(crate) fn query_string(pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{joined}")
}
