//! Records held by the mock server and its seed data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub blood_type: String,
    pub units_available: f64,
    pub expiring_soon: f64,
    pub average_demand: f64,
    pub status: String,
}

impl StockItem {
    fn new(blood_type: &str, units: f64, expiring: f64, demand: f64) -> Self {
        let mut item = Self {
            blood_type: blood_type.to_string(),
            units_available: units,
            expiring_soon: expiring,
            average_demand: demand,
            status: String::new(),
        };
        item.refresh_status();
        item
    }

    /// Classify stock against average demand.
    pub fn refresh_status(&mut self) {
        self.status = if self.units_available < self.average_demand * 0.5 {
            "critical"
        } else if self.units_available < self.average_demand {
            "low"
        } else {
            "adequate"
        }
        .to_string();
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub hospital_id: i64,
    pub hospital_name: String,
    /// Numeric blood group code, as the appointments backend stores it.
    pub blood_type: u8,
    pub component: String,
    pub units: f64,
    pub priority: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub status: String,
    pub donors_count: u32,
    pub units_collected: f64,
    pub blood_types_collected: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInput {
    pub name: String,
    pub location: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    pub from: String,
    pub to: String,
    pub blood_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub units: f64,
    pub status: String,
    pub temperature: f64,
    pub updated_at: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInput {
    pub from: String,
    pub to: String,
    pub blood_type: String,
    pub component: Option<String>,
    pub units: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
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

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notifications {
    pub urgent_requests: bool,
    pub low_stock: bool,
    pub campaign_updates: bool,
    pub daily_reports: bool,
}

/// Everything the mock server knows.
#[derive(Debug)]
pub struct Db {
    pub sessions: HashMap<String, User>,
    pub hospitals: Vec<Hospital>,
    pub stock: HashMap<i64, Vec<StockItem>>,
    pub appointments: Vec<Appointment>,
    pub campaigns: HashMap<i64, Campaign>,
    pub next_campaign_id: i64,
    pub transfers: HashMap<String, Transfer>,
    pub next_transfer_id: u32,
    pub profile: Profile,
    pub password: String,
    pub notifications: Notifications,
}

/// Hospital whose stock is addressed by the blood-type routes.
pub const CENTRAL_HOSPITAL_ID: i64 = 1;

/// Password the seeded operator profile starts with.
pub const SEED_PASSWORD: &str = "changeme";

impl Db {
    pub fn seeded() -> Self {
        let hospitals = vec![
            Hospital {
                id: 1,
                name: "Central Blood Bank".into(),
                region: "Cairo".into(),
                lat: 30.0444,
                lng: 31.2357,
                address: "1 Tahrir Sq".into(),
            },
            Hospital {
                id: 2,
                name: "North General".into(),
                region: "Alexandria".into(),
                lat: 31.2001,
                lng: 29.9187,
                address: "12 Corniche Rd".into(),
            },
        ];

        let mut stock = HashMap::new();
        stock.insert(
            1,
            vec![
                StockItem::new("O+", 120.0, 10.0, 80.0),
                StockItem::new("O-", 18.0, 2.0, 40.0),
                StockItem::new("A+", 64.0, 6.0, 70.0),
                StockItem::new("AB+", 25.0, 1.0, 20.0),
            ],
        );
        stock.insert(
            2,
            vec![
                StockItem::new("O+", 30.0, 4.0, 35.0),
                StockItem::new("B-", 3.0, 0.0, 10.0),
            ],
        );

        let appointments = vec![
            Appointment {
                id: 10,
                hospital_id: 1,
                hospital_name: "Central Blood Bank".into(),
                blood_type: 2,
                component: "Whole blood".into(),
                units: 4.0,
                priority: "urgent".into(),
                status: "Pending".into(),
                created_at: "2024-05-02T08:15:00Z".into(),
            },
            Appointment {
                id: 11,
                hospital_id: 2,
                hospital_name: "North General".into(),
                blood_type: 5,
                component: "Plasma".into(),
                units: 2.0,
                priority: "normal".into(),
                status: "Pending".into(),
                created_at: "2024-05-02T09:40:00Z".into(),
            },
        ];

        let mut campaigns = HashMap::new();
        campaigns.insert(
            1,
            Campaign {
                id: 1,
                name: "University Drive".into(),
                location: Some("Cairo University".into()),
                start_time: Some("2024-05-01T09:00:00Z".into()),
                end_time: Some("2024-05-01T17:00:00Z".into()),
                status: "active".into(),
                donors_count: 58,
                units_collected: 51.0,
                blood_types_collected: vec!["O+".into(), "A+".into()],
            },
        );

        let mut transfers = HashMap::new();
        transfers.insert(
            "TR-1".to_string(),
            Transfer {
                id: "TR-1".into(),
                from: "Central Blood Bank".into(),
                to: "North General".into(),
                blood_type: "O+".into(),
                component: None,
                units: 6.0,
                status: "In Transit".into(),
                temperature: 4.0,
                updated_at: "2024-05-02T10:00:00Z".into(),
            },
        );

        Self {
            sessions: HashMap::new(),
            hospitals,
            stock,
            appointments,
            campaigns,
            next_campaign_id: 2,
            transfers,
            next_transfer_id: 2,
            profile: Profile {
                first_name: "Amal".into(),
                last_name: "Saad".into(),
                email: "admin@bloodlink.test".into(),
                phone: None,
                position: Some("Coordinator".into()),
            },
            password: SEED_PASSWORD.into(),
            notifications: Notifications {
                urgent_requests: true,
                low_stock: true,
                campaign_updates: false,
                daily_reports: false,
            },
        }
    }

    pub fn hospital_name(&self, id: i64) -> Option<&str> {
        self.hospitals.iter().find(|h| h.id == id).map(|h| h.name.as_str())
    }
}
