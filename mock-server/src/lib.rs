//! In-memory stand-in for the BloodLink backend.
//!
//! Serves the same routes the dashboard data layer calls, with seeded data,
//! bearer-token sessions and `{ "message": ... }` error bodies.

pub mod model;

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

use model::{
    Appointment, Campaign, CampaignInput, Db, Hospital, Notifications, Profile, StockItem, Transfer,
    TransferInput, User, CENTRAL_HOSPITAL_ID,
};

pub type SharedDb = Arc<RwLock<Db>>;

/// Error response carrying a JSON `message`.
#[derive(Debug)]
pub struct Failure(StatusCode, String);

impl Failure {
    fn not_found(what: &str) -> Self {
        Self(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, message.into())
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

type Reply<T> = Result<Json<T>, Failure>;

/// JSON request body whose rejections answer with a `{ "message": ... }`
/// body instead of plain text.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Failure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| Failure(rejection.status(), rejection.body_text()))
    }
}

pub fn app() -> Router {
    router(Arc::new(RwLock::new(Db::seeded())))
}

pub fn router(db: SharedDb) -> Router {
    let protected = Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(current_user))
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/dashboard/consumption", get(daily_consumption))
        .route("/dashboard/donations/weekly", get(weekly_donations))
        .route("/dashboard/hospitals", get(hospital_sites))
        .route("/BloodUnits/{key}", get(blood_units).put(update_blood_units))
        .route("/BloodUnits/stats/{id}", get(inventory_stats))
        .route("/hospitals", get(list_hospitals))
        .route("/Appointments/Hospital", get(list_appointments))
        .route("/Appointments/{id}/{action}", post(decide_appointment))
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route(
            "/campaigns/{id}",
            get(get_campaign).put(update_campaign).delete(delete_campaign),
        )
        .route("/transfers", get(list_transfers).post(create_transfer))
        .route("/transfers/{id}", get(get_transfer))
        .route("/transfers/{id}/status", patch(update_transfer_status))
        .route("/analytics/monthly", get(monthly))
        .route("/analytics/blood-types", get(blood_type_distribution))
        .route("/analytics/donors/age-groups", get(age_groups))
        .route("/analytics/export", get(export_report))
        .route("/settings/profile", get(get_profile).put(update_profile))
        .route("/settings/password", put(update_password))
        .route(
            "/settings/notifications",
            get(get_notifications).put(update_notifications),
        )
        .route_layer(middleware::from_fn_with_state(db.clone(), require_token));

    Router::new()
        .route("/auth/login", post(login))
        .merge(protected)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
}

async fn require_token(State(db): State<SharedDb>, request: Request, next: Next) -> Response {
    let token = bearer(request.headers()).map(str::to_owned);
    let known = match token {
        Some(token) => db.read().await.sessions.contains_key(&token),
        None => false,
    };
    if !known {
        tracing::debug!(uri = %request.uri(), "rejected unauthenticated request");
        return Failure(StatusCode::UNAUTHORIZED, "missing or invalid token".into()).into_response();
    }
    next.run(request).await
}

fn now() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    secs.to_string()
}

// --- auth ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_login_type")]
    pub login_type: i64,
}

fn default_login_type() -> i64 {
    1
}

/// Login type for operators scoped to a single hospital.
pub const HOSPITAL_LOGIN_TYPE: i64 = 2;

async fn login(State(db): State<SharedDb>, JsonBody(body): JsonBody<LoginBody>) -> Reply<Value> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(Failure(StatusCode::UNAUTHORIZED, "email and password are required".into()));
    }
    let hospital_id = (body.login_type == HOSPITAL_LOGIN_TYPE).then_some(CENTRAL_HOSPITAL_ID);
    let token = format!("token-{}", Uuid::new_v4());

    let mut db = db.write().await;
    let user = User {
        id: db.sessions.len() as i64 + 1,
        email: body.email.clone(),
        name: format!("{} {}", db.profile.first_name, db.profile.last_name),
        role: if hospital_id.is_some() { "hospital" } else { "admin" }.into(),
        hospital_id,
    };
    db.sessions.insert(token.clone(), user);
    tracing::info!(email = %body.email, "issued session");

    let mut reply = json!({ "token": token });
    if let Some(id) = hospital_id {
        reply["hospitalId"] = json!(id);
    }
    Ok(Json(reply))
}

async fn logout(State(db): State<SharedDb>, headers: HeaderMap) -> Json<Value> {
    if let Some(token) = bearer(&headers) {
        db.write().await.sessions.remove(token);
    }
    Json(json!({ "success": true }))
}

async fn current_user(State(db): State<SharedDb>, headers: HeaderMap) -> Reply<User> {
    let db = db.read().await;
    bearer(&headers)
        .and_then(|token| db.sessions.get(token))
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("user"))
}

// --- dashboard ---

async fn dashboard_stats(State(db): State<SharedDb>) -> Json<Value> {
    let db = db.read().await;
    let items = || db.stock.values().flatten();
    let total: f64 = items().map(|i| i.units_available).sum();
    let expiring: f64 = items().map(|i| i.expiring_soon).sum();
    let urgent = db
        .appointments
        .iter()
        .filter(|a| a.priority == "urgent" && a.status == "Pending")
        .count();
    let active = db.campaigns.values().filter(|c| c.status == "active").count();
    let expiring_percent = if total > 0.0 { expiring / total * 100.0 } else { 0.0 };
    Json(json!({
        "totalUnitsAvailable": total,
        "openUrgentRequests": urgent,
        "expiringSoonPercent": expiring_percent,
        "avgResponseTimeHours": 2.5,
        "campaignsToday": active,
        "campaignsThisWeek": db.campaigns.len(),
    }))
}

async fn daily_consumption() -> Json<Value> {
    let days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let points: Vec<Value> = days
        .iter()
        .enumerate()
        .map(|(i, day)| json!({ "day": day, "consumption": 40 + i * 3, "donations": 45 + i * 2 }))
        .collect();
    Json(Value::Array(points))
}

async fn weekly_donations(State(db): State<SharedDb>) -> Json<Value> {
    blood_type_counts(&*db.read().await)
}

fn blood_type_counts(db: &Db) -> Json<Value> {
    let mut counts: Vec<(String, f64)> = Vec::new();
    for item in db.stock.values().flatten() {
        match counts.iter_mut().find(|(t, _)| *t == item.blood_type) {
            Some((_, n)) => *n += item.units_available,
            None => counts.push((item.blood_type.clone(), item.units_available)),
        }
    }
    counts.sort_by(|a, b| a.0.cmp(&b.0));
    let points = counts
        .into_iter()
        .map(|(blood_type, n)| json!({ "bloodType": blood_type, "count": n as u64 }))
        .collect();
    Json(Value::Array(points))
}

async fn hospital_sites(State(db): State<SharedDb>) -> Json<Value> {
    let db = db.read().await;
    let sites = db
        .hospitals
        .iter()
        .map(|h| {
            let stock = db.stock.get(&h.id).map(Vec::as_slice).unwrap_or_default();
            let short = stock.iter().any(|i| i.status == "critical");
            let open = db
                .appointments
                .iter()
                .filter(|a| a.hospital_id == h.id && a.status == "Pending")
                .count();
            json!({
                "id": h.id,
                "name": h.name,
                "lat": h.lat,
                "lng": h.lng,
                "status": if short { "critical" } else { "normal" },
                "inventory": stock.iter().map(|i| i.units_available).sum::<f64>(),
                "bloodTypes": stock.iter().map(|i| i.blood_type.as_str()).collect::<Vec<_>>(),
                "address": h.address,
                "openRequests": open,
            })
        })
        .collect();
    Json(Value::Array(sites))
}

// --- inventory ---

/// A numeric key lists a hospital's stock; anything else addresses one
/// blood type in the central bank.
async fn blood_units(State(db): State<SharedDb>, Path(key): Path<String>) -> Result<Json<Value>, Failure> {
    let db = db.read().await;
    if let Ok(hospital_id) = key.parse::<i64>() {
        let stock = db.stock.get(&hospital_id).ok_or_else(|| Failure::not_found("hospital"))?;
        return Ok(Json(json!(stock)));
    }
    let item = central_item(&db, &key).ok_or_else(|| Failure::not_found("blood type"))?;
    Ok(Json(json!(item)))
}

fn central_item<'a>(db: &'a Db, blood_type: &str) -> Option<&'a StockItem> {
    db.stock
        .get(&CENTRAL_HOSPITAL_ID)?
        .iter()
        .find(|i| i.blood_type == blood_type)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPatch {
    pub units_available: Option<f64>,
    pub expiring_soon: Option<f64>,
    pub status: Option<String>,
}

async fn update_blood_units(
    State(db): State<SharedDb>,
    Path(blood_type): Path<String>,
    JsonBody(patch): JsonBody<StockPatch>,
) -> Reply<StockItem> {
    let mut db = db.write().await;
    let item = db
        .stock
        .get_mut(&CENTRAL_HOSPITAL_ID)
        .and_then(|stock| stock.iter_mut().find(|i| i.blood_type == blood_type))
        .ok_or_else(|| Failure::not_found("blood type"))?;
    if let Some(units) = patch.units_available {
        if units < 0.0 {
            return Err(Failure::bad_request("units cannot be negative"));
        }
        item.units_available = units;
    }
    if let Some(expiring) = patch.expiring_soon {
        item.expiring_soon = expiring;
    }
    match patch.status {
        Some(status) => item.status = status,
        None => item.refresh_status(),
    }
    Ok(Json(item.clone()))
}

async fn inventory_stats(State(db): State<SharedDb>, Path(id): Path<i64>) -> Reply<Value> {
    let db = db.read().await;
    let stock = db.stock.get(&id).ok_or_else(|| Failure::not_found("hospital"))?;
    Ok(Json(json!({
        "totalUnits": stock.iter().map(|i| i.units_available).sum::<f64>(),
        "expiringSoon": stock.iter().map(|i| i.expiring_soon).sum::<f64>(),
        "criticalTypes": stock.iter().filter(|i| i.status == "critical").count(),
    })))
}

// --- hospitals & appointments ---

async fn list_hospitals(State(db): State<SharedDb>) -> Json<Vec<Hospital>> {
    Json(db.read().await.hospitals.clone())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    pub hospital_id: Option<i64>,
    pub priority: Option<String>,
}

async fn list_appointments(
    State(db): State<SharedDb>,
    Query(filter): Query<AppointmentFilter>,
) -> Json<Vec<Appointment>> {
    let db = db.read().await;
    let matches = db
        .appointments
        .iter()
        .filter(|a| filter.hospital_id.map_or(true, |id| a.hospital_id == id))
        .filter(|a| {
            filter
                .priority
                .as_deref()
                .map_or(true, |p| a.priority.eq_ignore_ascii_case(p))
        })
        .cloned()
        .collect();
    Json(matches)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub hospital_id: i64,
    pub id: i64,
}

async fn decide_appointment(
    State(db): State<SharedDb>,
    Path((id, action)): Path<(i64, String)>,
    JsonBody(decision): JsonBody<Decision>,
) -> Reply<Appointment> {
    let status = match action.as_str() {
        "accept" => "Approved",
        "reject" => "Rejected",
        _ => return Err(Failure::not_found("action")),
    };
    if decision.id != id {
        return Err(Failure::bad_request("request id mismatch"));
    }
    let mut db = db.write().await;
    let appointment = db
        .appointments
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| Failure::not_found("request"))?;
    if appointment.hospital_id != decision.hospital_id {
        return Err(Failure::bad_request("request belongs to another hospital"));
    }
    appointment.status = status.into();
    tracing::info!(id, status, "request decided");
    Ok(Json(appointment.clone()))
}

// --- campaigns ---

async fn list_campaigns(State(db): State<SharedDb>) -> Json<Vec<Campaign>> {
    let db = db.read().await;
    let mut campaigns: Vec<_> = db.campaigns.values().cloned().collect();
    campaigns.sort_by_key(|c| c.id);
    Json(campaigns)
}

async fn get_campaign(State(db): State<SharedDb>, Path(id): Path<i64>) -> Reply<Campaign> {
    let db = db.read().await;
    db.campaigns
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("campaign"))
}

async fn create_campaign(
    State(db): State<SharedDb>,
    JsonBody(input): JsonBody<CampaignInput>,
) -> Result<(StatusCode, Json<Campaign>), Failure> {
    if input.name.trim().is_empty() {
        return Err(Failure::bad_request("campaign name is required"));
    }
    let mut db = db.write().await;
    let id = db.next_campaign_id;
    db.next_campaign_id += 1;
    let campaign = Campaign {
        id,
        name: input.name,
        location: input.location,
        start_time: input.start_time,
        end_time: input.end_time,
        status: input.status.unwrap_or_else(|| "upcoming".into()),
        donors_count: 0,
        units_collected: 0.0,
        blood_types_collected: Vec::new(),
    };
    db.campaigns.insert(id, campaign.clone());
    Ok((StatusCode::CREATED, Json(campaign)))
}

async fn update_campaign(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<CampaignInput>,
) -> Reply<Campaign> {
    let mut db = db.write().await;
    let campaign = db.campaigns.get_mut(&id).ok_or_else(|| Failure::not_found("campaign"))?;
    campaign.name = input.name;
    if input.location.is_some() {
        campaign.location = input.location;
    }
    if input.start_time.is_some() {
        campaign.start_time = input.start_time;
    }
    if input.end_time.is_some() {
        campaign.end_time = input.end_time;
    }
    if let Some(status) = input.status {
        campaign.status = status;
    }
    Ok(Json(campaign.clone()))
}

async fn delete_campaign(State(db): State<SharedDb>, Path(id): Path<i64>) -> Reply<Value> {
    let mut db = db.write().await;
    db.campaigns
        .remove(&id)
        .map(|_| Json(json!({ "success": true })))
        .ok_or_else(|| Failure::not_found("campaign"))
}

// --- transfers ---

async fn list_transfers(State(db): State<SharedDb>) -> Json<Vec<Transfer>> {
    let db = db.read().await;
    let mut transfers: Vec<_> = db.transfers.values().cloned().collect();
    transfers.sort_by(|a, b| a.id.cmp(&b.id));
    Json(transfers)
}

async fn get_transfer(State(db): State<SharedDb>, Path(id): Path<String>) -> Reply<Transfer> {
    let db = db.read().await;
    db.transfers
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("transfer"))
}

async fn create_transfer(
    State(db): State<SharedDb>,
    JsonBody(input): JsonBody<TransferInput>,
) -> Result<(StatusCode, Json<Transfer>), Failure> {
    if input.units <= 0.0 {
        return Err(Failure::bad_request("units must be positive"));
    }
    let mut db = db.write().await;
    let id = format!("TR-{}", db.next_transfer_id);
    db.next_transfer_id += 1;
    let transfer = Transfer {
        id: id.clone(),
        from: input.from,
        to: input.to,
        blood_type: input.blood_type,
        component: input.component,
        units: input.units,
        status: "Pending".into(),
        temperature: 4.0,
        updated_at: now(),
    };
    db.transfers.insert(id, transfer.clone());
    Ok((StatusCode::CREATED, Json(transfer)))
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

async fn update_transfer_status(
    State(db): State<SharedDb>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusBody>,
) -> Reply<Transfer> {
    let mut db = db.write().await;
    let transfer = db.transfers.get_mut(&id).ok_or_else(|| Failure::not_found("transfer"))?;
    transfer.status = body.status;
    transfer.updated_at = now();
    Ok(Json(transfer.clone()))
}

// --- analytics ---

async fn monthly() -> Json<Value> {
    Json(json!([
        { "month": "Jan", "donations": 120, "consumption": 98, "wastage": 4 },
        { "month": "Feb", "donations": 134, "consumption": 110, "wastage": 6 },
        { "month": "Mar", "donations": 128, "consumption": 121 },
    ]))
}

async fn blood_type_distribution(State(db): State<SharedDb>) -> Json<Value> {
    blood_type_counts(&*db.read().await)
}

async fn age_groups() -> Json<Value> {
    Json(json!([
        { "ageGroup": "18-25", "count": 40 },
        { "ageGroup": "26-40", "count": 72 },
        { "ageGroup": "41-60", "count": 31 },
    ]))
}

#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub period: Option<String>,
}

/// Streams the report back as CSV rather than JSON.
async fn export_report(State(db): State<SharedDb>, Query(query): Query<ExportQuery>) -> Response {
    let db = db.read().await;
    let mut csv = format!(
        "# report={} period={}\nhospital,bloodType,unitsAvailable\n",
        query.report_type.as_deref().unwrap_or("inventory"),
        query.period.as_deref().unwrap_or("all"),
    );
    let mut ids: Vec<_> = db.stock.keys().copied().collect();
    ids.sort_unstable();
    for id in ids {
        let name = db.hospital_name(id).unwrap_or("unknown");
        for item in &db.stock[&id] {
            csv.push_str(&format!("{name},{},{}\n", item.blood_type, item.units_available));
        }
    }
    ([(header::CONTENT_TYPE, "text/csv")], csv).into_response()
}

// --- settings ---

async fn get_profile(State(db): State<SharedDb>) -> Json<Profile> {
    Json(db.read().await.profile.clone())
}

async fn update_profile(State(db): State<SharedDb>, JsonBody(profile): JsonBody<Profile>) -> Reply<Profile> {
    if !profile.email.contains('@') {
        return Err(Failure::bad_request("invalid email"));
    }
    let mut db = db.write().await;
    db.profile = profile;
    Ok(Json(db.profile.clone()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordBody {
    pub current_password: String,
    pub new_password: String,
}

async fn update_password(State(db): State<SharedDb>, JsonBody(body): JsonBody<PasswordBody>) -> Reply<Value> {
    let mut db = db.write().await;
    if body.current_password != db.password {
        return Err(Failure::bad_request("current password is incorrect"));
    }
    if body.new_password.len() < 8 {
        return Err(Failure::bad_request("new password must be at least 8 characters"));
    }
    db.password = body.new_password;
    Ok(Json(json!({ "success": true })))
}

async fn get_notifications(State(db): State<SharedDb>) -> Json<Notifications> {
    Json(db.read().await.notifications)
}

async fn update_notifications(
    State(db): State<SharedDb>,
    JsonBody(settings): JsonBody<Notifications>,
) -> Json<Notifications> {
    db.write().await.notifications = settings;
    Json(settings)
}
