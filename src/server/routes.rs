use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{Datelike, Local};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::MutexGuard;

use crate::db::repository::{HabitRepo, MealRepo, date_key};
use crate::models::{
    DayTimes, Entry, EveningCheck, HabitStatus, MealSlot, MorningSummary, PrayerName, Reminder,
    day_plan, is_workout_day, weekday_name,
};
use crate::notify::Outbox;
use crate::prayer_times::schedule;
use crate::server::AppState;

/// JSON error envelope: `{"error": ...}` with the mapped status code.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn db_err(err: anyhow::Error) -> ApiError {
    log::error!("Database error: {:#}", err);
    ApiError::internal("Database error")
}

fn lock(state: &AppState) -> Result<MutexGuard<'_, rusqlite::Connection>, ApiError> {
    state
        .conn
        .lock()
        .map_err(|_| ApiError::internal("Database lock poisoned"))
}

/// The `secret` query parameter must match CRON_SECRET. A missing server
/// secret is a configuration error, not an authorization failure.
fn authorize(state: &AppState, secret: Option<&str>) -> Result<(), ApiError> {
    match state.cron_secret.as_deref() {
        None => Err(ApiError::internal("CRON_SECRET is not configured")),
        Some(expected) if secret == Some(expected) => Ok(()),
        Some(_) => Err(ApiError::unauthorized()),
    }
}

/// Today's times for `city`, served from the cache when present. The lock is
/// released before the upstream call and re-taken to store the result.
async fn day_times(state: &AppState, city: &str) -> Result<DayTimes, ApiError> {
    let today = Local::now().date_naive();

    let cached = {
        let conn = lock(state)?;
        crate::db::repository::CacheRepo::get(&conn, today, city).map_err(db_err)?
    };
    if let Some(times) = cached {
        return Ok(times);
    }

    let fetched = state
        .prayers
        .timings_by_city(
            city,
            &state.config.location.country,
            state.config.location.method,
            today,
        )
        .await
        .map_err(|err| {
            log::error!("Prayer times fetch failed: {:#}", err);
            ApiError::internal("Failed to fetch prayer times")
        })?;

    {
        let conn = lock(state)?;
        crate::db::repository::CacheRepo::store(&conn, city, &fetched).map_err(db_err)?;
    }
    Ok(fetched)
}

fn outbox(state: &AppState) -> Result<Outbox, ApiError> {
    Outbox::from_env(state.config.reminders.channel)
        .map_err(|err| ApiError::internal(err.to_string()))
}

fn fmt(t: chrono::NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

// ─── Handlers ────────────────────────────────────────────────────────────────

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct PlaceQuery {
    pub city: Option<String>,
    pub country: Option<String>,
}

/// GET /api/prayer-times - today's timings for a city, cache-through.
pub async fn prayer_times(
    State(state): State<AppState>,
    Query(query): Query<PlaceQuery>,
) -> Result<Json<Value>, ApiError> {
    let city = query
        .city
        .unwrap_or_else(|| state.config.location.city.clone());
    let times = day_times(&state, &city).await?;

    let mut timings = serde_json::Map::new();
    for (prayer, start) in times.entries() {
        timings.insert(prayer.display_name().to_string(), json!(fmt(start)));
    }
    timings.insert("Midnight".into(), json!(fmt(times.midnight)));

    Ok(Json(json!({
        "success": true,
        "date": date_key(times.date),
        "city": city,
        "timings": timings,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CronQuery {
    pub secret: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

impl CronQuery {
    fn phone(&self) -> Result<&str, ApiError> {
        self.phone
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::bad_request("Phone number required"))
    }

    fn city_or<'a>(&'a self, state: &'a AppState) -> &'a str {
        self.city.as_deref().unwrap_or(&state.config.location.city)
    }
}

/// GET /api/cron/prayer-check - fires when a prayer is 8 to 12 minutes out.
/// Meant to be polled roughly every 5 minutes by an external scheduler.
pub async fn prayer_check(
    State(state): State<AppState>,
    Query(query): Query<CronQuery>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, query.secret.as_deref())?;
    let phone = query.phone()?.to_string();

    let times = day_times(&state, query.city_or(&state)).await?;
    let now = Local::now().time();

    let Some(prayer) = schedule::reminder_due(&times, now) else {
        return Ok(Json(json!({
            "success": true,
            "sent": false,
            "message": "No prayer coming up in the next 10 minutes",
        })));
    };

    let time = fmt(times.start(prayer));
    let reminder = Reminder::Prayer { prayer, time: time.clone() };
    outbox(&state)?
        .deliver(&phone, &reminder)
        .await
        .map_err(|err| ApiError::internal(err.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "sent": true,
        "prayer": prayer.display_name(),
        "time": time,
    })))
}

/// GET /api/cron/morning-summary - the 6:00 digest: prayer times, meals,
/// habits and whether today is a workout day.
pub async fn morning_summary(
    State(state): State<AppState>,
    Query(query): Query<CronQuery>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, query.secret.as_deref())?;
    let phone = query.phone()?.to_string();

    let times = day_times(&state, query.city_or(&state)).await?;
    let today = Local::now().date_naive();

    let prayers = PrayerName::reminded()
        .into_iter()
        .map(|p| Entry::new(p.display_name(), fmt(times.start(p))))
        .collect();

    let (meals, habits) = {
        let conn = lock(&state)?;
        let plan = day_plan(today);
        let mut meals = Vec::new();
        for slot in MealSlot::all() {
            if let Some(recipe) = MealRepo::by_id(&conn, plan.recipe_id(slot)).map_err(db_err)? {
                meals.push(Entry::new(slot.display_name(), recipe.name));
            }
        }
        let habits = HabitRepo::active(&conn)
            .map_err(db_err)?
            .into_iter()
            .map(|h| h.name)
            .collect::<Vec<_>>();
        (meals, habits)
    };

    let workout = is_workout_day(&state.config.workout.days, weekday_name(today.weekday()))
        .then(|| "Workout day!".to_string());

    let reminder = Reminder::Morning(MorningSummary {
        prayers,
        meals,
        habits,
        workout,
    });
    outbox(&state)?
        .deliver(&phone, &reminder)
        .await
        .map_err(|err| ApiError::internal(err.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Morning summary sent",
    })))
}

#[derive(Debug, Deserialize)]
pub struct EveningBody {
    pub habits: Vec<HabitStatus>,
}

/// GET /api/cron/evening-check - the 21:00 habit recap from stored state.
pub async fn evening_check(
    State(state): State<AppState>,
    Query(query): Query<CronQuery>,
) -> Result<Json<Value>, ApiError> {
    run_evening_check(state, query, None).await
}

/// POST variant; the body may carry a habit snapshot that overrides the
/// stored one.
pub async fn evening_check_post(
    State(state): State<AppState>,
    Query(query): Query<CronQuery>,
    body: Option<Json<EveningBody>>,
) -> Result<Json<Value>, ApiError> {
    run_evening_check(state, query, body.map(|Json(b)| b.habits)).await
}

async fn run_evening_check(
    state: AppState,
    query: CronQuery,
    override_habits: Option<Vec<HabitStatus>>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, query.secret.as_deref())?;
    let phone = query.phone()?.to_string();

    let snapshot = match override_habits {
        Some(habits) => habits,
        None => {
            let conn = lock(&state)?;
            let today = date_key(Local::now().date_naive());
            HabitRepo::snapshot(&conn, &today).map_err(db_err)?
        }
    };

    let total = snapshot.len();
    let completed = snapshot.iter().filter(|h| h.completed).count();
    let missing: Vec<String> = snapshot
        .iter()
        .filter(|h| !h.completed)
        .map(|h| h.name.clone())
        .collect();

    let reminder = Reminder::Evening(EveningCheck {
        completed,
        total,
        missing: missing.clone(),
    });
    outbox(&state)?
        .deliver(&phone, &reminder)
        .await
        .map_err(|err| ApiError::internal(err.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "completed": completed,
        "total": total,
        "missing": missing,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// POST /api/send - manual send of any message kind. The body is the same
/// `{type, data}` envelope the Reminder union serializes to, plus `to`.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let failure = |status: StatusCode, error: String| {
        (status, Json(json!({ "success": false, "error": error })))
    };

    let Some(to) = body.to.filter(|t| !t.is_empty()) else {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Missing required field: to".into(),
        ));
    };

    let reminder: Reminder =
        serde_json::from_value(json!({ "type": body.kind, "data": body.data }))
            .map_err(|err| failure(StatusCode::BAD_REQUEST, format!("Bad message: {}", err)))?;

    let outbox = Outbox::from_env(state.config.reminders.channel)
        .map_err(|err| failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    match outbox.deliver(&to, &reminder).await {
        Ok(()) => Ok(Json(json!({ "success": true, "message": "Message sent" }))),
        Err(err) => {
            log::error!("Manual send failed: {}", err);
            Err(failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::migrations::run_migrations;
    use crate::prayer_times::AladhanClient;
    use crate::server::{AppState, app};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    fn test_state(secret: Option<&str>) -> AppState {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        AppState {
            conn: Arc::new(Mutex::new(conn)),
            config: Arc::new(AppConfig::default()),
            prayers: AladhanClient::new(),
            cron_secret: secret.map(String::from),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let response = app(test_state(Some("s3cret")))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("ok"));
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let response = app(test_state(Some("s3cret")))
            .oneshot(
                Request::builder()
                    .uri("/api/cron/prayer-check?secret=nope&phone=%2B491701234567")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("error"));
    }

    #[tokio::test]
    async fn missing_secret_env_is_a_server_error() {
        let response = app(test_state(None))
            .oneshot(
                Request::builder()
                    .uri("/api/cron/evening-check?secret=anything&phone=%2B491701234567")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("CRON_SECRET"));
    }

    #[tokio::test]
    async fn missing_phone_is_a_bad_request() {
        let response = app(test_state(Some("s3cret")))
            .oneshot(
                Request::builder()
                    .uri("/api/cron/evening-check?secret=s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Phone number required"));
    }

    #[tokio::test]
    async fn send_without_destination_is_rejected() {
        let response = app(test_state(Some("s3cret")))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/send")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"type":"quran"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = body_text(response).await;
        assert!(text.contains("\"success\":false"));
        assert!(text.contains("to"));
    }

    #[tokio::test]
    async fn send_with_unknown_kind_is_rejected() {
        let response = app(test_state(Some("s3cret")))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/send")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"to":"+491701234567","type":"pigeon","data":{}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Bad message"));
    }
}
