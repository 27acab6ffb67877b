use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use sovereign_core::time_entries::{DripSummary, NewTimeEntry, TimeEntry};

use crate::error::AppError;
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::user::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/time-entries",
            get(list_time_entries).post(create_time_entry),
        )
        .route("/api/time-entries/summary", get(time_summary))
}

#[utoipa::path(
    get,
    path = "/api/time-entries",
    responses((status = 200, description = "Time entries of the current user", body = Vec<TimeEntry>)),
    tag = "time"
)]
pub async fn list_time_entries(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TimeEntry>>, AppError> {
    Ok(Json(state.storage.get_time_entries_by_user(&user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/time-entries",
    request_body = NewTimeEntry,
    responses(
        (status = 201, description = "Time entry logged", body = TimeEntry),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
    ),
    tag = "time"
)]
pub async fn create_time_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<NewTimeEntry>,
) -> Result<(StatusCode, Json<TimeEntry>), AppError> {
    let entry = body
        .into_time_entry(sovereign_core::new_id(), user.id, Utc::now())
        .map_err(|e| AppError::field("category", e.to_string()))?;
    let created = state.storage.create_time_entry(entry).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Minutes logged per DRIP quadrant.
#[utoipa::path(
    get,
    path = "/api/time-entries/summary",
    responses((status = 200, description = "Minutes per DRIP category", body = DripSummary)),
    tag = "time"
)]
pub async fn time_summary(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DripSummary>, AppError> {
    let entries = state.storage.get_time_entries_by_user(&user.id).await?;
    Ok(Json(DripSummary::from_entries(&entries)))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{app, send, state};

    #[tokio::test]
    async fn summary_adds_up_logged_minutes() {
        let app = app(state());
        for (task, category, duration) in [
            ("Inbox zero", "replace", 30),
            ("Sales call with Acme", "produce", 45),
            ("Newsletter research", "delegate", 60),
            ("Follow-up email", "replace", 15),
        ] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/time-entries",
                Some(json!({ "task": task, "category": category, "duration": duration })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, summary) = send(&app, Method::GET, "/api/time-entries/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["replace"], 45);
        assert_eq!(summary["produce"], 45);
        assert_eq!(summary["delegate"], 60);
        assert_eq!(summary["invest"], 0);
        assert_eq!(summary["total"], 150);
    }

    #[tokio::test]
    async fn unknown_category_and_zero_duration_are_rejected() {
        let app = app(state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/time-entries",
            Some(json!({ "task": "Nap", "category": "rest", "duration": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["details"]
            .as_array()
            .expect("details")
            .iter()
            .filter_map(|d| d["field"].as_str())
            .collect();
        assert_eq!(fields, ["category", "duration"]);
    }
}
