use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use sovereign_core::campaigns::{Campaign, CampaignPatch, NewCampaign};

use crate::error::AppError;
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::user::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/campaigns", get(list_campaigns).post(create_campaign))
        .route(
            "/api/campaigns/{id}",
            get(get_campaign).patch(update_campaign),
        )
}

/// Campaign by id, or 404 when it is missing or owned by someone else.
pub(crate) async fn owned_campaign(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<Campaign, AppError> {
    state
        .storage
        .get_campaign(id)
        .await?
        .filter(|c| user.owns(&c.user_id))
        .ok_or_else(|| AppError::not_found("Campaign", id))
}

#[utoipa::path(
    get,
    path = "/api/campaigns",
    responses((status = 200, description = "Campaigns of the current user", body = Vec<Campaign>)),
    tag = "campaigns"
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Campaign>>, AppError> {
    Ok(Json(state.storage.get_campaigns_by_user(&user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}",
    params(("id" = String, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Campaign", body = Campaign),
        (status = 404, description = "Campaign not found", body = sovereign_core::error::ApiError),
    ),
    tag = "campaigns"
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Campaign>, AppError> {
    Ok(Json(owned_campaign(&state, &user, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/campaigns",
    request_body = NewCampaign,
    responses(
        (status = 201, description = "Campaign created", body = Campaign),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
    ),
    tag = "campaigns"
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<NewCampaign>,
) -> Result<(StatusCode, Json<Campaign>), AppError> {
    let campaign = body.into_campaign(sovereign_core::new_id(), user.id, Utc::now());
    let created = state.storage.create_campaign(campaign).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch,
    path = "/api/campaigns/{id}",
    params(("id" = String, Path, description = "Campaign id")),
    request_body = CampaignPatch,
    responses(
        (status = 200, description = "Updated campaign", body = Campaign),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
        (status = 404, description = "Campaign not found", body = sovereign_core::error::ApiError),
    ),
    tag = "campaigns"
)]
pub async fn update_campaign(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<CampaignPatch>,
) -> Result<Json<Campaign>, AppError> {
    owned_campaign(&state, &user, &id).await?;
    let updated = state
        .storage
        .update_campaign(&id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign", &id))?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{DEMO_USER, app, send, state};

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let app = app(state());
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/campaigns",
            Some(json!({ "name": "Founders Circle", "goalMembers": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["userId"], DEMO_USER);
        assert_eq!(created["status"], "active");
        assert_eq!(created["waitlistSize"], 0);

        let id = created["id"].as_str().expect("id");
        let (status, fetched) = send(&app, Method::GET, &format!("/api/campaigns/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn missing_required_field_names_it() {
        let app = app(state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/campaigns",
            Some(json!({ "name": "No goal" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["details"][0]["field"], "goalMembers");
    }

    #[tokio::test]
    async fn patch_of_unknown_id_is_404_and_creates_nothing() {
        let app = app(state());
        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/campaigns/does-not-exist",
            Some(json!({ "name": "Ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = send(&app, Method::GET, "/api/campaigns", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn patch_rejects_unknown_and_mistyped_fields() {
        let app = app(state());
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/campaigns",
            Some(json!({ "name": "Circle", "goalMembers": 10 })),
        )
        .await;
        let uri = format!("/api/campaigns/{}", created["id"].as_str().expect("id"));

        let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "userId": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "userId");

        let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "goalMembers": "many" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, updated) = send(&app, Method::PATCH, &uri, Some(json!({ "currentMembers": 12 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["currentMembers"], 12);
        assert_eq!(updated["name"], "Circle");
    }

    #[tokio::test]
    async fn other_users_campaigns_are_hidden() {
        let state = state();
        let foreign = NewCampaign {
            name: "Theirs".into(),
            goal_members: 5,
            current_members: 0,
            total_revenue: 0,
            conversion_rate: "0".into(),
            waitlist_size: 0,
            status: "active".into(),
        }
        .into_campaign("c-other".into(), "someone-else".into(), Utc::now());
        state
            .storage
            .create_campaign(foreign)
            .await
            .expect("insert campaign");

        let app = app(state);
        let (status, _) = send(&app, Method::GET, "/api/campaigns/c-other", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, list) = send(&app, Method::GET, "/api/campaigns", None).await;
        assert_eq!(list, json!([]));
    }
}
