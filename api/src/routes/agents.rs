use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use sovereign_core::agents::{Agent, AgentPatch, NewAgent};
use sovereign_core::audit::{NewAuditLog, actions};

use super::record_audit;
use crate::error::AppError;
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::user::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/agents", get(list_agents).post(create_agent))
        .route(
            "/api/agents/{id}",
            get(get_agent).patch(update_agent).delete(delete_agent),
        )
}

async fn owned_agent(state: &AppState, user: &CurrentUser, id: &str) -> Result<Agent, AppError> {
    state
        .storage
        .get_agent(id)
        .await?
        .filter(|a| user.owns(&a.user_id))
        .ok_or_else(|| AppError::not_found("Agent", id))
}

#[utoipa::path(
    get,
    path = "/api/agents",
    responses((status = 200, description = "Agents of the current user", body = Vec<Agent>)),
    tag = "agents"
)]
pub async fn list_agents(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Agent>>, AppError> {
    Ok(Json(state.storage.get_agents_by_user(&user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/agents/{id}",
    params(("id" = String, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Agent", body = Agent),
        (status = 404, description = "Agent not found", body = sovereign_core::error::ApiError),
    ),
    tag = "agents"
)]
pub async fn get_agent(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Agent>, AppError> {
    Ok(Json(owned_agent(&state, &user, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/agents",
    request_body = NewAgent,
    responses(
        (status = 201, description = "Agent created", body = Agent),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
    ),
    tag = "agents"
)]
pub async fn create_agent(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<NewAgent>,
) -> Result<(StatusCode, Json<Agent>), AppError> {
    let agent = body.into_agent(sovereign_core::new_id(), user.id, Utc::now());
    let created = state.storage.create_agent(agent).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial update; pausing and resuming is a PATCH of `status`.
#[utoipa::path(
    patch,
    path = "/api/agents/{id}",
    params(("id" = String, Path, description = "Agent id")),
    request_body = AgentPatch,
    responses(
        (status = 200, description = "Updated agent", body = Agent),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
        (status = 404, description = "Agent not found", body = sovereign_core::error::ApiError),
    ),
    tag = "agents"
)]
pub async fn update_agent(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<AgentPatch>,
) -> Result<Json<Agent>, AppError> {
    owned_agent(&state, &user, &id).await?;
    let updated = state
        .storage
        .update_agent(&id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Agent", &id))?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/agents/{id}",
    params(("id" = String, Path, description = "Agent id")),
    responses(
        (status = 204, description = "Agent deleted"),
        (status = 404, description = "Agent not found", body = sovereign_core::error::ApiError),
    ),
    tag = "agents"
)]
pub async fn delete_agent(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let agent = owned_agent(&state, &user, &id).await?;
    if !state.storage.delete_agent(&id).await? {
        return Err(AppError::not_found("Agent", &id));
    }
    record_audit(
        state.storage.as_ref(),
        NewAuditLog::new(&user.id, actions::AGENT_DELETED, "agent", &id)
            .with_details(json!({ "name": agent.name, "role": agent.role })),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{DEMO_USER, app, send, state};

    #[tokio::test]
    async fn created_agent_round_trips_through_list() {
        let app = app(state());
        let body = json!({
            "name": "Inbox Sentinel",
            "role": "Email triage",
            "status": "Running",
            "uptime": "99.9%",
            "color": "text-emerald-400",
            "timeSaved": 240,
        });
        let (status, created) = send(&app, Method::POST, "/api/agents", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, list) = send(&app, Method::GET, "/api/agents", None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = &list[0];
        for field in ["name", "role", "status", "uptime", "color", "timeSaved"] {
            assert_eq!(listed[field], body[field], "{field}");
        }
        assert_eq!(listed["id"], created["id"]);
        assert_eq!(listed["userId"], DEMO_USER);
        assert!(listed["createdAt"].is_string());
    }

    #[tokio::test]
    async fn pause_is_a_status_patch() {
        let app = app(state());
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/agents",
            Some(json!({ "name": "Closer", "role": "Sales" })),
        )
        .await;
        assert_eq!(created["status"], "Running");
        let uri = format!("/api/agents/{}", created["id"].as_str().expect("id"));

        let (status, paused) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "Paused" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paused["status"], "Paused");
        assert_eq!(paused["name"], "Closer");
    }

    #[tokio::test]
    async fn patch_and_delete_of_unknown_agent_are_404() {
        let app = app(state());
        let (status, _) = send(&app, Method::PATCH, "/api/agents/ghost", Some(json!({ "timeSaved": 5 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, "/api/agents/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, list) = send(&app, Method::GET, "/api/agents", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn missing_role_is_named() {
        let app = app(state());
        let (status, body) = send(&app, Method::POST, "/api/agents", Some(json!({ "name": "Solo" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "role");
    }
}
