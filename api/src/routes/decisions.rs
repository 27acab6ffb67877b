use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sovereign_core::audit::{NewAuditLog, actions};
use sovereign_core::decisions::{
    ApproveDecision, Decision, DecisionPatch, DecisionResolution, NewDecision, STATUS_PENDING,
};

use super::record_audit;
use crate::error::AppError;
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::user::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/decisions", get(list_decisions).post(create_decision))
        .route(
            "/api/decisions/{id}",
            get(get_decision).patch(update_decision),
        )
        .route("/api/decisions/{id}/approve", post(approve_decision))
        .route("/api/decisions/{id}/reject", post(reject_decision))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DecisionQuery {
    /// Only decisions with this status
    pub status: Option<String>,
}

async fn owned_decision(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<Decision, AppError> {
    state
        .storage
        .get_decision(id)
        .await?
        .filter(|d| user.owns(&d.user_id))
        .ok_or_else(|| AppError::not_found("Decision", id))
}

fn not_pending(decision: &Decision) -> AppError {
    AppError::Conflict {
        message: format!(
            "Decision {} is already {}; only pending decisions can be resolved",
            decision.id, decision.status
        ),
    }
}

#[utoipa::path(
    get,
    path = "/api/decisions",
    params(DecisionQuery),
    responses((status = 200, description = "Decisions of the current user", body = Vec<Decision>)),
    tag = "decisions"
)]
pub async fn list_decisions(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<DecisionQuery>,
) -> Result<Json<Vec<Decision>>, AppError> {
    let decisions = match query.status.as_deref() {
        Some(STATUS_PENDING) => state.storage.get_pending_decisions(&user.id).await?,
        Some(status) => state
            .storage
            .get_decisions_by_user(&user.id)
            .await?
            .into_iter()
            .filter(|d| d.status == status)
            .collect(),
        None => state.storage.get_decisions_by_user(&user.id).await?,
    };
    Ok(Json(decisions))
}

#[utoipa::path(
    get,
    path = "/api/decisions/{id}",
    params(("id" = String, Path, description = "Decision id")),
    responses(
        (status = 200, description = "Decision", body = Decision),
        (status = 404, description = "Decision not found", body = sovereign_core::error::ApiError),
    ),
    tag = "decisions"
)]
pub async fn get_decision(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Decision>, AppError> {
    Ok(Json(owned_decision(&state, &user, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/decisions",
    request_body = NewDecision,
    responses(
        (status = 201, description = "Decision created", body = Decision),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
    ),
    tag = "decisions"
)]
pub async fn create_decision(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<NewDecision>,
) -> Result<(StatusCode, Json<Decision>), AppError> {
    if let Some(agent_id) = body.agent_id.as_deref() {
        let known = state
            .storage
            .get_agent(agent_id)
            .await?
            .is_some_and(|a| user.owns(&a.user_id));
        if !known {
            return Err(AppError::field("agentId", format!("agent {agent_id} does not exist")));
        }
    }
    let decision = body.into_decision(sovereign_core::new_id(), user.id, Utc::now());
    let created = state.storage.create_decision(decision).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial update. The merged options and recommendation are re-checked, so
/// a patch can never leave the recommendation pointing past the options.
/// Once resolved, only descriptive fields may change.
#[utoipa::path(
    patch,
    path = "/api/decisions/{id}",
    params(("id" = String, Path, description = "Decision id")),
    request_body = DecisionPatch,
    responses(
        (status = 200, description = "Updated decision", body = Decision),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
        (status = 404, description = "Decision not found", body = sovereign_core::error::ApiError),
        (status = 409, description = "Decision is already resolved", body = sovereign_core::error::ApiError),
    ),
    tag = "decisions"
)]
pub async fn update_decision(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<DecisionPatch>,
) -> Result<Json<Decision>, AppError> {
    let current = owned_decision(&state, &user, &id).await?;
    if patch.is_empty() {
        return Ok(Json(current));
    }
    if !current.is_pending() && patch.touches_resolution() {
        return Err(AppError::Conflict {
            message: format!(
                "Decision {} is already {}; its options, recommendation and status are final",
                current.id, current.status
            ),
        });
    }

    let mut merged = current;
    patch.clone().apply(&mut merged);
    let issues = merged.option_issues();
    if !issues.is_empty() {
        return Err(AppError::validation(issues));
    }

    let updated = state
        .storage
        .update_decision(&id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Decision", &id))?;
    Ok(Json(updated))
}

/// Approves a pending decision. The body is optional; without `optionIndex`
/// the recommended option is chosen.
#[utoipa::path(
    post,
    path = "/api/decisions/{id}/approve",
    params(("id" = String, Path, description = "Decision id")),
    request_body(content = ApproveDecision, description = "Optional chosen option"),
    responses(
        (status = 200, description = "Approved decision", body = Decision),
        (status = 400, description = "Option out of range", body = sovereign_core::error::ApiError),
        (status = 404, description = "Decision not found", body = sovereign_core::error::ApiError),
        (status = 409, description = "Decision is not pending", body = sovereign_core::error::ApiError),
    ),
    tag = "decisions"
)]
pub async fn approve_decision(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Decision>, AppError> {
    let request = parse_approve_body(&body)?;
    let decision = owned_decision(&state, &user, &id).await?;
    if !decision.is_pending() {
        return Err(not_pending(&decision));
    }

    let resolution = DecisionResolution::approve(&decision, request.option_index, Utc::now())
        .map_err(|issue| AppError::validation(vec![issue]))?;
    let resolved = state
        .storage
        .resolve_decision(&id, &resolution)
        .await?
        .ok_or_else(|| not_pending(&decision))?;

    let chosen = resolution
        .chosen_option
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| resolved.options.get(i))
        .map(|o| o.label.clone());
    tracing::info!(
        decision_id = %id,
        chosen_option = ?resolution.chosen_option,
        "decision approved"
    );
    record_audit(
        state.storage.as_ref(),
        NewAuditLog::new(&user.id, actions::DECISION_APPROVED, "decision", &id).with_details(
            json!({
                "chosenOption": resolution.chosen_option,
                "label": chosen,
                "followedRecommendation": resolution.chosen_option == Some(decision.recommendation),
            }),
        ),
    )
    .await?;
    Ok(Json(resolved))
}

#[utoipa::path(
    post,
    path = "/api/decisions/{id}/reject",
    params(("id" = String, Path, description = "Decision id")),
    responses(
        (status = 200, description = "Rejected decision", body = Decision),
        (status = 404, description = "Decision not found", body = sovereign_core::error::ApiError),
        (status = 409, description = "Decision is not pending", body = sovereign_core::error::ApiError),
    ),
    tag = "decisions"
)]
pub async fn reject_decision(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Decision>, AppError> {
    let decision = owned_decision(&state, &user, &id).await?;
    if !decision.is_pending() {
        return Err(not_pending(&decision));
    }

    let resolution = DecisionResolution::reject(Utc::now());
    let resolved = state
        .storage
        .resolve_decision(&id, &resolution)
        .await?
        .ok_or_else(|| not_pending(&decision))?;

    tracing::info!(decision_id = %id, "decision rejected");
    record_audit(
        state.storage.as_ref(),
        NewAuditLog::new(&user.id, actions::DECISION_REJECTED, "decision", &id)
            .with_details(json!({ "title": decision.title })),
    )
    .await?;
    Ok(Json(resolved))
}

fn parse_approve_body(body: &Bytes) -> Result<ApproveDecision, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApproveDecision::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::field("optionIndex", e.to_string()))
}
