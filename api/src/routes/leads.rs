use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use sovereign_core::audit::{NewAuditLog, actions};
use sovereign_core::leads::{Lead, LeadPatch, NewLead};

use super::campaigns::owned_campaign;
use super::record_audit;
use crate::error::AppError;
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::user::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new()
        // same segment name as /api/campaigns/{id}
        .route("/api/campaigns/{id}/leads", get(list_campaign_leads))
        .route("/api/leads", get(list_leads).post(create_lead))
        .route(
            "/api/leads/{id}",
            get(get_lead).patch(update_lead).delete(delete_lead),
        )
}

/// Leads are owned through their campaign.
async fn owned_lead(state: &AppState, user: &CurrentUser, id: &str) -> Result<Lead, AppError> {
    let not_found = || AppError::not_found("Lead", id);
    let lead = state.storage.get_lead(id).await?.ok_or_else(not_found)?;
    let owned = state
        .storage
        .get_campaign(&lead.campaign_id)
        .await?
        .is_some_and(|c| user.owns(&c.user_id));
    if owned { Ok(lead) } else { Err(not_found()) }
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/leads",
    params(("id" = String, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Leads of the campaign", body = Vec<Lead>),
        (status = 404, description = "Campaign not found", body = sovereign_core::error::ApiError),
    ),
    tag = "leads"
)]
pub async fn list_campaign_leads(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(campaign_id): Path<String>,
) -> Result<Json<Vec<Lead>>, AppError> {
    owned_campaign(&state, &user, &campaign_id).await?;
    Ok(Json(state.storage.get_leads_by_campaign(&campaign_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/leads",
    responses((status = 200, description = "Leads across the user's campaigns", body = Vec<Lead>)),
    tag = "leads"
)]
pub async fn list_leads(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Lead>>, AppError> {
    Ok(Json(state.storage.get_leads_by_user(&user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    params(("id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead", body = Lead),
        (status = 404, description = "Lead not found", body = sovereign_core::error::ApiError),
    ),
    tag = "leads"
)]
pub async fn get_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Lead>, AppError> {
    Ok(Json(owned_lead(&state, &user, &id).await?))
}

/// Creates the lead and grows the parent campaign's waitlist by one.
#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = NewLead,
    responses(
        (status = 201, description = "Lead created", body = Lead),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
        (status = 404, description = "Campaign not found", body = sovereign_core::error::ApiError),
    ),
    tag = "leads"
)]
pub async fn create_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<NewLead>,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    owned_campaign(&state, &user, &body.campaign_id).await?;
    let campaign_id = body.campaign_id.clone();
    let lead = body.into_lead(sovereign_core::new_id(), Utc::now());
    let created = state
        .storage
        .create_lead(lead)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign", &campaign_id))?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch,
    path = "/api/leads/{id}",
    params(("id" = String, Path, description = "Lead id")),
    request_body = LeadPatch,
    responses(
        (status = 200, description = "Updated lead", body = Lead),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
        (status = 404, description = "Lead not found", body = sovereign_core::error::ApiError),
    ),
    tag = "leads"
)]
pub async fn update_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<LeadPatch>,
) -> Result<Json<Lead>, AppError> {
    owned_lead(&state, &user, &id).await?;
    let updated = state
        .storage
        .update_lead(&id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Lead", &id))?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    params(("id" = String, Path, description = "Lead id")),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 404, description = "Lead not found", body = sovereign_core::error::ApiError),
    ),
    tag = "leads"
)]
pub async fn delete_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let lead = owned_lead(&state, &user, &id).await?;
    if !state.storage.delete_lead(&id).await? {
        return Err(AppError::not_found("Lead", &id));
    }
    record_audit(
        state.storage.as_ref(),
        NewAuditLog::new(&user.id, actions::LEAD_DELETED, "lead", &id).with_details(json!({
            "campaignId": lead.campaign_id,
            "email": lead.email,
        })),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
