use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use sovereign_core::contracts::{Contract, ContractPatch, NewContract};

use crate::error::AppError;
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::user::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contracts", get(list_contracts).post(create_contract))
        .route(
            "/api/contracts/{id}",
            get(get_contract).patch(update_contract),
        )
}

async fn owned_contract(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<Contract, AppError> {
    state
        .storage
        .get_contract(id)
        .await?
        .filter(|c| user.owns(&c.user_id))
        .ok_or_else(|| AppError::not_found("Contract", id))
}

#[utoipa::path(
    get,
    path = "/api/contracts",
    responses((status = 200, description = "Contracts of the current user", body = Vec<Contract>)),
    tag = "contracts"
)]
pub async fn list_contracts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Contract>>, AppError> {
    Ok(Json(state.storage.get_contracts_by_user(&user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    params(("id" = String, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract", body = Contract),
        (status = 404, description = "Contract not found", body = sovereign_core::error::ApiError),
    ),
    tag = "contracts"
)]
pub async fn get_contract(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Contract>, AppError> {
    Ok(Json(owned_contract(&state, &user, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/contracts",
    request_body = NewContract,
    responses(
        (status = 201, description = "Contract created", body = Contract),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
    ),
    tag = "contracts"
)]
pub async fn create_contract(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<NewContract>,
) -> Result<(StatusCode, Json<Contract>), AppError> {
    let contract = body.into_contract(sovereign_core::new_id(), user.id, Utc::now());
    let created = state.storage.create_contract(contract).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch,
    path = "/api/contracts/{id}",
    params(("id" = String, Path, description = "Contract id")),
    request_body = ContractPatch,
    responses(
        (status = 200, description = "Updated contract", body = Contract),
        (status = 400, description = "Invalid payload", body = sovereign_core::error::ApiError),
        (status = 404, description = "Contract not found", body = sovereign_core::error::ApiError),
    ),
    tag = "contracts"
)]
pub async fn update_contract(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<ContractPatch>,
) -> Result<Json<Contract>, AppError> {
    owned_contract(&state, &user, &id).await?;
    let updated = state
        .storage
        .update_contract(&id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Contract", &id))?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{app, send, state};

    #[tokio::test]
    async fn contract_defaults_to_pending_and_can_be_marked_paid() {
        let app = app(state());
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/contracts",
            Some(json!({ "clientName": "Acme", "amount": 450000 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");
        assert!(created["sentAt"].is_string());

        let uri = format!("/api/contracts/{}", created["id"].as_str().expect("id"));
        let (status, paid) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "paid" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["status"], "paid");
        assert_eq!(paid["amount"], 450000);
    }

    #[tokio::test]
    async fn patch_of_unknown_contract_is_404() {
        let app = app(state());
        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/contracts/ghost",
            Some(json!({ "amount": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, list) = send(&app, Method::GET, "/api/contracts", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn missing_client_name_is_named() {
        let app = app(state());
        let (status, body) = send(&app, Method::POST, "/api/contracts", Some(json!({ "amount": 10 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "clientName");
    }
}
