use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use sovereign_core::audit::AuditLog;

use crate::error::AppError;
use crate::state::AppState;
use crate::user::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/audit-logs", get(list_audit_logs))
}

/// Decision resolutions and deletions, oldest first.
#[utoipa::path(
    get,
    path = "/api/audit-logs",
    responses((status = 200, description = "Audit trail of the current user", body = Vec<AuditLog>)),
    tag = "audit"
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    Ok(Json(state.storage.get_audit_logs_by_user(&user.id).await?))
}
