use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use sovereign_core::dashboard::DashboardStats;

use crate::error::AppError;
use crate::state::AppState;
use crate::user::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard/stats", get(dashboard_stats))
}

/// Aggregates computed on every request; nothing is cached.
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses((status = 200, description = "Dashboard aggregates", body = DashboardStats)),
    tag = "dashboard"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardStats>, AppError> {
    let (campaigns, agents, pending, contracts) = tokio::try_join!(
        state.storage.get_campaigns_by_user(&user.id),
        state.storage.get_agents_by_user(&user.id),
        state.storage.get_pending_decisions(&user.id),
        state.storage.get_contracts_by_user(&user.id),
    )?;
    Ok(Json(DashboardStats::compute(
        &campaigns, &agents, &pending, &contracts,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send, state};

    #[tokio::test]
    async fn time_saved_is_the_exact_sum_over_agents() {
        let app = app(state());
        for (name, status, saved) in [("A", "Running", 120), ("B", "Paused", 45), ("C", "running", 7)] {
            send(
                &app,
                Method::POST,
                "/api/agents",
                Some(json!({ "name": name, "role": "r", "status": status, "timeSaved": saved })),
            )
            .await;
        }
        send(
            &app,
            Method::POST,
            "/api/contracts",
            Some(json!({ "clientName": "Acme", "amount": 1000, "status": "signed" })),
        )
        .await;
        send(
            &app,
            Method::POST,
            "/api/contracts",
            Some(json!({ "clientName": "Globex", "amount": 500, "status": "paid" })),
        )
        .await;

        let (status, stats) = send(&app, Method::GET, "/api/dashboard/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalTimeSaved"], 172);
        assert_eq!(stats["totalAgents"], 3);
        assert_eq!(stats["activeAgents"], 2);
        assert_eq!(stats["activeContracts"], 1);
        assert_eq!(stats["pipelineValue"], 1000);
        assert_eq!(stats["pendingDecisions"], 0);
    }
}
