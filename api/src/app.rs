use std::any::Any;

use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::error::AppError;
use crate::middleware;
use crate::routes;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sovereign OS API",
        version = "0.1.0",
        description = "Founder operating system: campaigns, agents, 1:3:1 decisions, DRIP time tracking and AI assistance."
    ),
    paths(
        routes::health::health_check,
        routes::campaigns::list_campaigns,
        routes::campaigns::get_campaign,
        routes::campaigns::create_campaign,
        routes::campaigns::update_campaign,
        routes::leads::list_campaign_leads,
        routes::leads::list_leads,
        routes::leads::get_lead,
        routes::leads::create_lead,
        routes::leads::update_lead,
        routes::leads::delete_lead,
        routes::agents::list_agents,
        routes::agents::get_agent,
        routes::agents::create_agent,
        routes::agents::update_agent,
        routes::agents::delete_agent,
        routes::decisions::list_decisions,
        routes::decisions::get_decision,
        routes::decisions::create_decision,
        routes::decisions::update_decision,
        routes::decisions::approve_decision,
        routes::decisions::reject_decision,
        routes::contracts::list_contracts,
        routes::contracts::get_contract,
        routes::contracts::create_contract,
        routes::contracts::update_contract,
        routes::time_entries::list_time_entries,
        routes::time_entries::create_time_entry,
        routes::time_entries::time_summary,
        routes::dashboard::dashboard_stats,
        routes::audit::list_audit_logs,
        routes::ai::chat,
        routes::ai::chat_stream,
        routes::ai::analyze_drip,
        routes::ai::email_replies,
        routes::ai::get_history,
        routes::ai::clear_history,
        routes::ai::triage_email,
        routes::ai::build_dossier,
        routes::ai::analyze_call,
        routes::ai::draft_proposal,
        routes::ai::repurpose_content,
    ),
    components(schemas(
        sovereign_core::error::ApiError,
        sovereign_core::validation::FieldIssue,
        sovereign_core::campaigns::Campaign,
        sovereign_core::campaigns::NewCampaign,
        sovereign_core::campaigns::CampaignPatch,
        sovereign_core::leads::Lead,
        sovereign_core::leads::NewLead,
        sovereign_core::leads::LeadPatch,
        sovereign_core::agents::Agent,
        sovereign_core::agents::NewAgent,
        sovereign_core::agents::AgentPatch,
        sovereign_core::decisions::Decision,
        sovereign_core::decisions::DecisionOption,
        sovereign_core::decisions::NewDecision,
        sovereign_core::decisions::DecisionPatch,
        sovereign_core::decisions::ApproveDecision,
        sovereign_core::contracts::Contract,
        sovereign_core::contracts::NewContract,
        sovereign_core::contracts::ContractPatch,
        sovereign_core::time_entries::TimeEntry,
        sovereign_core::time_entries::NewTimeEntry,
        sovereign_core::time_entries::DripSummary,
        sovereign_core::drip::DripCategory,
        sovereign_core::drip::DripAnalysis,
        sovereign_core::dashboard::DashboardStats,
        sovereign_core::audit::AuditLog,
        crate::ai::ChatMessage,
        crate::ai::inbox_sentinel::EmailAnalysis,
        crate::ai::inbox_sentinel::ReplyOption,
        crate::ai::inbox_sentinel::ReplyOptions,
        crate::ai::dossier::Prospect,
        crate::ai::dossier::ProspectDossier,
        crate::ai::closer::DealStage,
        crate::ai::closer::CallAnalysisRequest,
        crate::ai::closer::CallAnalysis,
        crate::ai::closer::ProposalRequest,
        crate::ai::closer::ProposalDraft,
        crate::ai::content_alchemist::RepurposeRequest,
        crate::ai::content_alchemist::ContentPiece,
        routes::ai::ChatRequest,
        routes::ai::ChatResponse,
        routes::ai::DripRequest,
        routes::ai::EmailRequest,
        routes::ai::StreamFrame,
    )),
    tags(
        (name = "system", description = "Liveness"),
        (name = "campaigns", description = "Launch campaigns and their waitlists"),
        (name = "leads", description = "Leads captured by campaigns"),
        (name = "agents", description = "The founder's AI workforce"),
        (name = "decisions", description = "1:3:1 decisions awaiting approval"),
        (name = "contracts", description = "Client contracts"),
        (name = "time", description = "DRIP time tracking"),
        (name = "dashboard", description = "Aggregate statistics"),
        (name = "audit", description = "Audit trail"),
        (name = "ai", description = "Chat, streaming and specialist agents"),
    )
)]
pub struct ApiDoc;

/// Full application router with every layer applied.
pub fn build_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    let ai = routes::ai::router();
    let ai = match state.config.rate_limit.then(middleware::rate_limit::ai_layer).flatten() {
        Some(limit) => ai.layer(limit),
        None => ai,
    };

    Router::new()
        .route("/api-doc/openapi.json", get(openapi_json))
        .merge(routes::health::router())
        .merge(routes::campaigns::router())
        .merge(routes::leads::router())
        .merge(routes::agents::router())
        .merge(routes::decisions::router())
        .merge(routes::contracts::router())
        .merge(routes::time_entries::router())
        .merge(routes::dashboard::router())
        .merge(routes::audit::router())
        .merge(ai)
        .layer(axum::middleware::from_fn(middleware::security_headers::apply))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(middleware::cors::build_cors_layer(&state.config.cors_origins)),
        )
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::routes::test_support::{app, send, send_raw, state};

    #[tokio::test]
    async fn openapi_lists_routes() {
        let app = app(state());
        let (status, doc) = send(&app, Method::GET, "/api-doc/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/api/decisions/{id}/approve"].is_object());
        assert!(doc["paths"]["/api/ai/chat/stream"].is_object());
        assert!(doc["components"]["schemas"]["Decision"].is_object());
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = app(state());
        let (_, headers, _) = send_raw(&app, Method::GET, "/health", None).await;
        assert!(headers.get("x-request-id").is_some());
        assert_eq!(
            headers
                .get("x-content-type-options")
                .expect("security headers should be applied"),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = app(state());
        let (status, _, _) = send_raw(&app, Method::GET, "/api/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
