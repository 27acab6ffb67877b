use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use sovereign_core::drip::DripAnalysis;
use sovereign_core::validation::{FieldIssue, Validate, require_non_empty};

use crate::ai::closer::{CallAnalysis, CallAnalysisRequest, CloserAgent, ProposalDraft, ProposalRequest};
use crate::ai::content_alchemist::{ContentAlchemistAgent, ContentPiece, RepurposeRequest};
use crate::ai::dossier::{DossierAgent, Prospect, ProspectDossier};
use crate::ai::inbox_sentinel::{EmailAnalysis, InboxSentinelAgent, ReplyOptions};
use crate::ai::ChatMessage;
use crate::config::StreamDelay;
use crate::error::AppError;
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::user::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ai/chat", post(chat))
        .route("/api/ai/chat/stream", post(chat_stream))
        .route("/api/ai/analyze-drip", post(analyze_drip))
        .route("/api/ai/email-replies", post(email_replies))
        .route(
            "/api/ai/history/{session_id}",
            get(get_history).delete(clear_history),
        )
        .route("/api/ai/agents/inbox-sentinel/triage", post(triage_email))
        .route("/api/ai/agents/dossier", post(build_dossier))
        .route("/api/ai/agents/closer/analyze-call", post(analyze_call))
        .route("/api/ai/agents/closer/proposal", post(draft_proposal))
        .route(
            "/api/ai/agents/content-alchemist/repurpose",
            post(repurpose_content),
        )
}

// --- Request / response types ---

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(default)]
    pub agent_type: Option<String>,
}

impl Validate for ChatRequest {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "message", &self.message);
        require_non_empty(&mut issues, "sessionId", &self.session_id);
        issues
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DripRequest {
    pub task_description: String,
}

impl Validate for DripRequest {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "taskDescription", &self.task_description);
        issues
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub email_content: String,
}

impl Validate for EmailRequest {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "emailContent", &self.email_content);
        issues
    }
}

/// One SSE `data:` payload.
#[derive(Debug, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct StreamFrame {
    /// "chunk", "complete" or "error"
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl StreamFrame {
    fn new(kind: &str, content: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            content: content.into(),
        }
    }

    fn into_event(self) -> Event {
        Event::default().data(serde_json::to_string(&self).unwrap_or_default())
    }
}

/// Word-sized pieces of `text`; every piece but the last keeps its trailing
/// space, so concatenating them gives back `text` exactly.
pub fn word_chunks(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split(' ').collect();
    let last = words.len().saturating_sub(1);
    words
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            if i < last {
                format!("{word} ")
            } else {
                word.to_string()
            }
        })
        .collect()
}

fn frames(
    reply: Result<String, String>,
    delay: StreamDelay,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        match reply {
            Ok(text) => {
                for chunk in word_chunks(&text) {
                    let pause = delay.pick();
                    if pause > Duration::ZERO {
                        tokio::time::sleep(pause).await;
                    }
                    yield Ok(StreamFrame::new("chunk", chunk).into_event());
                }
                yield Ok(StreamFrame::new("complete", text).into_event());
            }
            Err(message) => {
                yield Ok(StreamFrame::new("error", message).into_event());
            }
        }
    }
}

// --- Handlers ---

/// Chat sessions are private to the user who opened them.
fn session_key(user: &CurrentUser, session_id: &str) -> String {
    format!("{}:{session_id}", user.id)
}

#[utoipa::path(
    post,
    path = "/api/ai/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Missing message or sessionId", body = sovereign_core::error::ApiError),
    ),
    tag = "ai"
)]
pub async fn chat(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let key = session_key(&user, &body.session_id);
    let reply = state
        .ai
        .chat(&key, &body.message, body.agent_type.as_deref())
        .await?;
    Ok(Json(ChatResponse {
        response: reply.into_text(),
        session_id: body.session_id,
    }))
}

/// Same as `/api/ai/chat`, delivered word by word over Server-Sent Events.
/// The reply is produced in full before the first frame is sent.
#[utoipa::path(
    post,
    path = "/api/ai/chat/stream",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "SSE stream of StreamFrame payloads", content_type = "text/event-stream", body = StreamFrame),
        (status = 400, description = "Missing message or sessionId", body = sovereign_core::error::ApiError),
    ),
    tag = "ai"
)]
pub async fn chat_stream(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let key = session_key(&user, &body.session_id);
    let reply = state
        .ai
        .chat(&key, &body.message, body.agent_type.as_deref())
        .await
        .map(|generation| generation.into_text())
        .map_err(|err| {
            tracing::error!(session_id = %body.session_id, error = %err, "streamed chat failed");
            "Failed to generate a response".to_string()
        });
    Sse::new(frames(reply, state.config.stream_delay))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

#[utoipa::path(
    post,
    path = "/api/ai/analyze-drip",
    request_body = DripRequest,
    responses(
        (status = 200, description = "DRIP classification", body = DripAnalysis),
        (status = 400, description = "Missing taskDescription", body = sovereign_core::error::ApiError),
    ),
    tag = "ai"
)]
pub async fn analyze_drip(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<DripRequest>,
) -> Json<DripAnalysis> {
    Json(state.ai.analyze_drip(&body.task_description))
}

#[utoipa::path(
    post,
    path = "/api/ai/email-replies",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "One problem, three replies, one recommendation", body = ReplyOptions),
        (status = 400, description = "Missing emailContent", body = sovereign_core::error::ApiError),
    ),
    tag = "ai"
)]
pub async fn email_replies(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<EmailRequest>,
) -> Result<Json<ReplyOptions>, AppError> {
    Ok(Json(state.ai.generate_email_replies(&body.email_content).await?))
}

#[utoipa::path(
    get,
    path = "/api/ai/history/{session_id}",
    params(("session_id" = String, Path, description = "Chat session id")),
    responses((status = 200, description = "Conversation so far, oldest first", body = Vec<ChatMessage>)),
    tag = "ai"
)]
pub async fn get_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> Json<Vec<ChatMessage>> {
    Json(state.ai.history(&session_key(&user, &session_id)).await)
}

#[utoipa::path(
    delete,
    path = "/api/ai/history/{session_id}",
    params(("session_id" = String, Path, description = "Chat session id")),
    responses((status = 204, description = "History cleared (also when there was none)")),
    tag = "ai"
)]
pub async fn clear_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> StatusCode {
    state.ai.clear_history(&session_key(&user, &session_id)).await;
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    post,
    path = "/api/ai/agents/inbox-sentinel/triage",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Email triage", body = EmailAnalysis),
        (status = 400, description = "Missing emailContent", body = sovereign_core::error::ApiError),
    ),
    tag = "agents"
)]
pub async fn triage_email(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<EmailRequest>,
) -> Result<Json<EmailAnalysis>, AppError> {
    let analysis = InboxSentinelAgent::new(&state.ai)
        .triage(&body.email_content)
        .await?;
    Ok(Json(analysis))
}

#[utoipa::path(
    post,
    path = "/api/ai/agents/dossier",
    request_body = Prospect,
    responses(
        (status = 200, description = "Prospect brief", body = ProspectDossier),
        (status = 400, description = "Invalid prospect", body = sovereign_core::error::ApiError),
    ),
    tag = "agents"
)]
pub async fn build_dossier(
    State(state): State<AppState>,
    ValidJson(prospect): ValidJson<Prospect>,
) -> Result<Json<ProspectDossier>, AppError> {
    Ok(Json(DossierAgent::new(&state.ai).build(&prospect).await?))
}

#[utoipa::path(
    post,
    path = "/api/ai/agents/closer/analyze-call",
    request_body = CallAnalysisRequest,
    responses(
        (status = 200, description = "Call analysis with CRM stage and follow-up date", body = CallAnalysis),
        (status = 400, description = "Invalid request", body = sovereign_core::error::ApiError),
    ),
    tag = "agents"
)]
pub async fn analyze_call(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CallAnalysisRequest>,
) -> Result<Json<CallAnalysis>, AppError> {
    Ok(Json(CloserAgent::new(&state.ai).analyze_call(&body).await?))
}

#[utoipa::path(
    post,
    path = "/api/ai/agents/closer/proposal",
    request_body = ProposalRequest,
    responses(
        (status = 200, description = "Proposal draft", body = ProposalDraft),
        (status = 400, description = "Invalid request", body = sovereign_core::error::ApiError),
    ),
    tag = "agents"
)]
pub async fn draft_proposal(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<ProposalRequest>,
) -> Result<Json<ProposalDraft>, AppError> {
    Ok(Json(CloserAgent::new(&state.ai).draft_proposal(&body).await?))
}

#[utoipa::path(
    post,
    path = "/api/ai/agents/content-alchemist/repurpose",
    request_body = RepurposeRequest,
    responses(
        (status = 200, description = "One piece per requested format", body = Vec<ContentPiece>),
        (status = 400, description = "Invalid request", body = sovereign_core::error::ApiError),
    ),
    tag = "agents"
)]
pub async fn repurpose_content(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RepurposeRequest>,
) -> Result<Json<Vec<ContentPiece>>, AppError> {
    let pieces = ContentAlchemistAgent::new(&state.ai)
        .repurpose(&body.content, &body.formats)
        .await?;
    Ok(Json(pieces))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::{Value, json};

    use super::*;
    use crate::routes::test_support::{app, send, send_raw, state};

    fn parse_frames(body: &str) -> Vec<StreamFrame> {
        body.lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|data| serde_json::from_str(data.trim_start()).expect("frame JSON"))
            .collect()
    }

    #[test]
    fn chunks_reassemble_exactly() {
        for text in ["one", "two words", "double  space", " leading", "trailing ", ""] {
            assert_eq!(word_chunks(text).concat(), text, "{text:?}");
        }
        assert_eq!(word_chunks("a b c"), ["a ", "b ", "c"]);
    }

    #[tokio::test]
    async fn chat_returns_reply_and_session() {
        let app = app(state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/chat",
            Some(json!({ "message": "hello", "sessionId": "s-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessionId"], "s-1");
        assert!(body["response"].as_str().is_some_and(|r| !r.is_empty()));

        let (_, history) = send(&app, Method::GET, "/api/ai/history/s-1", None).await;
        assert_eq!(history.as_array().map(Vec::len), Some(2));
        assert_eq!(history[1]["content"], body["response"]);
    }

    #[tokio::test]
    async fn sessions_are_private_to_their_user() {
        let shared = state();
        let demo = app(shared.clone());
        let other = app(shared).layer(axum::Extension(crate::user::AuthenticatedUser {
            user_id: "u-42".to_string(),
        }));
        send(
            &demo,
            Method::POST,
            "/api/ai/chat",
            Some(json!({ "message": "hello", "sessionId": "shared-name" })),
        )
        .await;

        let (status, history) = send(&other, Method::GET, "/api/ai/history/shared-name", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history, json!([]));
        send(&other, Method::DELETE, "/api/ai/history/shared-name", None).await;
        let (_, history) = send(&demo, Method::GET, "/api/ai/history/shared-name", None).await;
        assert_eq!(history.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn triaged_email_is_not_in_any_history() {
        let app = app(state());
        let secret = "CONFIDENTIAL: acquisition price is $4M";
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/ai/agents/inbox-sentinel/triage",
            Some(json!({ "emailContent": secret })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        for uri in ["/api/ai/history/agent:inbox-sentinel", "/api/ai/history/cli"] {
            let (status, history) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(history, json!([]), "{uri}");
        }
    }

    #[tokio::test]
    async fn chat_without_session_is_400() {
        let app = app(state());
        let (status, body) = send(&app, Method::POST, "/api/ai/chat", Some(json!({ "message": "hi" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "sessionId");
    }

    #[tokio::test]
    async fn streamed_chunks_concatenate_to_complete() {
        let app = app(state());
        let (status, headers, body) = send_raw(
            &app,
            Method::POST,
            "/api/ai/chat/stream",
            Some(json!({ "message": "how do I automate onboarding?", "sessionId": "s-2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("text/event-stream"))
        );

        let frames = parse_frames(&body);
        let (complete, chunks) = frames.split_last().expect("at least one frame");
        assert_eq!(complete.kind, "complete");
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|f| f.kind == "chunk"));
        let joined: String = chunks.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(joined, complete.content);
    }

    #[tokio::test]
    async fn clearing_history_is_204_even_when_empty() {
        let app = app(state());
        send(
            &app,
            Method::POST,
            "/api/ai/chat",
            Some(json!({ "message": "hey", "sessionId": "s-3" })),
        )
        .await;
        let (status, _) = send(&app, Method::DELETE, "/api/ai/history/s-3", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, "/api/ai/history/s-3", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, history) = send(&app, Method::GET, "/api/ai/history/s-3", None).await;
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn analyze_drip_prefers_replace_for_email() {
        let app = app(state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/analyze-drip",
            Some(json!({ "taskDescription": "reply to client email" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "replace");
    }

    #[tokio::test]
    async fn email_replies_have_three_options() {
        let app = app(state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/email-replies",
            Some(json!({ "emailContent": "Can you send the invoice again?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["options"].as_array().map(Vec::len), Some(3));
        assert!(body["recommendation"].is_u64());
    }

    #[tokio::test]
    async fn agent_endpoints_answer_with_typed_fallbacks() {
        let app = app(state());
        let cases: [(&str, Value, &str); 4] = [
            (
                "/api/ai/agents/inbox-sentinel/triage",
                json!({ "emailContent": "Quick question about pricing" }),
                "urgency",
            ),
            (
                "/api/ai/agents/dossier",
                json!({ "name": "Grace", "company": "Navy Labs" }),
                "fitScore",
            ),
            (
                "/api/ai/agents/closer/analyze-call",
                json!({ "transcript": "We discussed rollout.", "clientName": "Initech" }),
                "followUpDate",
            ),
            (
                "/api/ai/agents/closer/proposal",
                json!({ "clientName": "Initech", "projectScope": "Inbox automation" }),
                "executiveSummary",
            ),
        ];
        for (uri, body, field) in cases {
            let (status, response) = send(&app, Method::POST, uri, Some(body)).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(!response[field].is_null(), "{uri} missing {field}");
        }

        let (status, pieces) = send(
            &app,
            Method::POST,
            "/api/ai/agents/content-alchemist/repurpose",
            Some(json!({ "content": "Ship weekly. Measure everything.", "formats": ["twitter", "linkedin"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pieces.as_array().map(Vec::len), Some(2));
    }

    struct Down;

    #[async_trait::async_trait]
    impl crate::ai::TextGenerator for Down {
        async fn generate(
            &self,
            _message: &str,
            _agent_type: Option<&str>,
        ) -> Result<crate::ai::Generation, crate::ai::GenerationError> {
            Err(crate::ai::GenerationError::Unavailable("model offline".into()))
        }
    }

    fn failing_state() -> AppState {
        let base = state();
        AppState {
            ai: std::sync::Arc::new(crate::ai::AiService::new(
                std::sync::Arc::new(Down),
                chrono_tz::Tz::UTC,
            )),
            ..base
        }
    }

    #[tokio::test]
    async fn generator_failure_is_500_without_cause() {
        let app = app(failing_state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/chat",
            Some(json!({ "message": "hello", "sessionId": "s-down" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An internal error occurred");

        let (_, history) = send(&app, Method::GET, "/api/ai/history/s-down", None).await;
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn generator_failure_streams_an_error_frame() {
        let app = app(failing_state());
        let (status, _, body) = send_raw(
            &app,
            Method::POST,
            "/api/ai/chat/stream",
            Some(json!({ "message": "hello", "sessionId": "s-down" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let frames = parse_frames(&body);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].kind, "error");
    }
}
