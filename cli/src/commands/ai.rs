use serde_json::json;

use crate::util::{api_request, exit_error};

/// Classify a task into its DRIP quadrant.
pub async fn drip(api_url: &str, task: &str, raw: bool) -> i32 {
    if task.trim().is_empty() {
        exit_error("task must not be empty", Some("sovereign drip \"reply to client email\""));
    }
    api_request(
        api_url,
        reqwest::Method::POST,
        "/api/ai/analyze-drip",
        Some(json!({ "taskDescription": task })),
        raw,
    )
    .await
}

/// One chat turn; history accumulates per session on the server.
pub async fn chat(api_url: &str, message: &str, session: &str, raw: bool) -> i32 {
    if message.trim().is_empty() {
        exit_error("message must not be empty", None);
    }
    api_request(
        api_url,
        reqwest::Method::POST,
        "/api/ai/chat",
        Some(json!({ "message": message, "sessionId": session })),
        raw,
    )
    .await
}
