use serde_json::{Value, json};

/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
/// 3=connection error, 4=usage error
pub const EXIT_USAGE: i32 = 4;
pub const EXIT_CONNECTION: i32 = 3;

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", pretty(&err));
    std::process::exit(EXIT_USAGE);
}

pub fn exit_code_for(status: u16) -> i32 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

/// Body as JSON when it parses, as a JSON string otherwise (`/health` answers
/// plain text). Empty bodies (204) become `null`.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Execute an API request, print the response, and return the exit code.
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
    raw: bool,
) -> i32 {
    let url = match reqwest::Url::parse(&format!("{}{path}", api_url.trim_end_matches('/'))) {
        Ok(url) => url,
        Err(e) => {
            let err = json!({
                "error": "cli_error",
                "message": format!("Invalid URL: {api_url}{path}: {e}")
            });
            eprintln!("{}", pretty(&err));
            return EXIT_USAGE;
        }
    };

    let mut req = client().request(method, url);
    if let Some(b) = body {
        req = req.json(&b);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            let err = json!({
                "error": "connection_error",
                "message": format!("{e}"),
                "docs_hint": "Is the API server running? Check SOVEREIGN_API_URL."
            });
            eprintln!("{}", pretty(&err));
            return EXIT_CONNECTION;
        }
    };

    let status = resp.status().as_u16();
    let exit_code = exit_code_for(status);

    let output = match resp.text().await {
        Ok(text) => parse_body(&text),
        Err(e) => json!({"raw_error": format!("Failed to read response body: {e}")}),
    };
    if output.is_null() {
        return exit_code;
    }

    let formatted = if raw {
        output.to_string()
    } else {
        pretty(&output)
    };

    if exit_code == 0 {
        println!("{formatted}");
    } else {
        eprintln!("{formatted}");
    }

    exit_code
}
