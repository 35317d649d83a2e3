//! Response handling: status checks, content-type checks and error bodies.

use irriga_core::{ApiError, ApiResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Longest plain-text body kept as an error message.
const MAX_TEXT_MESSAGE: usize = 300;

/// Fields a backend may put in an error body. Each one is decoded on
/// its own, so a malformed field does not hide the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
    pub details: Vec<String>,
}

impl ErrorBody {
    pub fn from_json(value: &Value) -> Self {
        let message_list = string_list(value.get("message"));
        let message = match value.get("message") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            // Validation pipes often send a list of messages.
            Some(Value::Array(_)) if !message_list.is_empty() => Some(message_list.join("; ")),
            _ => None,
        };

        let error = value
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        let mut details = string_list(value.get("details"));
        if details.is_empty() && message_list.len() > 1 {
            details = message_list;
        }

        Self {
            message,
            error,
            details,
        }
    }
}

/// What a failed response carried.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    Structured(ErrorBody),
    Text(String),
    Empty,
}

impl ErrorPayload {
    /// JSON is only attempted when the declared type says so; a body that
    /// fails to parse falls back to its raw text.
    pub fn parse(content_type: Option<&str>, body: &str) -> Self {
        if is_json(content_type) {
            match serde_json::from_str::<Value>(body) {
                Ok(value @ Value::Object(_)) => return Self::Structured(ErrorBody::from_json(&value)),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Error body is not valid JSON"),
            }
        }

        let text = body.trim();
        if text.is_empty() {
            Self::Empty
        } else {
            Self::Text(truncate(text, MAX_TEXT_MESSAGE))
        }
    }

    /// Build the error. `fallback` replaces the status line when the body
    /// has nothing usable.
    pub fn into_api_error(self, status: u16, fallback: Option<&str>) -> ApiError {
        let status_line = || {
            fallback
                .map(str::to_string)
                .or_else(|| {
                    StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("HTTP {}", status))
        };

        match self {
            Self::Structured(body) => ApiError::Http {
                status,
                message: body
                    .message
                    .or(body.error)
                    .or_else(|| fallback.map(str::to_string))
                    .unwrap_or_else(|| format!("HTTP {}", status)),
                details: body.details,
            },
            Self::Text(text) => ApiError::http(status, text),
            Self::Empty => ApiError::http(status, status_line()),
        }
    }
}

/// Turn a failed response body into an [`ApiError`].
pub fn parse_error_body(status: u16, content_type: Option<&str>, body: &str) -> ApiError {
    ErrorPayload::parse(content_type, body).into_api_error(status, None)
}

/// Pass through 2xx responses; read everything else into an error.
pub(crate) async fn ensure_success(
    response: Response,
    endpoint: &str,
    fallback: Option<&str>,
) -> ApiResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let content_type = content_type(&response);
    let body = response.text().await.unwrap_or_default();
    let err = ErrorPayload::parse(content_type.as_deref(), &body).into_api_error(status, fallback);

    warn!(
        endpoint = %endpoint,
        status = status,
        message = %err,
        details = ?err.details(),
        "API error"
    );
    Err(err)
}

/// Decode a JSON body, refusing anything not declared as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, subject: &str) -> ApiResult<T> {
    let status = response.status().as_u16();
    let content_type = content_type(&response);

    if !is_json(content_type.as_deref()) {
        warn!(
            subject = %subject,
            content_type = ?content_type,
            "Response is not JSON"
        );
        return Err(ApiError::NotJson {
            status,
            subject: subject.to_string(),
            content_type,
        });
    }

    response.json::<T>().await.map_err(transport_error)
}

/// Decode a JSON body whatever its declared content type.
pub(crate) async fn read_json_any<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let content_type = content_type(&response);
    let body = response.text().await.map_err(transport_error)?;
    if !is_json(content_type.as_deref()) {
        debug!(content_type = ?content_type, "Decoding body not declared as JSON");
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map a reqwest failure onto the API error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let ct = ct.to_ascii_lowercase();
        ct.contains("application/json") || ct.contains("+json")
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json; charset=utf-8");

    #[test]
    fn test_json_message() {
        let err = parse_error_body(422, JSON, r#"{"message":"week must be >= 1","statusCode":422}"#);
        assert_eq!(err, ApiError::http(422, "week must be >= 1"));
    }

    #[test]
    fn test_json_error_field_used_when_no_message() {
        let err = parse_error_body(400, JSON, r#"{"error":"Bad Request"}"#);
        assert_eq!(err.to_string(), "Bad Request");
    }

    #[test]
    fn test_message_list_becomes_details() {
        let body = r#"{"message":["ec must be a number","goal must be one of balanced"],"error":"Bad Request"}"#;
        let err = parse_error_body(400, JSON, body);
        assert_eq!(
            err.to_string(),
            "ec must be a number; goal must be one of balanced"
        );
        assert_eq!(err.details().len(), 2);
    }

    #[test]
    fn test_details_decoded_independently() {
        let body = r#"{"message":42,"details":["linha 3: ponto final ausente"]}"#;
        let err = parse_error_body(400, JSON, body);
        assert_eq!(err.to_string(), "HTTP 400");
        assert_eq!(err.details(), ["linha 3: ponto final ausente".to_string()]);
    }

    #[test]
    fn test_broken_json_falls_back_to_text() {
        let err = parse_error_body(500, JSON, "{not json");
        assert_eq!(err, ApiError::http(500, "{not json"));
    }

    #[test]
    fn test_plain_text_and_empty_bodies() {
        let err = parse_error_body(502, Some("text/plain"), "upstream down\n");
        assert_eq!(err.to_string(), "upstream down");

        let err = parse_error_body(503, None, "");
        assert_eq!(err.to_string(), "Service Unavailable");

        let err = parse_error_body(599, None, "  ");
        assert_eq!(err.to_string(), "HTTP 599");
    }

    #[test]
    fn test_html_is_not_parsed_as_json_and_is_truncated() {
        let html = format!("<html>{}</html>", "x".repeat(1000));
        let err = parse_error_body(418, Some("text/html"), &html);
        let msg = err.to_string();
        assert!(msg.starts_with("<html>"));
        assert!(msg.chars().count() <= MAX_TEXT_MESSAGE + 1);
    }

    #[test]
    fn test_fallback_replaces_status_line() {
        let err = ErrorPayload::parse(JSON, "{}").into_api_error(401, Some("Falha na autenticação"));
        assert_eq!(err.to_string(), "Falha na autenticação");

        let err = ErrorPayload::Empty.into_api_error(400, Some("Validação falhou"));
        assert_eq!(err.to_string(), "Validação falhou");
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(Some("application/json")));
        assert!(is_json(Some("application/problem+json")));
        assert!(!is_json(Some("text/html; charset=utf-8")));
        assert!(!is_json(None));
    }
}
