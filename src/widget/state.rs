use super::transport::TransportResponse;
use reqwest::StatusCode;
use serde::Serialize;

pub const THINKING_PLACEHOLDER: &str = "Thinking...";
pub const INVALID_RESPONSE_MESSAGE: &str = "Error: Invalid response from server";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WidgetPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Everything a renderer needs to draw the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetView {
    pub phase: WidgetPhase,
    pub query: String,
    pub input_enabled: bool,
    /// Set on every terminal transition; renderers move focus back to the input.
    pub focus_requested: bool,
    pub loading_class: bool,
    pub error_class: bool,
    pub response_visible: bool,
    pub response_text: Option<String>,
    pub attribution_visible: bool,
}

impl Default for WidgetView {
    fn default() -> Self {
        Self {
            phase: WidgetPhase::Idle,
            query: String::new(),
            input_enabled: true,
            focus_requested: false,
            loading_class: false,
            error_class: false,
            response_visible: false,
            response_text: None,
            attribution_visible: false,
        }
    }
}

/// Result of a single `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank query; nothing was sent.
    Ignored,
    /// A submission is already in flight.
    Busy,
    Answered(String),
    Failed(String),
    /// `clear()` ran while the request was in flight; its result was dropped.
    Superseded,
}

fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.type_() == mime::TEXT && m.subtype() == mime::HTML)
}

fn proxy_error(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status");
    format!("App Proxy Error {status}: {reason}")
}

fn error_field(value: &serde_json::Value) -> Option<String> {
    match value.get("error")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Map a backend reply to the answer text or the message to display.
pub fn classify_response(response: &TransportResponse) -> Result<String, String> {
    let success = (200..300).contains(&response.status);

    if !success && is_html(response.content_type.as_deref()) {
        return Err(proxy_error(response.status));
    }

    let Ok(payload) = serde_json::from_str::<serde_json::Value>(&response.body) else {
        return Err(if success {
            INVALID_RESPONSE_MESSAGE.to_string()
        } else {
            proxy_error(response.status)
        });
    };

    if let Some(error) = error_field(&payload) {
        return Err(format!("Error: {error}"));
    }

    if !success {
        return Err(proxy_error(response.status));
    }

    payload
        .get("answer")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| INVALID_RESPONSE_MESSAGE.to_string())
}
