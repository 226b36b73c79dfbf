//! Portal login response: JSONP envelope stripping, typed decode and outcome classification.
//!
//! Expected body: `dr1003({"result":1,"msg":"Portal协议认证成功！"});`
//!
//! Classification is layered:
//! 1. no envelope -> keyword scan of the raw body
//! 2. envelope but payload is not a JSON object -> literal success-marker check
//! 3. decoded payload -> `result` / `msg`

use serde_json::{Map, Value};

/// JSONP callback name sent with the login request
pub const CALLBACK: &str = "dr1003";

/// Message the portal returns on a successful login
pub const SUCCESS_MESSAGE: &str = "Portal协议认证成功！";

const SUCCESS_RESULT_MARKER: &str = r#""result":1"#;
const SUCCESS_MESSAGE_MARKER: &str = r#""msg":"Portal协议认证成功！""#;

const SUCCESS_HINTS: &[&str] = &["success", "成功", "login_ok"];
const FAILURE_HINTS: &[&str] = &["fail", "失败", "error"];

/// Classification of one login attempt
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// `result == 1` (or the literal success markers when the payload is not JSON)
    Success {
        message: Option<String>,
        /// `msg` differs from [`SUCCESS_MESSAGE`]
        unexpected_message: bool,
        /// Online time / usage info (`olmass`)
        usage: Option<String>,
    },
    /// `result == 0`
    Failure { reason: Option<String> },
    /// `result` missing or neither 0 nor 1
    Indeterminate {
        result: Option<Value>,
        message: Option<Value>,
        payload: String,
    },
    /// Envelope found, payload not JSON, no success marker
    Ambiguous,
    /// Not a JSONP body, but it mentions success
    ProbableSuccess,
    /// Not a JSONP body, but it mentions failure
    ProbableFailure,
    UnknownFormat,
}

/// Decoded JSONP payload
#[derive(Debug, Clone, PartialEq)]
pub struct PortalReply {
    pub result: Option<Value>,
    pub msg: Option<Value>,
    pub olmass: Option<String>,
}

impl PortalReply {
    /// Decode a payload; it must be a JSON object
    pub fn decode(payload: &str) -> serde_json::Result<Self> {
        let mut fields: Map<String, Value> = serde_json::from_str(payload)?;
        let olmass = match fields.remove("olmass") {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };
        Ok(Self {
            result: fields.remove("result"),
            msg: fields.remove("msg"),
            olmass,
        })
    }

    fn result_code(&self) -> Option<f64> {
        self.result.as_ref().and_then(Value::as_f64)
    }

    fn message(&self) -> Option<&str> {
        self.msg.as_ref().and_then(Value::as_str)
    }

    fn classify(self, payload: &str) -> LoginOutcome {
        match self.result_code() {
            Some(code) if code == 1.0 => {
                let message = self.message().map(str::to_string);
                LoginOutcome::Success {
                    unexpected_message: message.as_deref() != Some(SUCCESS_MESSAGE),
                    message,
                    usage: self.olmass,
                }
            }
            Some(code) if code == 0.0 => LoginOutcome::Failure {
                reason: self
                    .message()
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
            },
            _ => LoginOutcome::Indeterminate {
                result: self.result,
                message: self.msg,
                payload: payload.to_string(),
            },
        }
    }
}

/// Payload between the first `(` and the last `)` of a `callback(...)` body
pub fn strip_envelope<'a>(body: &'a str, callback: &str) -> Option<&'a str> {
    let body = body.trim_start();
    let rest = body.strip_prefix(callback)?;
    if !rest.starts_with('(') {
        return None;
    }
    let start = body.find('(')?;
    let end = body.rfind(')')?;
    (end > start).then(|| &body[start + 1..end])
}

/// Classify a login response body
pub fn classify(body: &str) -> LoginOutcome {
    let Some(payload) = strip_envelope(body, CALLBACK) else {
        return scan_keywords(body);
    };
    tracing::debug!("Login response payload: {}", payload);

    match PortalReply::decode(payload) {
        Ok(reply) => reply.classify(payload),
        Err(e) => {
            tracing::warn!("Failed to decode login payload: {}. Raw response: {}", e, body);
            if body.contains(SUCCESS_RESULT_MARKER) && body.contains(SUCCESS_MESSAGE_MARKER) {
                LoginOutcome::Success {
                    message: Some(SUCCESS_MESSAGE.to_string()),
                    unexpected_message: false,
                    usage: None,
                }
            } else {
                LoginOutcome::Ambiguous
            }
        }
    }
}

fn scan_keywords(body: &str) -> LoginOutcome {
    tracing::warn!("Login response is not a {}(...) JSONP body: {}", CALLBACK, body);
    if SUCCESS_HINTS.iter().any(|hint| body.contains(hint)) {
        LoginOutcome::ProbableSuccess
    } else if FAILURE_HINTS.iter().any(|hint| body.contains(hint)) {
        LoginOutcome::ProbableFailure
    } else {
        LoginOutcome::UnknownFormat
    }
}

impl LoginOutcome {
    /// Log the outcome at a level matching its severity
    pub fn report(&self) {
        match self {
            LoginOutcome::Success {
                message,
                unexpected_message,
                usage,
            } => {
                if *unexpected_message {
                    tracing::warn!(
                        "Login result is 1 but message is unexpected: {:?}; treating as success",
                        message.as_deref().unwrap_or_default()
                    );
                } else {
                    tracing::info!("Login succeeded");
                }
                if let Some(usage) = usage {
                    tracing::info!("Online usage (olmass): {}", usage);
                }
            }
            LoginOutcome::Failure { reason: Some(reason) } => {
                tracing::warn!("Login failed: {}", reason);
            }
            LoginOutcome::Failure { reason: None } => {
                tracing::warn!("Login failed, portal gave no reason");
            }
            LoginOutcome::Indeterminate {
                result,
                message,
                payload,
            } => {
                tracing::warn!(
                    "Login result missing or unexpected. result: {:?}, msg: {:?}, payload: {}",
                    result,
                    message,
                    payload
                );
            }
            LoginOutcome::Ambiguous => {
                tracing::warn!("Login may have failed: payload is not JSON and has no success marker");
            }
            LoginOutcome::ProbableSuccess => {
                tracing::info!("Login request sent; response suggests success (non-standard format)");
            }
            LoginOutcome::ProbableFailure => {
                tracing::warn!("Login request sent; response suggests failure (non-standard format)");
            }
            LoginOutcome::UnknownFormat => {
                tracing::warn!("Login response format unknown, check the raw response above");
            }
        }
    }
}
