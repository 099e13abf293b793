use axum::http::{header, HeaderMap};
use serde_json::{Map, Value};

use crate::error::ParseError;

pub const EVENT_HEADER: &str = "x-gitlab-event";
pub const DELIVERY_HEADER: &str = "x-gitlab-event-uuid";

pub const ISSUE_HOOK: &str = "Issue Hook";
pub const PUSH_HOOK: &str = "Push Hook";

/// One inbound GitLab webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: String,
    action: Option<String>,
    delivery_id: String,
    raw_payload: Map<String, Value>,
}

impl Event {
    /// Decodes headers and body into an event. Signature checks happen before this.
    pub fn parse(headers: &HeaderMap, body: &[u8]) -> Result<Self, ParseError> {
        let kind = header_str(headers, EVENT_HEADER)
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ParseError::MissingEventHeader)?;

        if let Some(content_type) = header_str(headers, header::CONTENT_TYPE.as_str()) {
            let mime = content_type.split(';').next().unwrap_or("").trim();
            if !mime.eq_ignore_ascii_case("application/json") {
                return Err(ParseError::UnsupportedContentType(content_type.to_string()));
            }
        }

        let raw_payload = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(ParseError::MalformedBody(format!(
                    "expected a JSON object, got {}",
                    json_type(&other)
                )))
            }
            Err(e) => return Err(ParseError::MalformedBody(e.to_string())),
        };

        let delivery_id = header_str(headers, DELIVERY_HEADER)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self::new(kind, delivery_id, raw_payload)
    }

    /// Builds an event from an already-decoded payload, deriving the action
    /// from `object_attributes.action`. A blank `kind` is rejected.
    pub fn new(
        kind: &str,
        delivery_id: impl Into<String>,
        raw_payload: Map<String, Value>,
    ) -> Result<Self, ParseError> {
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(ParseError::MissingEventHeader);
        }
        let action = raw_payload
            .get("object_attributes")
            .and_then(|attrs| attrs.get("action"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            kind: kind.to_string(),
            action,
            delivery_id: delivery_id.into(),
            raw_payload,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn delivery_id(&self) -> &str {
        &self.delivery_id
    }

    pub fn raw_payload(&self) -> &Map<String, Value> {
        &self.raw_payload
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw_payload.get(key)
    }

    pub fn object_attributes(&self) -> Option<&Map<String, Value>> {
        self.get("object_attributes").and_then(Value::as_object)
    }

    /// `project.id`, falling back to the top-level `project_id` push events carry.
    pub fn project_id(&self) -> Option<u64> {
        self.get("project")
            .and_then(|p| p.get("id"))
            .or_else(|| self.get("project_id"))
            .and_then(Value::as_u64)
    }

    pub fn username(&self) -> Option<&str> {
        self.get("user")
            .and_then(|u| u.get("username"))
            .and_then(Value::as_str)
            .or_else(|| self.get("user_username").and_then(Value::as_str))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
