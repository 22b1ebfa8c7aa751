//! Handler results
//!
//! Every invocation ends in exactly one [`Outcome`]. Its serialized form is
//! what the Lambda runtime hands back to the caller.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::event::CustomResourceRequest;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";

const APPLICATION_JSON: &str = "application/json";
const CORS_ALLOWED_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";
const CORS_ALLOWED_METHODS: &str = "OPTIONS,POST";

/// Body sent with 500 envelopes in place of the real cause
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Which headers an envelope carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderSet {
    /// `Content-Type` only
    Json,
    /// `Content-Type` and `Access-Control-Allow-Origin`
    JsonWithOrigin,
    /// `Content-Type` and all three CORS headers
    JsonWithCors,
}

impl HeaderSet {
    fn build(self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());

        if matches!(self, Self::JsonWithOrigin | Self::JsonWithCors) {
            headers.insert(ALLOW_ORIGIN.to_string(), "*".to_string());
        }
        if self == Self::JsonWithCors {
            headers.insert(ALLOW_HEADERS.to_string(), CORS_ALLOWED_HEADERS.to_string());
            headers.insert(ALLOW_METHODS.to_string(), CORS_ALLOWED_METHODS.to_string());
        }
        headers
    }
}

/// API Gateway proxy response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON-encoded body
    pub body: String,
}

impl HttpEnvelope {
    fn new(status_code: u16, headers: HeaderSet, body: &Value) -> Self {
        Self {
            status_code,
            headers: headers.build(),
            body: body.to_string(),
        }
    }

    /// 200 with `{"response": text}`
    pub fn success(text: &str) -> Self {
        Self::new(200, HeaderSet::JsonWithOrigin, &json!({ "response": text }))
    }

    /// 200 answer to a CORS preflight
    pub fn preflight() -> Self {
        Self::new(200, HeaderSet::JsonWithCors, &json!({}))
    }

    /// Error envelope with `{"error": message}`
    pub fn error(status_code: u16, message: &str) -> Self {
        Self::new(status_code, HeaderSet::Json, &json!({ "error": message }))
    }

    /// 500 that hides the underlying cause
    pub fn internal_error() -> Self {
        Self::error(500, INTERNAL_SERVER_ERROR)
    }

    /// Legacy gateway mode success: full CORS header set
    pub fn legacy_success(text: &str) -> Self {
        Self::new(200, HeaderSet::JsonWithCors, &json!({ "response": text }))
    }

    /// Legacy gateway mode failure: 500, full CORS header set, real message
    pub fn legacy_error(message: &str) -> Self {
        Self::new(500, HeaderSet::JsonWithCors, &json!({ "error": message }))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Reply to a direct invocation, without an HTTP envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawReply {
    Response { response: String },
    Error { error: String },
}

/// Acknowledgement for a CloudFormation custom resource callback
///
/// Always reports success; no provisioning happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceAck {
    pub status: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
}

/// Physical resource ID reported when the callback carries none
pub const DEFAULT_PHYSICAL_RESOURCE_ID: &str = "default-id";

impl CustomResourceAck {
    pub fn acknowledge(request: &CustomResourceRequest) -> Self {
        let or_empty = |field: &Option<String>| field.clone().unwrap_or_default();

        Self {
            status: "SUCCESS".to_string(),
            physical_resource_id: request
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| DEFAULT_PHYSICAL_RESOURCE_ID.to_string()),
            stack_id: or_empty(&request.stack_id),
            request_id: or_empty(&request.request_id),
            logical_resource_id: or_empty(&request.logical_resource_id),
        }
    }
}

/// The single result of an invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Raw(RawReply),
    Http(HttpEnvelope),
    Acknowledgement(CustomResourceAck),
}

impl Outcome {
    pub fn response(text: impl Into<String>) -> Self {
        Self::Raw(RawReply::Response {
            response: text.into(),
        })
    }

    pub fn raw_error(message: impl Into<String>) -> Self {
        Self::Raw(RawReply::Error {
            error: message.into(),
        })
    }

    /// HTTP status, if this outcome is an envelope
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(envelope) => Some(envelope.status_code),
            _ => None,
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

impl From<HttpEnvelope> for Outcome {
    fn from(envelope: HttpEnvelope) -> Self {
        Self::Http(envelope)
    }
}

impl From<CustomResourceAck> for Outcome {
    fn from(ack: CustomResourceAck) -> Self {
        Self::Acknowledgement(ack)
    }
}
