//! Inbound event classification
//!
//! The handler receives untyped JSON. [`EventShape::detect`] runs an ordered
//! table of shape predicates over it (first match wins) and
//! [`InboundEvent::classify`] turns the winning shape into a typed variant.

use serde_json::{Map, Value};

use crate::error::RequestError;

/// The recognised event shapes, in detection priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventShape {
    /// Bare object with a `prompt` field
    Direct,
    /// CORS preflight (`httpMethod == "OPTIONS"`)
    Preflight,
    /// CloudFormation custom resource callback (`RequestType` present)
    CustomResource,
    /// API Gateway proxy payload (`body` present)
    Gateway,
}

type ShapePredicate = fn(&Map<String, Value>) -> bool;

fn has_prompt(event: &Map<String, Value>) -> bool {
    event.contains_key("prompt")
}

fn is_preflight(event: &Map<String, Value>) -> bool {
    event.get("httpMethod").and_then(Value::as_str) == Some("OPTIONS")
}

fn has_request_type(event: &Map<String, Value>) -> bool {
    event.contains_key("RequestType")
}

fn has_body(event: &Map<String, Value>) -> bool {
    event.contains_key("body")
}

const SHAPE_PREDICATES: [(EventShape, ShapePredicate); 4] = [
    (EventShape::Direct, has_prompt),
    (EventShape::Preflight, is_preflight),
    (EventShape::CustomResource, has_request_type),
    (EventShape::Gateway, has_body),
];

impl EventShape {
    /// Find the first shape whose predicate accepts the event
    ///
    /// Non-object events never match.
    pub fn detect(event: &Value) -> Option<Self> {
        let object = event.as_object()?;
        SHAPE_PREDICATES
            .iter()
            .find(|(_, matches)| matches(object))
            .map(|(shape, _)| *shape)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Preflight => "preflight",
            Self::CustomResource => "custom_resource",
            Self::Gateway => "gateway",
        }
    }
}

/// A direct (console/SDK) invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectInvocation {
    prompt: Option<String>,
    replies_raw: bool,
}

impl DirectInvocation {
    /// The prompt, if it is a non-empty string
    pub fn prompt(&self) -> Result<&str, RequestError> {
        self.prompt.as_deref().ok_or(RequestError::MissingPrompt)
    }

    /// True when the event carries no `body`/`httpMethod`, so the reply is a
    /// raw object rather than an HTTP envelope
    pub fn replies_raw(&self) -> bool {
        self.replies_raw
    }
}

/// The fields of a custom resource callback that get echoed back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomResourceRequest {
    pub request_type: Option<String>,
    pub physical_resource_id: Option<String>,
    pub stack_id: Option<String>,
    pub request_id: Option<String>,
    pub logical_resource_id: Option<String>,
}

/// An API Gateway proxy invocation
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    body: Option<Value>,
}

impl GatewayRequest {
    pub fn new(body: Option<Value>) -> Self {
        Self { body }
    }

    /// Decode the body and pull out the prompt
    ///
    /// The body may be an already-decoded object or a JSON string.
    pub fn prompt(&self) -> Result<String, RequestError> {
        let decoded = match self.non_empty_body()? {
            Value::String(raw) => {
                serde_json::from_str::<Value>(raw).map_err(|_| RequestError::InvalidJson)?
            }
            other => other.clone(),
        };

        prompt_field(&decoded).ok_or(RequestError::MissingPrompt)
    }

    /// Prompt extraction for legacy gateway mode
    ///
    /// Only string bodies are accepted; anything else counts as undecodable.
    pub fn legacy_prompt(&self) -> Result<String, RequestError> {
        let decoded = match self.non_empty_body()? {
            Value::String(raw) => {
                serde_json::from_str::<Value>(raw).map_err(|_| RequestError::InvalidJson)?
            }
            _ => return Err(RequestError::InvalidJson),
        };

        prompt_field(&decoded).ok_or(RequestError::MissingBodyPrompt)
    }

    fn non_empty_body(&self) -> Result<&Value, RequestError> {
        match &self.body {
            None | Some(Value::Null) => Err(RequestError::MissingBody),
            Some(Value::String(s)) if s.is_empty() => Err(RequestError::MissingBody),
            Some(body) => Ok(body),
        }
    }
}

/// A classified inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Direct(DirectInvocation),
    Preflight,
    CustomResource(CustomResourceRequest),
    Gateway(GatewayRequest),
    /// Matched no known shape
    Unrecognized,
}

impl InboundEvent {
    /// Classify a raw event
    pub fn classify(event: &Value) -> Self {
        let (Some(shape), Some(object)) = (EventShape::detect(event), event.as_object()) else {
            return Self::Unrecognized;
        };

        match shape {
            EventShape::Direct => Self::Direct(DirectInvocation {
                prompt: prompt_field(event),
                replies_raw: !object.contains_key("body") && !object.contains_key("httpMethod"),
            }),
            EventShape::Preflight => Self::Preflight,
            EventShape::CustomResource => Self::CustomResource(CustomResourceRequest {
                request_type: string_field(object, "RequestType"),
                physical_resource_id: string_field(object, "PhysicalResourceId"),
                stack_id: string_field(object, "StackId"),
                request_id: string_field(object, "RequestId"),
                logical_resource_id: string_field(object, "LogicalResourceId"),
            }),
            EventShape::Gateway => Self::Gateway(GatewayRequest::new(object.get("body").cloned())),
        }
    }

    /// Classification used in legacy gateway mode: every event is a gateway
    /// event, with a missing `body` treated as empty
    pub fn classify_legacy(event: &Value) -> GatewayRequest {
        GatewayRequest::new(event.get("body").cloned())
    }

    /// The detected shape, `None` for unrecognized events
    pub fn shape(&self) -> Option<EventShape> {
        match self {
            Self::Direct(_) => Some(EventShape::Direct),
            Self::Preflight => Some(EventShape::Preflight),
            Self::CustomResource(_) => Some(EventShape::CustomResource),
            Self::Gateway(_) => Some(EventShape::Gateway),
            Self::Unrecognized => None,
        }
    }
}

/// `prompt` as a non-empty string; other JSON types don't count
fn prompt_field(value: &Value) -> Option<String> {
    value
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}
