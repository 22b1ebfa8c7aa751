//! Remote model invocation
//!
//! This module contains the `ModelInvoker` trait and the AWS Bedrock
//! implementation of it. The dispatcher only ever talks to the trait.

#[cfg(feature = "bedrock")]
pub mod bedrock;

use serde_json::Value;

use crate::error::InvokeError;

#[cfg(feature = "bedrock")]
pub use bedrock::BedrockInvoker;

/// A single model call
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    /// Model identifier or ARN
    pub model_id: String,
    /// Region override; `None` uses the ambient SDK region
    pub region: Option<String>,
    /// Model-specific JSON body
    pub body: Value,
}

/// Trait for the remote inference capability
///
/// Given a model identifier and a request body, returns the decoded response
/// body. Every failure (transport, credentials, throttling, a body that isn't
/// JSON) comes back as an [`InvokeError`]; nothing is retried.
#[async_trait::async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, request: InvokeRequest) -> Result<Value, InvokeError>;
}

// Implement ModelInvoker for Arc<dyn ModelInvoker> to support dynamic dispatch
#[async_trait::async_trait]
impl ModelInvoker for std::sync::Arc<dyn ModelInvoker> {
    async fn invoke(&self, request: InvokeRequest) -> Result<Value, InvokeError> {
        (**self).invoke(request).await
    }
}
