//! AWS Bedrock invoker implementation

use super::{InvokeRequest, ModelInvoker};
use crate::error::InvokeError;
use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use serde_json::Value;
use std::error::Error as StdError;

const APPLICATION_JSON: &str = "application/json";

// ===== Error Handling Helpers =====

/// Extract a user-friendly error message from an AWS SDK error
///
/// Walks the error chain to find the most meaningful message and
/// classifies it into the appropriate InvokeError variant.
fn classify_aws_error<E, R>(err: SdkError<E, R>) -> InvokeError
where
    E: StdError + ProvideErrorMetadata + 'static,
    R: std::fmt::Debug,
{
    let mut messages = Vec::new();

    // Service errors carry the Bedrock exception name separately from the message
    if let Some(code) = err.code() {
        messages.push(code.to_string());
    }
    if let Some(message) = err.message() {
        messages.push(message.to_string());
    }

    let err_ref: &dyn StdError = &err;
    collect_error_messages(err_ref, &mut messages);

    // Look for the most specific/useful message (usually innermost)
    let root_message = messages
        .last()
        .cloned()
        .unwrap_or_else(|| "Unknown error".to_string());

    let combined = messages.join(" ");

    classify_error_message(&combined, root_message)
}

/// Classify an error based on the combined error message text.
///
/// This matches patterns from the AWS Bedrock `InvokeModel` error types:
/// - ThrottlingException (429), ServiceQuotaExceededException (400)
/// - ServiceUnavailableException (503), InternalServerException (500)
/// - AccessDeniedException (403)
/// - ValidationException (400), ResourceNotFoundException (404)
/// - ModelTimeoutException (408), ModelErrorException (424), ModelNotReadyException (429)
///
/// Reference: https://docs.aws.amazon.com/bedrock/latest/APIReference/API_runtime_InvokeModel.html
fn classify_error_message(combined: &str, root_message: String) -> InvokeError {
    let lower = combined.to_lowercase();

    // Authentication errors (AccessDeniedException, credential issues)
    if lower.contains("unauthorized")
        || lower.contains("session token")
        || lower.contains("security token")
        || lower.contains("access denied")
        || lower.contains("accessdeniedexception")
        || lower.contains("invalid credentials")
        || lower.contains("expired token")
        || lower.contains("credentials")
    {
        InvokeError::Authentication(root_message)
    }
    // Rate limiting (ThrottlingException - HTTP 429, ServiceQuotaExceededException)
    else if lower.contains("throttl")
        || lower.contains("too many requests")
        || lower.contains("rate exceeded")
        || lower.contains("limit exceeded")
        || lower.contains("servicequotaexceeded")
    {
        InvokeError::RateLimited(root_message)
    }
    // Service unavailability (ServiceUnavailableException - HTTP 503, InternalServerException - HTTP 500)
    else if lower.contains("serviceunavailable")
        || lower.contains("service unavailable")
        || lower.contains("temporarily unavailable")
        || lower.contains("internalserver")
        || lower.contains("internal server error")
        || lower.contains("503")
        || lower.contains("500")
    {
        InvokeError::ServiceUnavailable(root_message)
    }
    // Model content/limit errors (ModelErrorException - HTTP 424)
    else if lower.contains("modelerror")
        || lower.contains("content filtered")
        || lower.contains("max tokens")
        || lower.contains("context length")
        || lower.contains("too many tokens")
    {
        InvokeError::Model(root_message)
    }
    // Network/timeout errors (ModelTimeoutException - HTTP 408, connection issues)
    else if lower.contains("timeout")
        || lower.contains("modeltimeout")
        || lower.contains("connection")
        || lower.contains("network")
        || lower.contains("dns")
        || lower.contains("resolve")
    {
        InvokeError::Network(root_message)
    }
    // Configuration errors (ValidationException, ResourceNotFoundException, ModelNotReadyException)
    else if lower.contains("validationexception")
        || lower.contains("validation")
        || lower.contains("resourcenotfound")
        || lower.contains("not found")
        || lower.contains("modelnotready")
        || lower.contains("model")
    {
        InvokeError::Configuration(root_message)
    } else {
        InvokeError::Other(root_message)
    }
}

/// Recursively collect error messages from an error chain
fn collect_error_messages(err: &dyn StdError, messages: &mut Vec<String>) {
    let msg = err.to_string();
    // Skip generic wrapper messages that don't add useful info
    if !msg.is_empty()
        && !msg.starts_with("dispatch failure")
        && !msg.starts_with("connector error")
        && !msg.starts_with("unhandled error")
        && !msg.starts_with("service error")
    {
        messages.push(msg);
    }

    if let Some(source) = err.source() {
        collect_error_messages(source, messages);
    }
}

/// The region a regional client must be built for, if the request asks for
/// one other than the ambient region
fn region_override<'a>(ambient: Option<&str>, requested: Option<&'a str>) -> Option<&'a str> {
    requested.filter(|region| ambient != Some(*region))
}

/// AWS Bedrock `InvokeModel` invoker
///
/// The SDK configuration is loaded once; a client for a different region is
/// derived from it only when a request asks for one.
///
/// ```ignore
/// use promptline_core::invoker::BedrockInvoker;
///
/// let invoker = BedrockInvoker::from_env().await;
/// ```
#[derive(Clone)]
pub struct BedrockInvoker {
    sdk_config: SdkConfig,
    client: Client,
}

impl BedrockInvoker {
    /// Create an invoker using AWS credentials and region from the environment
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_from_env().await;
        Self::with_sdk_config(sdk_config)
    }

    /// Create an invoker from an already-loaded SDK configuration
    pub fn with_sdk_config(sdk_config: SdkConfig) -> Self {
        let client = Client::new(&sdk_config);
        Self { sdk_config, client }
    }

    fn client_for(&self, region: Option<&str>) -> Client {
        let ambient: Option<&str> = self.sdk_config.region().map(|r| r.as_ref());
        match region_override(ambient, region) {
            Some(region) => {
                let config = aws_sdk_bedrockruntime::config::Builder::from(&self.sdk_config)
                    .region(Region::new(region.to_string()))
                    .build();
                Client::from_conf(config)
            }
            None => self.client.clone(),
        }
    }
}

#[async_trait::async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke(&self, request: InvokeRequest) -> Result<Value, InvokeError> {
        let payload = serde_json::to_vec(&request.body)
            .map_err(|e| InvokeError::Other(format!("failed to encode request: {}", e)))?;

        let output = self
            .client_for(request.region.as_deref())
            .invoke_model()
            .model_id(request.model_id)
            .content_type(APPLICATION_JSON)
            .accept(APPLICATION_JSON)
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(classify_aws_error)?;

        Ok(serde_json::from_slice(output.body().as_ref())?)
    }
}
