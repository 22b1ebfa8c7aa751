//! # promptline
//!
//! Serverless prompt handler for AWS Bedrock.
//!
//! The handler accepts an untyped event, works out what kind of caller sent
//! it, extracts a prompt, calls a Bedrock model once, and shapes the answer
//! back into whatever form the caller expects.
//!
//! ## Quick Start
//!
//! ```ignore
//! use promptline_core::invoker::BedrockInvoker;
//! use promptline_core::{Dispatcher, DispatcherConfig, TracingHook};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Dispatcher::new(BedrockInvoker::from_env().await).with_hook(TracingHook);
//!
//!     let outcome = dispatcher
//!         .handle(
//!             serde_json::json!({"body": "{\"prompt\": \"What is 2 + 2?\"}"}),
//!             &DispatcherConfig::from_env(),
//!         )
//!         .await;
//!     println!("{}", serde_json::to_string(&outcome).unwrap());
//! }
//! ```
//!
//! ## Event shapes
//!
//! Checked in this order, first match wins:
//!
//! - **Direct** - `{"prompt": ...}`; answered with a raw `{"response": ...}`
//!   unless the event also carries `body` or `httpMethod`
//! - **Preflight** - `{"httpMethod": "OPTIONS"}`; answered with CORS headers
//! - **Custom resource** - `{"RequestType": ...}`; acknowledged without work
//! - **Gateway** - `{"body": ...}`; answered with an HTTP envelope
//!
//! ## Model profiles
//!
//! Model identifiers starting with `arn:` use the Anthropic messages format;
//! everything else uses the Amazon Nova `messages-v1` format. See
//! [`ModelProfile`].
//!
//! ## Feature Flags
//!
//! - `bedrock` - the AWS SDK backed [`invoker::BedrockInvoker`]
//! - `test-utils` - [`test_utils::MockInvoker`] and friends

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod events;
pub mod invoker;
pub mod outcome;
pub mod profile;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{DispatcherConfig, HandlerMode, DEFAULT_MODEL_ID};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, InvokeError, RequestError};
pub use event::{EventShape, InboundEvent};
pub use events::{DispatchEvent, DispatchHook, TracingHook};
pub use invoker::{InvokeRequest, ModelInvoker};
pub use outcome::{CustomResourceAck, HttpEnvelope, Outcome, RawReply};
pub use profile::{ModelProfile, NO_RESPONSE_TEXT};

#[cfg(feature = "bedrock")]
pub use invoker::BedrockInvoker;
