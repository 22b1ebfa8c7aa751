use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use promptline_core::{BedrockInvoker, Dispatcher, DispatcherConfig, Outcome, TracingHook};
use serde_json::Value;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

async fn function_handler(
    dispatcher: &Dispatcher<BedrockInvoker>,
    event: LambdaEvent<Value>,
) -> Result<Outcome, Error> {
    let LambdaEvent { payload, context } = event;
    let span = tracing::info_span!("invocation", request_id = %context.request_id);

    let config = DispatcherConfig::from_env();
    Ok(dispatcher.handle(payload, &config).instrument(span).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        // disable printing the name of the module in every log line.
        .with_target(false)
        // CloudWatch adds the ingestion time.
        .without_time()
        .init();

    let dispatcher = Dispatcher::new(BedrockInvoker::from_env().await).with_hook(TracingHook);

    run(service_fn(|event| function_handler(&dispatcher, event))).await
}
