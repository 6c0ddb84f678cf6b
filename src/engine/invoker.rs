//! Calls a located operation and hands its outcomes to the serializer.

use crate::engine::locator::Operation;
use crate::engine::serializer;
use crate::error::Error;
use crate::invocation::DispatchPath;
use crate::logging;
use serde_json::{Map, Value};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Invokes `operation` once and renders its result.
///
/// An error returned by the operation aborts the invocation before anything
/// is rendered.
///
/// # Errors
///
/// Returns a resolution error if the arguments do not decode into the
/// operation's record, a remote error if the operation fails, or a
/// cancellation error if `cancel` fires first.
pub async fn invoke(
    operation: &Operation,
    path: &DispatchPath,
    args: Option<&Map<String, Value>>,
    cancel: &CancellationToken,
) -> Result<String, Error> {
    let target_name = format!("{}.{}", path.sub_service, operation.name());
    logging::log_dispatch(&path.service, &target_name, args);

    let call_args = if operation.takes_args() {
        args.cloned()
    } else {
        None
    };
    let future = operation.call(call_args)?;

    let started = Instant::now();
    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(Error::cancelled(&target_name)),
        result = future => result,
    };
    let duration_ms = started.elapsed().as_millis();

    let outcomes = match result {
        Ok(outcomes) => outcomes,
        Err(err) => {
            let err = Error::remote(&err);
            logging::log_failure(&target_name, duration_ms, &err.to_string());
            return Err(err);
        }
    };
    logging::log_completion(&target_name, duration_ms, outcomes.len());

    serializer::render(&path.command_name, outcomes, cancel).await
}
