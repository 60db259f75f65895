use std::error::Error;
use std::sync::Arc;

use futures::future::BoxFuture;
use teloxide::error_handlers::ErrorHandler;
use teloxide::{ApiError, RequestError};
use tracing::error;

/// What to do with an error surfaced by the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Expected control-flow signal of the transport; swallow without a log.
    Ignore,
    /// Log with context and keep running.
    Log,
}

/// Classifies a dispatch-loop error.
///
/// A getUpdates conflict means another instance of the bot is polling; it
/// resolves itself and logging it once per poll cycle would only be noise.
/// Everything else is logged, and nothing ever terminates the loop.
pub fn classify_update_error(err: &(dyn Error + Send + Sync + 'static)) -> ErrorDisposition {
    if let Some(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) =
        err.downcast_ref::<RequestError>()
    {
        return ErrorDisposition::Ignore;
    }
    ErrorDisposition::Log
}

/// Error handler for both update-handler errors and polling-listener errors.
pub struct UpdateErrorHandler;

impl ErrorHandler<Box<dyn Error + Send + Sync>> for UpdateErrorHandler {
    fn handle_error(self: Arc<Self>, err: Box<dyn Error + Send + Sync>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if classify_update_error(err.as_ref()) == ErrorDisposition::Log {
                error!("Error while handling update: {}", err);
            }
        })
    }
}

impl ErrorHandler<RequestError> for UpdateErrorHandler {
    fn handle_error(self: Arc<Self>, err: RequestError) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if classify_update_error(&err) == ErrorDisposition::Log {
                error!("Error while polling for updates: {}", err);
            }
        })
    }
}
