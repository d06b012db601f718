use tracing::{Dispatch, debug, dispatcher, error, info};
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::AppError;

/// Explicit logging handle handed to the proxy, services and authenticator.
///
/// Events emitted through [`Logger::scope`] go to this handle's dispatch, whatever the
/// process default is.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// `fmt` output filtered by `RUST_LOG`.
    pub fn from_env() -> Self {
        let subscriber = fmt().with_env_filter(EnvFilter::from_default_env()).finish();

        Self::new(Dispatch::new(subscriber))
    }

    pub fn disabled() -> Self {
        Self::new(Dispatch::none())
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }

    /// Storage failures are errors. Auth failures stay at debug so probing does not flood
    /// the error level, the rest are expected outcomes of user input.
    pub fn observe(&self, operation: &'static str, err: &AppError) {
        self.scope(|| match err {
            AppError::StorageFailure(detail) => error!(operation, %detail, "storage failure"),
            AppError::AuthFailure => debug!(operation, "authentication failed"),
            AppError::NotExists | AppError::AlreadyExists | AppError::InvalidInput(_) => {
                info!(operation, %err, "request rejected")
            }
        });
    }
}


#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::capture::capturing;
    use crate::{error::AppError, validation::Violations};

    #[test]
    fn test_severity_by_kind() {
        let (logger, levels) = capturing();

        logger.observe("get", &AppError::StorageFailure("timeout".into()));
        logger.observe("create", &AppError::AuthFailure);
        logger.observe("get", &AppError::NotExists);
        logger.observe("create", &AppError::AlreadyExists);
        logger.observe("create", &AppError::InvalidInput(Violations::new()));

        assert_eq!(
            levels.take(),
            vec![Level::ERROR, Level::DEBUG, Level::INFO, Level::INFO, Level::INFO]
        );
    }

    #[test]
    fn test_disabled_logger_is_silent() {
        let (_, levels) = capturing();

        super::Logger::disabled().observe("get", &AppError::StorageFailure("x".into()));

        assert!(levels.take().is_empty());
    }
}
