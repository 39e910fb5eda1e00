//! Reporting stability failures at an integration boundary.
//!
//! Code that calls a named endpoint of an external integration usually needs
//! two things from a failure: a status to answer with and a detail string
//! naming what failed. [`IntegrationFailure`] carries both.

use tower_stability_core::{ErrorKind, StabilityError};

/// Status used when the failure carries no status hint.
pub const DEFAULT_STATUS: u16 = 500;

/// A [`StabilityError`] raised while calling `integration.endpoint`.
///
/// ```
/// use tower_stability::{IntegrationFailure, StabilityError};
///
/// let failure = IntegrationFailure::new(
///     "billing",
///     "create_invoice",
///     StabilityError::CircuitOpen { name: "billing".into() },
/// );
///
/// assert_eq!(failure.status(), 503);
/// assert_eq!(
///     failure.detail(),
///     "CircuitOpen: billing.create_invoice: circuit breaker 'billing' is open"
/// );
/// ```
#[derive(Debug, thiserror::Error)]
#[error("{detail}")]
pub struct IntegrationFailure {
    integration: String,
    endpoint: String,
    status: u16,
    detail: String,
    #[source]
    error: StabilityError,
}

impl IntegrationFailure {
    pub fn new(
        integration: impl Into<String>,
        endpoint: impl Into<String>,
        error: StabilityError,
    ) -> Self {
        let integration = integration.into();
        let endpoint = endpoint.into();
        let status = error.http_status().unwrap_or(DEFAULT_STATUS);
        let detail = format!(
            "{}: {}.{}: {}",
            error.kind(),
            integration,
            endpoint,
            error.message()
        );

        Self {
            integration,
            endpoint,
            status,
            detail,
            error,
        }
    }

    /// Status hint of the underlying failure, or 500 when it has none.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// `"{kind}: {integration}.{endpoint}: {message}"`.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn integration(&self) -> &str {
        &self.integration
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn error(&self) -> &StabilityError {
        &self.error
    }

    pub fn into_error(self) -> StabilityError {
        self.error
    }
}

/// Attaches integration and endpoint names to a failed result.
pub trait IntegrationResultExt<T> {
    /// Maps the error into an [`IntegrationFailure`].
    fn at_endpoint(self, integration: &str, endpoint: &str) -> Result<T, IntegrationFailure>;
}

impl<T> IntegrationResultExt<T> for Result<T, StabilityError> {
    fn at_endpoint(self, integration: &str, endpoint: &str) -> Result<T, IntegrationFailure> {
        self.map_err(|error| IntegrationFailure::new(integration, endpoint, error))
    }
}
