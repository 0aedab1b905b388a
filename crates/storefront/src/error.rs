//! Unified error handling with Sentry integration.
//!
//! Nothing in the widget is fatal: subsystems degrade to an empty or
//! placeholder state and hand their error to [`report`], which logs it and
//! captures it to Sentry. `AppError` is what the binary's startup path and
//! the static server return.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::catalog::LoadError;
use crate::config::ConfigError;
use crate::render::RenderError;
use crate::runtime::RuntimeError;

/// Application-level error type for the widget.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] LoadError),

    /// A template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// The widget event loop stopped unexpectedly.
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Socket or filesystem failure outside the storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        report(&self, "Request error");

        let status = match &self {
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Catalog(_) => "Catalog unavailable",
            _ => "Internal server error",
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Log `error` and capture it to Sentry.
///
/// With no Sentry client configured the capture is a no-op.
pub fn report(error: &(dyn std::error::Error + 'static), context: &str) {
    let event_id = sentry::capture_error(error);
    tracing::error!(
        error = %error,
        sentry_event_id = %event_id,
        "{context}"
    );
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "add_to_cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
