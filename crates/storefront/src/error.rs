//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for every command a screen or the CLI
//! can issue. Backend and storage failures are captured to Sentry through
//! [`AppError::report`] before the message is shown to the shopper.

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::shopify::ShopifyError;

/// Application-level error type for the shopping client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Shopify API operation failed.
    #[error("{0}")]
    Shopify(#[from] ShopifyError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command was issued in a state that does not allow it.
    #[error("{0}")]
    InvalidState(String),

    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// No cart has been created yet.
    #[must_use]
    pub fn no_active_cart() -> Self {
        Self::InvalidState("No active cart".to_string())
    }

    /// Message suitable for showing to the shopper.
    ///
    /// User errors from the backend are passed through verbatim; storage and
    /// configuration details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(_) => "Could not access saved data".to_string(),
            Self::Config(_) => "The app is not configured".to_string(),
            Self::Shopify(ShopifyError::RateLimited(_)) => {
                "Too many requests, please try again shortly".to_string()
            }
            Self::Shopify(ShopifyError::NotFound(_)) => "Not found".to_string(),
            _ => self.to_string(),
        }
    }

    /// Capture backend and storage failures to Sentry.
    ///
    /// Does nothing without an initialised Sentry client.
    pub fn report(&self) {
        if matches!(self, Self::Database(_) | Self::Shopify(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Screen-facing message for a failed command.
///
/// Falls back to `fallback` when the error renders as an empty string.
pub(crate) fn message_or(err: &AppError, fallback: &str) -> String {
    let message = err.user_message();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "gid://shopify/ProductVariant/1")]));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::UserError;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(ShopifyError::NotFound("product-123".to_string()));
        assert_eq!(err.to_string(), "Not found: product-123");
        assert_eq!(err.user_message(), "Not found");

        assert_eq!(AppError::no_active_cart().to_string(), "No active cart");
    }

    #[test]
    fn test_user_errors_pass_through() {
        let err = AppError::from(ShopifyError::UserError(vec![UserError {
            field: vec!["lines".to_string()],
            message: "Variant is sold out".to_string(),
        }]));
        assert_eq!(err.user_message(), "Variant is sold out");
    }

    #[test]
    fn test_database_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("bad row".to_string()));
        assert_eq!(err.user_message(), "Could not access saved data");
    }

    #[test]
    fn test_message_or_falls_back_on_empty() {
        let err = AppError::InvalidState(String::new());
        assert_eq!(message_or(&err, "Failed to update cart"), "Failed to update cart");

        let err = AppError::no_active_cart();
        assert_eq!(message_or(&err, "Failed to update cart"), "No active cart");
    }

    #[test]
    fn test_io_errors_are_not_invalid_state() {
        let err = AppError::from(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stdin closed",
        ));
        assert!(matches!(err, AppError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: stdin closed");
    }

    #[test]
    fn test_report_without_client_is_noop() {
        AppError::no_active_cart().report();
        AppError::Shopify(ShopifyError::RateLimited(1)).report();
    }
}
