//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Returns all validation
//! errors, not just the first, so a host can fix a config file in one pass.

use crate::config::schema::WalletLinkConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, accumulating every failure.
pub fn validate_config(config: &WalletLinkConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if url::Url::parse(&config.network.gateway_url).is_err() {
        errors.push(ValidationError {
            field: "network.gateway_url".to_string(),
            message: format!("not a valid URL: '{}'", config.network.gateway_url),
        });
    }

    if config.network.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "network.request_timeout_secs".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if url::Url::parse(&config.login.app_origin).is_err() {
        errors.push(ValidationError {
            field: "login.app_origin".to_string(),
            message: format!("not a valid URL: '{}'", config.login.app_origin),
        });
    }

    if config.tracker.poll_interval_ms == 0 {
        errors.push(ValidationError {
            field: "tracker.poll_interval_ms".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if config.tracker.max_poll_attempts == 0 {
        errors.push(ValidationError {
            field: "tracker.max_poll_attempts".to_string(),
            message: "must allow at least one attempt".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
