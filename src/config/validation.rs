//! Configuration validation.

use crate::config::schema::EngineConfig;

/// A single validation failure, with the offending field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate an engine configuration, collecting every failure.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.polling.initial_interval_ms == 0 {
        errors.push(ValidationError {
            field: "polling.initial_interval_ms".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.polling.max_interval_ms < config.polling.initial_interval_ms {
        errors.push(ValidationError {
            field: "polling.max_interval_ms".into(),
            message: "must be at least polling.initial_interval_ms".into(),
        });
    }

    if config.polling.backoff_multiplier < 1.0 {
        errors.push(ValidationError {
            field: "polling.backoff_multiplier".into(),
            message: "must be at least 1.0".into(),
        });
    }

    if config.breaker.max_failures == 0 {
        errors.push(ValidationError {
            field: "breaker.max_failures".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.breaker.reset_timeout_ms == 0 {
        errors.push(ValidationError {
            field: "breaker.reset_timeout_ms".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.rate_limit.limit == 0 {
        errors.push(ValidationError {
            field: "rate_limit.limit".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.rate_limit.window_ms == 0 {
        errors.push(ValidationError {
            field: "rate_limit.window_ms".into(),
            message: "must be greater than zero".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
