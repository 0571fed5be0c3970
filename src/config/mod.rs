//! Engine configuration: schema, loading, validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BreakerConfig, EngineConfig, ObservabilityConfig, PollingConfig, RateLimitConfig,
};
pub use validation::{validate_config, ValidationError};
