//! Flock admin core
//!
//! Typed REST client and client-side domain logic for the Flock membership and
//! attendance dashboard: credentials with refresh-on-401, a tag-invalidated
//! query cache, the attendance batch builder, the student wizard and a single
//! role-based authorization policy.

pub mod api;
pub mod attendance;
pub mod auth;
pub mod cache;
pub mod config;
pub mod errors;
pub mod listing;
pub mod models;
pub mod policy;
pub mod stats;
pub mod store;
pub mod wizard;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use api::ApiClient;
pub use attendance::{AttendanceForm, EligibilityResolver, PresenceLedger, SessionParams, SubmitPhase};
pub use cache::{CacheEvent, EntityTag, QueryCache, QueryKey};
pub use config::{Config, LogFormat};
pub use errors::ApiError;
pub use store::Repository;
pub use wizard::StudentWizard;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Returns `false` when a subscriber
/// was already installed.
pub fn init_tracing(config: &Config) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests;
