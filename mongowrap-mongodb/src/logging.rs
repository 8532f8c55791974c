//! Logging setup.
//!
//! The crates emit `tracing` events; applications that don't install their
//! own subscriber can call [`init`] (requires the `tracing-subscriber`
//! feature).
//!
//! # Environment Variables
//!
//! - `MONGOWRAP_DEBUG=true|1|yes` - enable debug logging
//! - `MONGOWRAP_LOG_LEVEL=trace|debug|info|warn|error` - set the level
//! - `MONGOWRAP_LOG_FORMAT=json|pretty|compact` - output format (default: json)

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Whether `MONGOWRAP_DEBUG` is set to a truthy value.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("MONGOWRAP_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The log level from `MONGOWRAP_LOG_LEVEL`.
///
/// Falls back to "debug" when `MONGOWRAP_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };

    match env::var("MONGOWRAP_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// The output format from `MONGOWRAP_LOG_FORMAT`, defaulting to "json".
pub fn get_log_format() -> &'static str {
    env::var("MONGOWRAP_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install a global subscriber for the mongowrap crates.
///
/// Does nothing unless `MONGOWRAP_DEBUG` or `MONGOWRAP_LOG_LEVEL` is set.
/// Only the first call has any effect.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("MONGOWRAP_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "mongowrap={level},mongowrap_mongodb={level},mongowrap_pipeline={level},mongodb=warn"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let result = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if result.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "mongowrap logging initialized"
                );
            }
        }
    });
}
