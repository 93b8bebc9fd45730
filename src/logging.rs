//! # Structured Logging Module
//!
//! Environment-aware structured logging for persisted query resolution.
//! Console output by default, JSON lines when `APQ_LOG_FORMAT=json`.

use chrono::Utc;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::StoreError;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; only the first call installs a subscriber,
/// and an already-installed global subscriber (e.g. from the host
/// application) is left in place.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = wants_json_output();

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("APQ_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn wants_json_output() -> bool {
    std::env::var("APQ_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log one successful store call
pub fn log_store_operation(
    operation: &str,
    provider: &str,
    key: &str,
    status: &str,
    duration: Duration,
) {
    tracing::debug!(
        operation = %operation,
        provider = %provider,
        key = %key,
        status = %status,
        duration_us = duration.as_micros() as u64,
        "STORE_OPERATION"
    );
}

/// Log a store failure that is about to be recovered
pub fn log_store_failure(operation: &str, provider: &str, key: &str, error: &StoreError) {
    tracing::warn!(
        operation = %operation,
        provider = %provider,
        key = %key,
        error = %error,
        timestamp = %Utc::now().to_rfc3339(),
        "STORE_FAILURE"
    );
}

/// Log the outcome of resolving one batch item
pub fn log_resolution(
    resolver: &str,
    position: usize,
    hash: Option<&str>,
    outcome: &str,
    details: Option<&str>,
) {
    tracing::debug!(
        resolver = %resolver,
        position = position,
        hash = hash,
        outcome = %outcome,
        details = details,
        "PERSISTED_QUERY_RESOLUTION"
    );
}

/// Log a factory selection made while wiring the subsystem
pub fn log_registry_operation(kind: &str, requested: &str, selected: &str) {
    tracing::info!(
        kind = %kind,
        requested = %requested,
        selected = %selected,
        timestamp = %Utc::now().to_rfc3339(),
        "REGISTRY_OPERATION"
    );
}
