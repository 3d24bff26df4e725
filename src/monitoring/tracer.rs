/*!
 * Structured Tracing
 * Subscriber setup and per-command spans using the tracing crate
 *
 * Features:
 * - Trace ID per command for log correlation
 * - Optional JSON-formatted logs for structured parsing
 * - Logs go to stderr so command output on stdout stays clean
 */

use crate::core::limits::{ENV_TRACE_JSON, SLOW_COMMAND_THRESHOLD_MS};
use std::time::Instant;
use tracing::{debug, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: warn, so the shell stays quiet)
/// - TASKMAN_TRACE_JSON: Enable JSON output (default: false)
///
/// Calling it more than once is harmless; later calls are ignored.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .compact(),
            )
            .try_init()
    };

    if result.is_ok() {
        debug!(json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one shell command, timed on drop
pub struct CommandSpan {
    span: tracing::Span,
    start: Instant,
    command: &'static str,
    trace_id: String,
}

impl CommandSpan {
    pub fn new(command: &'static str) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "command",
            trace_id = %trace_id,
            command = command,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            command,
            trace_id,
        }
    }

    /// Get the trace ID for this command
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Enter the span so registry logs are attributed to this command
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn record_success(&self) {
        self.span.record("result", "success");
    }

    /// Record an admission rejection; the command worked, the add was refused
    pub fn record_rejection(&self, reason: &str) {
        self.span.record("error", reason);
        self.span.record("result", "rejected");
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }
}

impl Drop for CommandSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration.as_millis() > SLOW_COMMAND_THRESHOLD_MS {
            warn!(
                trace_id = %self.trace_id,
                command = self.command,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow command detected"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                command = self.command,
                duration_us = duration.as_micros() as u64,
                "command completed"
            );
        }
    }
}
