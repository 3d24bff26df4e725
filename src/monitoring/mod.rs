/*!
 * Monitoring Module
 * Structured logging setup and command tracing
 */

pub mod tracer;

pub use tracer::{generate_trace_id, init_tracing, CommandSpan};
