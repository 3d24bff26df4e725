/*!
 * Core Types
 * Common types used across the task manager
 */

/// Process ID type
pub type Pid = u32;

/// Timestamp in microseconds since the Unix epoch
pub type Timestamp = u64;
