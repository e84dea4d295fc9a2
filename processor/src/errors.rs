//! Errors `execute` can return. Match failure and input exhaustion are *not*
//! errors — they are ordinary, successful outcomes recorded in
//! [`crate::RunResult`]. The only thing that can actually fail `execute` is a
//! caller-supplied resource bound.

/// Raised when a run would exceed a configured [`crate::ExecutionLimits`] bound.
/// Never raised when no limit is configured: no cancellation and no timeouts is
/// the default, and limits are strictly opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("run exceeded the configured generation limit of {limit} (consumed {consumed} input items)")]
    GenerationLimitExceeded { limit: usize, consumed: usize },
}
