//! Caller-contract errors for the visualization entry points.
//!
//! Everything that can go wrong *inside* a render — a missing attribute, an
//! unregistered stage kind, a column table that fails to decode — is handled
//! locally and degrades to an absent note for that one node. The only errors
//! surfaced to the caller are contract violations detected before any output
//! is produced.

/// Error returned by the visualization entry points.
#[derive(Debug, thiserror::Error)]
pub enum VisualizeError {
  /// The root value is not a stage object or stage array (e.g. null or a
  /// bare scalar). Nothing can be introspected from it.
  #[error("root value is not a stage object or stage array")]
  InvalidRoot,
  /// `max_depth` must be at least 1.
  #[error("max_depth must be >= 1, got {max_depth}")]
  InvalidDepth {
    /// The rejected depth value.
    max_depth: usize,
  },
}
