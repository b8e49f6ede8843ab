//! # PipeScope
//!
//! Introspection and diagram rendering for opaque ML transformer pipelines.
//!
//! PipeScope takes a snapshot of a trained transformer chain (a possibly deeply
//! nested sequence of data-transformation stages), normalizes it into a tree of
//! stage nodes, and renders that tree as Mermaid `stateDiagram-v2` text with
//! optional plain-language annotations describing what each stage does.
//!
//! ## How it fits together
//!
//! - [`snapshot`] — the inspectable object model. Pipelines are closed types
//!   with no reflection surface, so the engine consumes a [`StageSnapshot`]:
//!   a JSON view of one stage's declared type and internal attributes,
//!   produced by the host (or by any type implementing [`Inspect`]).
//! - [`introspect`] — type-label shortening and best-effort attribute
//!   flattening. All failures degrade to absent or empty, never an error.
//! - [`details`] — the detail extractor registry: per-stage-kind formatters
//!   that turn an attribute bag into a readable note, with a raw key/value
//!   fallback for unknown kinds.
//! - [`tree`] — walks a snapshot, decides composite vs leaf, and builds the
//!   ordered [`StageNode`] tree.
//! - [`mermaid`] — serializes the tree into nested state-diagram blocks with
//!   stable hierarchical ids, successor edges, depth-limited expansion, and
//!   word-wrapped notes.
//!
//! ## Quick start
//!
//! ```rust
//! use pipescope::{RenderOptions, StageSnapshot, to_mermaid};
//! use serde_json::json;
//!
//! let snapshot = StageSnapshot::from_value(json!({
//!   "$type": "TransformerChain`1",
//!   "_chain": [
//!     { "$type": "ColumnSelectingTransformer", "_selectedColumns": ["Label", "Text"] }
//!   ]
//! }))?;
//!
//! let diagram = to_mermaid(&snapshot, &RenderOptions::default())?;
//! assert!(diagram.starts_with("stateDiagram-v2"));
//! # Ok::<(), pipescope::VisualizeError>(())
//! ```
//!
//! Rendering is synchronous, side-effect-free, and builds a fresh tree on
//! every call; nothing is cached and the source snapshot is never mutated.

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Caller-contract errors for the visualization entry points.
pub mod error;
/// Snapshot model for closed pipeline stage objects.
pub mod snapshot;
/// Type-label shortening and attribute flattening.
pub mod introspect;
/// Detail extractor registry and per-stage-kind formatters.
pub mod details;
/// Stage tree model and builder.
pub mod tree;
/// Mermaid state-diagram rendering.
pub mod mermaid;

pub use details::{AttrMap, DetailError, DetailRegistry};
pub use error::VisualizeError;
pub use mermaid::export::RenderOptions;
pub use snapshot::{Inspect, StageSnapshot};
pub use tree::{StageNode, TreeBuilder};

/// Renders a stage snapshot as Mermaid `stateDiagram-v2` text using the
/// default detail registry.
///
/// Builds a fresh [`StageNode`] tree from the snapshot and serializes it.
/// Fails only on caller-contract violations (`max_depth` < 1); malformed
/// per-stage detail is degraded, not fatal.
pub fn to_mermaid(
  snapshot: &StageSnapshot,
  options: &RenderOptions,
) -> Result<String, VisualizeError> {
  to_mermaid_with(snapshot, &DetailRegistry::with_defaults(), options)
}

/// Renders a stage snapshot with a caller-supplied detail registry.
///
/// Use this when the pipeline contains stage kinds the default registry does
/// not know about; register a formatter for their type label and it will be
/// dispatched exactly like the built-in ones.
pub fn to_mermaid_with(
  snapshot: &StageSnapshot,
  registry: &DetailRegistry,
  options: &RenderOptions,
) -> Result<String, VisualizeError> {
  let root = TreeBuilder::new(registry).build(snapshot);
  mermaid::export::render(&root, options)
}

/// Renders any [`Inspect`] pipeline object as Mermaid diagram text.
pub fn visualize<T: Inspect>(stage: &T, options: &RenderOptions) -> Result<String, VisualizeError> {
  to_mermaid(&stage.inspect(), options)
}

#[cfg(test)]
mod tree_test;
