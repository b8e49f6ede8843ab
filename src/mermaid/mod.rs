//! Mermaid state-diagram rendering for stage trees.
//!
//! Serializes a [`StageNode`](crate::tree::StageNode) tree into
//! `stateDiagram-v2` source: nested named state blocks with stable
//! hierarchical ids, successor edges between consecutive siblings, optional
//! word-wrapped annotation notes, and a caller-supplied depth ceiling. The
//! output is plain text; displaying it is the host's concern.

pub mod export;
