//! Stage tree model and builder.
//!
//! The tree builder walks a [`StageSnapshot`], decides for each stage whether
//! it is a composite (an ordered chain of sub-stages) or a leaf, and produces
//! a renderer-agnostic [`StageNode`] tree. Composite nodes get a child-count
//! note; leaf notes come from the [`DetailRegistry`]. The tree is built fresh
//! on every request and owns nothing of the source snapshot.

use crate::details::{AttrMap, DetailRegistry};
use crate::introspect::{display_label, is_structured, short_type_label, value_to_json, value_to_text};
use crate::snapshot::{CHAIN_ATTR, StageSnapshot};

/// Stage type whose real chain hides behind a private `_transformer`
/// attribute; the builder unwraps it instead of reporting an opaque leaf.
const FEATURE_COMBINING_LABEL: &str = "OneHotEncodingTransformer";

/// Attribute holding the wrapped inner transformer of a feature-combining
/// stage.
const INNER_TRANSFORMER_ATTR: &str = "_transformer";

/// Attribute-name fragments (matched case-insensitively) of infrastructure
/// state with no diagnostic value: training-schema bookkeeping, host/thread
/// handles, bit-array and mapper internals.
const NOISY_NAME_FRAGMENTS: [&str; 4] = ["trainschema", "host", "bitarray", "bindablemapper"];

/// One stage in the normalized tree: a branch (ordered sub-stages) or a leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct StageNode {
  /// Short, human-readable type label of the underlying stage.
  pub label: String,
  /// Sub-stages in execution order; empty for leaves.
  pub children: Vec<StageNode>,
  /// Descriptive annotation; `None` when there is nothing to say.
  pub note: Option<String>,
}

impl StageNode {
  /// Whether this node has no sub-stages.
  pub fn is_leaf(&self) -> bool {
    self.children.is_empty()
  }
}

impl std::fmt::Display for StageNode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.note {
      Some(note) => write!(f, "{}: {note}", self.label),
      None => f.write_str(&self.label),
    }
  }
}

/// Builds [`StageNode`] trees from stage snapshots.
pub struct TreeBuilder<'a> {
  registry: &'a DetailRegistry,
}

impl<'a> TreeBuilder<'a> {
  /// Creates a builder dispatching leaf descriptions to `registry`.
  pub fn new(registry: &'a DetailRegistry) -> Self {
    Self { registry }
  }

  /// Walks the snapshot and produces the normalized stage tree.
  ///
  /// Never fails: stages whose detail cannot be extracted simply get no
  /// note, and the walk continues with their siblings.
  pub fn build(&self, snapshot: &StageSnapshot) -> StageNode {
    let label = short_type_label(snapshot.type_name());

    if label == FEATURE_COMBINING_LABEL
      && let Some(children) = self.unwrap_inner_chain(snapshot)
    {
      return self.branch(label, children);
    }

    match snapshot.chain() {
      Some(stages) if !stages.is_empty() => {
        let children = stages.iter().map(|stage| self.build(stage)).collect();
        self.branch(label, children)
      }
      _ => self.leaf(snapshot, label),
    }
  }

  /// The chain hidden behind a feature-combining stage's inner transformer,
  /// when present.
  fn unwrap_inner_chain(&self, snapshot: &StageSnapshot) -> Option<Vec<StageNode>> {
    let inner = snapshot.attribute(INNER_TRANSFORMER_ATTR)?;
    let inner = StageSnapshot::from_value(inner.clone()).ok()?;
    let stages = inner.chain()?;
    tracing::debug!(
      stages = stages.len(),
      "unwrapped feature-combining inner chain"
    );
    Some(stages.iter().map(|stage| self.build(stage)).collect())
  }

  fn branch(&self, label: String, children: Vec<StageNode>) -> StageNode {
    let note = match children.len() {
      1 => format!("1 Child Transformer: {}", display_label(&children[0].label)),
      count => format!("{count} Child Transformers"),
    };
    StageNode {
      label,
      children,
      note: Some(note),
    }
  }

  fn leaf(&self, snapshot: &StageSnapshot, label: String) -> StageNode {
    let attrs = collect_attrs(snapshot);
    let note = match self.registry.describe(&label, &attrs) {
      Ok(text) => text,
      Err(error) => {
        tracing::warn!(stage = %label, %error, "skipping stage detail");
        String::new()
      }
    };
    StageNode {
      label,
      children: Vec::new(),
      note: (!note.trim().is_empty()).then_some(note),
    }
  }
}

/// Collects a leaf's attributes into the flattened bag handed to detail
/// formatters.
///
/// Noisy infrastructure fields are dropped; structured column records are
/// carried as JSON, everything else as flattened text with arity backticks
/// stripped; blank values are omitted.
fn collect_attrs(snapshot: &StageSnapshot) -> AttrMap {
  let mut attrs = AttrMap::new();
  for name in snapshot.attribute_names() {
    if is_noisy(name) {
      continue;
    }
    let Some(value) = snapshot.attribute(name) else {
      continue;
    };
    let text = if is_structured(value) {
      value_to_json(value)
    } else {
      value_to_text(value).replace('`', "")
    };
    if text.trim().is_empty() {
      continue;
    }
    attrs.insert(name.replace('`', ""), text);
  }
  attrs
}

fn is_noisy(name: &str) -> bool {
  if name == CHAIN_ATTR || name == INNER_TRANSFORMER_ATTR {
    return true;
  }
  let lowered = name.to_ascii_lowercase();
  NOISY_NAME_FRAGMENTS
    .iter()
    .any(|fragment| lowered.contains(fragment))
}
