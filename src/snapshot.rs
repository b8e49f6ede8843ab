//! Snapshot model for closed pipeline stage objects.
//!
//! Trained transformer stages are opaque: their internal state is private and
//! was never designed for introspection. The engine therefore works on a
//! [`StageSnapshot`] — a JSON view of one stage, produced by the host from
//! whatever access it has (serialization hooks, debug dumps, bindings). The
//! snapshot is a read-only copy; building and rendering never touch the live
//! pipeline object.
//!
//! ## Snapshot shape
//!
//! A stage is a JSON object whose `$type` key carries the declared runtime
//! type name (possibly with an arity marker like `` TransformerChain`1 `` or
//! a nesting marker like `Outer+Inner`). Every other key is an internal
//! attribute, public or private alike. A composite stage carries its ordered
//! sub-stages in a `_chain` array. A bare JSON array is also accepted as a
//! root and means an anonymous chain.

use serde_json::Value;

use crate::error::VisualizeError;

/// Key holding the declared runtime type name of a stage.
pub const TYPE_KEY: &str = "$type";

/// Attribute holding a composite stage's ordered sub-stages.
pub const CHAIN_ATTR: &str = "_chain";

/// Type name reported for stages that carry no `$type` key.
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Type name implied for a bare-array root (an anonymous chain).
const ANONYMOUS_CHAIN_TYPE: &str = "TransformerChain";

/// A read-only JSON view of one pipeline stage.
///
/// All attribute access is best-effort: a missing attribute is `None`, never
/// an error, so callers can treat unknown internal layouts as partial rather
/// than fatal.
#[derive(Clone, Debug, PartialEq)]
pub struct StageSnapshot {
  value: Value,
}

impl StageSnapshot {
  /// Wraps a JSON value as a stage snapshot.
  ///
  /// Accepts an object (one stage) or an array (an anonymous chain). Null
  /// and scalar roots are rejected up front — there is nothing to inspect
  /// in them.
  pub fn from_value(value: Value) -> Result<Self, VisualizeError> {
    match value {
      Value::Object(_) | Value::Array(_) => Ok(Self { value }),
      _ => Err(VisualizeError::InvalidRoot),
    }
  }

  /// The declared runtime type name, as recorded in the snapshot.
  ///
  /// Arity and nesting markers are preserved here; see
  /// [`short_type_label`](crate::introspect::short_type_label) for the
  /// display form.
  pub fn type_name(&self) -> &str {
    match &self.value {
      Value::Array(_) => ANONYMOUS_CHAIN_TYPE,
      _ => self
        .value
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_TYPE),
    }
  }

  /// Reads a named internal attribute. Absent attributes yield `None`.
  pub fn attribute(&self, name: &str) -> Option<&Value> {
    if name == TYPE_KEY {
      return None;
    }
    self.value.get(name)
  }

  /// Attribute names in snapshot insertion order, `$type` excluded.
  pub fn attribute_names(&self) -> Vec<&str> {
    match &self.value {
      Value::Object(map) => map
        .keys()
        .map(String::as_str)
        .filter(|name| *name != TYPE_KEY)
        .collect(),
      _ => Vec::new(),
    }
  }

  /// The ordered sub-stages, when this snapshot is a composite.
  ///
  /// A snapshot is a composite when its `_chain` attribute holds the
  /// sub-stage array (directly, or one level down inside a wrapping chain
  /// object), or when the snapshot itself is an array. An empty declared
  /// chain yields `None`: such a stage is treated as a leaf.
  ///
  /// Chain entries that are not stage-shaped are skipped with a warning
  /// rather than failing the walk.
  pub fn chain(&self) -> Option<Vec<StageSnapshot>> {
    let items = match self.attribute(CHAIN_ATTR) {
      Some(Value::Array(items)) => items,
      // The chain attribute may hold a wrapping chain object instead of the
      // bare array; unwrap one level.
      Some(Value::Object(map)) => match map.get(CHAIN_ATTR) {
        Some(Value::Array(items)) => items,
        _ => return None,
      },
      Some(_) => return None,
      None => match &self.value {
        Value::Array(items) => items,
        _ => return None,
      },
    };
    if items.is_empty() {
      return None;
    }
    let stages = items
      .iter()
      .filter_map(|item| match Self::from_value(item.clone()) {
        Ok(stage) => Some(stage),
        Err(_) => {
          tracing::warn!(parent = self.type_name(), "skipping non-stage chain entry");
          None
        }
      })
      .collect();
    Some(stages)
  }

  /// The backing JSON value.
  pub fn as_value(&self) -> &Value {
    &self.value
  }
}

/// Adapter by which live pipeline types opt into visualization.
///
/// Implementors produce a fresh [`StageSnapshot`] of their current state;
/// the engine never reaches into the implementor beyond this call.
pub trait Inspect {
  /// Captures the stage's declared type and internal attributes.
  fn inspect(&self) -> StageSnapshot;
}
