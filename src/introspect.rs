//! Type-label shortening and attribute flattening.
//!
//! Stage snapshots carry declared runtime type names in their raw form
//! (namespace-qualified, with `` `N `` arity markers and `+` nesting markers)
//! and attribute values in arbitrary JSON shapes. This module turns both into
//! readable text. Nothing here returns an error: unexpected shapes degrade to
//! empty strings or raw JSON, because detail extraction must keep going on
//! private layouts it only partially understands.

use serde_json::Value;

/// Shortens a raw runtime type name to its display form.
///
/// Strips the namespace, drops the generic-arity suffix at the first
/// backtick, and joins nested-type segments (`Outer+Inner`) with `.` so an
/// inner type still names its enclosing type.
///
/// ```rust
/// use pipescope::introspect::short_type_label;
///
/// assert_eq!(short_type_label("Microsoft.ML.Data.TransformerChain`1"), "TransformerChain");
/// assert_eq!(short_type_label("Ns.Outer+Inner`2"), "Outer.Inner");
/// ```
pub fn short_type_label(raw: &str) -> String {
  let type_part = raw.rsplit('.').next().unwrap_or(raw);
  type_part
    .split('+')
    .map(strip_arity)
    .collect::<Vec<_>>()
    .join(".")
}

/// Drops the backtick arity suffix from one type-name segment.
fn strip_arity(segment: &str) -> &str {
  match segment.find('`') {
    Some(index) if index > 0 => &segment[..index],
    _ => segment,
  }
}

/// Makes a label safe for diagram output.
///
/// Angle brackets collide with Mermaid node syntax and are replaced with
/// underscores.
pub fn display_label(label: &str) -> String {
  label.replace(['<', '>'], "_")
}

/// Flattens an attribute value to plain text.
///
/// Applied recursively: null is empty; a string is itself; an array is the
/// comma-joined flattening of its elements; everything else falls back to
/// compact JSON.
///
/// Column pairs arrive on the wire as two-string arrays *nested inside* an
/// enclosing array; only there does the pair rendering apply — the pair
/// collapses to the single label when both sides match and to
/// `(first, second)` otherwise. A top-level two-string array is a plain
/// value list (replacement values, selected columns) and is comma-joined
/// like any other.
pub fn value_to_text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(text) => text.clone(),
    Value::Array(items) => items
      .iter()
      .map(element_to_text)
      .collect::<Vec<_>>()
      .join(","),
    other => serde_json::to_string(other).unwrap_or_default(),
  }
}

/// Flattens one array element, where the pair rendering applies.
fn element_to_text(value: &Value) -> String {
  if let Value::Array(items) = value {
    match pair_labels(items) {
      Some((first, second)) if first == second => return first.to_string(),
      Some((first, second)) => return format!("({first}, {second})"),
      None => {}
    }
  }
  value_to_text(value)
}

/// Serializes an attribute value as pretty JSON for extractors that decode
/// structured column-option records.
pub fn value_to_json(value: &Value) -> String {
  serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Whether an attribute value should be carried as JSON rather than
/// flattened text: objects, and arrays of objects (column-option records).
pub fn is_structured(value: &Value) -> bool {
  match value {
    Value::Object(_) => true,
    Value::Array(items) => items.first().is_some_and(Value::is_object),
    _ => false,
  }
}

/// Views a two-element array of strings as a label pair.
fn pair_labels(items: &[Value]) -> Option<(&str, &str)> {
  match items {
    [Value::String(first), Value::String(second)] => Some((first, second)),
    _ => None,
  }
}
