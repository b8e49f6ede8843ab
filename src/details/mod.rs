//! Detail extractor registry and per-stage-kind formatters.
//!
//! Each known stage kind gets a small formatter that reads the subset of the
//! attribute bag it understands and composes a one-or-more-line description
//! of what the stage does. Dispatch is an explicit registry value keyed by
//! short type label — no global registration state — so hosts can add
//! formatters for stage kinds this crate does not ship.
//!
//! Unregistered kinds fall back to a raw `key: value` dump of the attribute
//! bag in insertion order. Decode failures are typed ([`DetailError`]) and
//! local to one node: the tree builder logs and skips them without touching
//! sibling annotations.

use indexmap::IndexMap;

mod columns;
mod text;
mod vectors;

pub use columns::DataKind;
pub use text::CaseMode;
pub use vectors::NormFunction;

/// Flattened attribute bag handed to formatters: attribute name to textual
/// value (flattened text, or pretty JSON for structured column records), in
/// snapshot insertion order.
pub type AttrMap = IndexMap<String, String>;

/// A stage-kind formatter: attribute bag in, description out.
pub type DetailFn = fn(&AttrMap) -> Result<String, DetailError>;

/// Failure to extract detail from one stage's attributes.
///
/// Always local to a single node; the render continues without a note for
/// that node.
#[derive(Debug, thiserror::Error)]
pub enum DetailError {
  /// An attribute the formatter needs is not in the bag.
  #[error("attribute {name} is missing")]
  MissingAttribute {
    /// The absent attribute.
    name: &'static str,
  },
  /// A structured attribute did not decode as the expected record shape.
  #[error("attribute {name} did not decode: {source}")]
  Decode {
    /// The attribute that failed to decode.
    name: &'static str,
    /// The underlying JSON error.
    #[source]
    source: serde_json::Error,
  },
  /// A scalar attribute held a value the formatter cannot interpret.
  #[error("attribute {name} has unusable value '{value}'")]
  Parse {
    /// The attribute with the bad value.
    name: &'static str,
    /// The rejected textual value.
    value: String,
  },
}

/// Registry mapping short stage type labels to detail formatters.
#[derive(Clone)]
pub struct DetailRegistry {
  formatters: IndexMap<String, DetailFn>,
}

impl DetailRegistry {
  /// An empty registry: every stage kind uses the key/value fallback.
  pub fn new() -> Self {
    Self {
      formatters: IndexMap::new(),
    }
  }

  /// A registry with formatters for all stage kinds this crate knows.
  pub fn with_defaults() -> Self {
    let mut registry = Self::new();
    registry.register("TypeConvertingTransformer", columns::describe_type_convert);
    registry.register("ColumnConcatenatingTransformer", columns::describe_concat);
    registry.register("MissingValueReplacingTransformer", columns::describe_impute);
    registry.register("ColumnSelectingTransformer", columns::describe_select);
    registry.register("TextNormalizingTransformer", text::describe_normalize);
    registry.register("WordTokenizingTransformer", text::describe_word_tokenize);
    registry.register(
      "TokenizingByCharactersTransformer",
      text::describe_char_tokenize,
    );
    registry.register("NgramExtractingTransformer", text::describe_ngram);
    registry.register("LpNormNormalizingTransformer", vectors::describe_lp_norm);
    registry.register("ValueToKeyMappingTransformer", vectors::describe_value_to_key);
    registry.register(
      "KeyToVectorMappingTransformer",
      vectors::describe_key_to_vector,
    );
    registry
  }

  /// Registers (or replaces) the formatter for a stage type label.
  pub fn register(&mut self, label: impl Into<String>, formatter: DetailFn) {
    self.formatters.insert(label.into(), formatter);
  }

  /// Whether a formatter is registered for the label.
  pub fn contains(&self, label: &str) -> bool {
    self.formatters.contains_key(label)
  }

  /// Describes a leaf stage from its attribute bag.
  ///
  /// Dispatches by exact label; unregistered labels dump every `key: value`
  /// pair, one per line, in insertion order (the empty bag dumps to the
  /// empty string).
  pub fn describe(&self, label: &str, attrs: &AttrMap) -> Result<String, DetailError> {
    match self.formatters.get(label) {
      Some(formatter) => formatter(attrs),
      None => Ok(dump_attrs(attrs)),
    }
  }
}

impl Default for DetailRegistry {
  fn default() -> Self {
    Self::with_defaults()
  }
}

impl std::fmt::Debug for DetailRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DetailRegistry")
      .field("labels", &self.formatters.keys().collect::<Vec<_>>())
      .finish()
  }
}

/// Fallback description: every attribute as `key: value`, one per line.
fn dump_attrs(attrs: &AttrMap) -> String {
  attrs
    .iter()
    .map(|(name, value)| format!("{name}: {value}"))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Looks up a required attribute by name.
fn required<'a>(attrs: &'a AttrMap, name: &'static str) -> Result<&'a str, DetailError> {
  attrs
    .get(name)
    .map(String::as_str)
    .ok_or(DetailError::MissingAttribute { name })
}

/// Decodes a required attribute carried as JSON into a record shape.
fn decode<T: serde::de::DeserializeOwned>(
  attrs: &AttrMap,
  name: &'static str,
) -> Result<T, DetailError> {
  let json = required(attrs, name)?;
  serde_json::from_str(json).map_err(|source| DetailError::Decode { name, source })
}

/// Parses a required boolean attribute (`true`/`false`, case-insensitive).
fn parse_bool(attrs: &AttrMap, name: &'static str) -> Result<bool, DetailError> {
  let value = required(attrs, name)?;
  match value.to_ascii_lowercase().as_str() {
    "true" => Ok(true),
    "false" => Ok(false),
    _ => Err(DetailError::Parse {
      name,
      value: value.to_string(),
    }),
  }
}

/// Strips the parentheses that pair flattening puts around `(out, in)`
/// column pairs, leaving a plain column list.
fn strip_pair_markers(text: &str) -> String {
  text.replace(['(', ')'], "")
}
