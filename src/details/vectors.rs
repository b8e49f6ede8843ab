//! Formatters for vector-space stages: Lp-norm normalization, value-to-key
//! mapping, and key-to-vector (indicator) mapping.

use serde::Deserialize;

use super::{AttrMap, DetailError, decode, required, strip_pair_markers};

/// Norm function of an Lp-norm-normalizing stage, decoded from the numeric
/// wire code or the function name.
///
/// Serialized pipelines in the wild carry codes outside the documented 1-3
/// range (internal column state stores a different enum); those decode to
/// [`NormFunction::Code`] and are shown as the raw number rather than
/// costing the stage its whole annotation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NormFunction {
  /// Sum of absolute values.
  L1,
  /// Euclidean norm.
  L2,
  /// Maximum absolute value.
  Infinity,
  /// An unrecognized numeric wire code, shown as-is.
  Code(u64),
}

impl NormFunction {
  fn from_code(code: u64) -> Self {
    match code {
      1 => Self::L1,
      2 => Self::L2,
      3 => Self::Infinity,
      other => Self::Code(other),
    }
  }

  fn from_name(name: &str) -> Option<Self> {
    match name {
      "L1" => Some(Self::L1),
      "L2" => Some(Self::L2),
      "Infinity" => Some(Self::Infinity),
      _ => None,
    }
  }
}

impl std::fmt::Display for NormFunction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::L1 => f.write_str("L1"),
      Self::L2 => f.write_str("L2"),
      Self::Infinity => f.write_str("Infinity"),
      Self::Code(code) => write!(f, "{code}"),
    }
  }
}

impl<'de> Deserialize<'de> for NormFunction {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Code(u64),
      Name(String),
    }
    match Raw::deserialize(deserializer)? {
      Raw::Code(code) => Ok(Self::from_code(code)),
      Raw::Name(name) => Self::from_name(&name)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown norm '{name}'"))),
    }
  }
}

/// One normalizing column record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NormalizingColumn {
  name: String,
  input_column_name: String,
  norm: NormFunction,
  ensure_zero_mean: bool,
  scale: f64,
}

/// Describes an Lp-norm-normalizing stage, one line per column.
pub(super) fn describe_lp_norm(attrs: &AttrMap) -> Result<String, DetailError> {
  let columns: Vec<NormalizingColumn> = decode(attrs, "_columns")?;
  let lines: Vec<String> = columns
    .iter()
    .map(|column| {
      let mut line = format!(
        "Normalize {} via {} normalization",
        column.input_column_name, column.norm
      );
      if column.input_column_name != column.name {
        line.push_str(&format!(" as {}", column.name));
      }
      if column.ensure_zero_mean {
        line.push_str(" ensuring a zero mean");
      }
      if (column.scale - 1.0).abs() > f64::EPSILON {
        line.push_str(&format!(" scaling by {}x", column.scale));
      }
      line
    })
    .collect();
  Ok(lines.join("\n"))
}

/// Describes a value-to-key-mapping stage.
pub(super) fn describe_value_to_key(attrs: &AttrMap) -> Result<String, DetailError> {
  let columns = strip_pair_markers(required(attrs, "ColumnPairs")?);
  Ok(format!(
    "Maps values in columns {columns} to keys in a bag of words"
  ))
}

/// Describes a key-to-vector-mapping stage.
pub(super) fn describe_key_to_vector(attrs: &AttrMap) -> Result<String, DetailError> {
  let columns = strip_pair_markers(required(attrs, "ColumnPairs")?);
  Ok(format!("Convert columns {columns} to an indicator vector"))
}
