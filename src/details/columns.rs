//! Formatters for column-shaping stages: type conversion, concatenation,
//! missing-value imputation, and column selection.

use indexmap::IndexMap;
use serde::Deserialize;

use super::{AttrMap, DetailError, decode, required};

/// ML.NET column data kinds, decoded from either the numeric wire code or
/// the kind name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum DataKind {
  SByte,
  Byte,
  Int16,
  UInt16,
  Int32,
  UInt32,
  Int64,
  UInt64,
  Single,
  Double,
  String,
  Boolean,
  TimeSpan,
  DateTime,
  DateTimeOffset,
}

impl DataKind {
  const ALL: [DataKind; 15] = [
    Self::SByte,
    Self::Byte,
    Self::Int16,
    Self::UInt16,
    Self::Int32,
    Self::UInt32,
    Self::Int64,
    Self::UInt64,
    Self::Single,
    Self::Double,
    Self::String,
    Self::Boolean,
    Self::TimeSpan,
    Self::DateTime,
    Self::DateTimeOffset,
  ];

  /// Decodes the 1-based numeric wire code.
  fn from_code(code: u64) -> Option<Self> {
    let index = usize::try_from(code.checked_sub(1)?).ok()?;
    Self::ALL.get(index).copied()
  }

  fn from_name(name: &str) -> Option<Self> {
    Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
  }

  /// The kind name as it appears in descriptions.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::SByte => "SByte",
      Self::Byte => "Byte",
      Self::Int16 => "Int16",
      Self::UInt16 => "UInt16",
      Self::Int32 => "Int32",
      Self::UInt32 => "UInt32",
      Self::Int64 => "Int64",
      Self::UInt64 => "UInt64",
      Self::Single => "Single",
      Self::Double => "Double",
      Self::String => "String",
      Self::Boolean => "Boolean",
      Self::TimeSpan => "TimeSpan",
      Self::DateTime => "DateTime",
      Self::DateTimeOffset => "DateTimeOffset",
    }
  }
}

impl std::fmt::Display for DataKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl<'de> Deserialize<'de> for DataKind {
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
      Raw::Code(code) => Self::from_code(code)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown data kind code {code}"))),
      Raw::Name(name) => Self::from_name(&name)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown data kind '{name}'"))),
    }
  }
}

/// One column-conversion record from a type-converting stage.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TypeConvertColumn {
  name: String,
  input_column_name: String,
  output_kind: DataKind,
}

impl std::fmt::Display for TypeConvertColumn {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if self.name == self.input_column_name {
      write!(f, "{} to {}", self.input_column_name, self.output_kind)
    } else {
      write!(
        f,
        "{} to {} as {}",
        self.input_column_name, self.output_kind, self.name
      )
    }
  }
}

/// Describes a type-converting stage: one `<input> to <kind>` clause per
/// converted column, `as <output>` appended when the column is renamed.
pub(super) fn describe_type_convert(attrs: &AttrMap) -> Result<String, DetailError> {
  let columns: Vec<TypeConvertColumn> = decode(attrs, "_columns")?;
  let clauses: Vec<String> = columns.iter().map(ToString::to_string).collect();
  Ok(clauses.join(", "))
}

/// A source column reference in a concat record: either a bare name or an
/// `(output, input)` pair, of which the first element names the source.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceRef {
  Name(String),
  Pair(String, String),
}

impl SourceRef {
  fn name(&self) -> &str {
    match self {
      Self::Name(name) | Self::Pair(name, _) => name,
    }
  }
}

/// One concatenation record: output column and ordered source columns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConcatColumn {
  name: String,
  sources: Vec<SourceRef>,
}

/// Source count above which the concat description collapses to a count
/// instead of naming every column.
const MAX_NAMED_SOURCES: usize = 5;

/// Describes a column-concatenating stage.
///
/// `Concat <a>, <b> to <output>` per record; records with more than five
/// sources collapse to `Concat <N> columns to <output>`.
pub(super) fn describe_concat(attrs: &AttrMap) -> Result<String, DetailError> {
  let columns: Vec<ConcatColumn> = decode(attrs, "_columns")?;
  let clauses: Vec<String> = columns
    .iter()
    .map(|column| {
      if column.sources.len() > MAX_NAMED_SOURCES {
        format!("Concat {} columns to {}", column.sources.len(), column.name)
      } else {
        let sources: Vec<&str> = column.sources.iter().map(SourceRef::name).collect();
        format!("Concat {} to {}", sources.join(", "), column.name)
      }
    })
    .collect();
  Ok(clauses.join(", "))
}

/// Describes a missing-value-replacing stage.
///
/// Replacement values arrive as the flattened `_repValues` list; columns are
/// grouped by replacement value (first-occurrence order) and reported one
/// line per distinct value.
pub(super) fn describe_impute(attrs: &AttrMap) -> Result<String, DetailError> {
  let values = required(attrs, "_repValues")?;
  let mut groups: IndexMap<&str, usize> = IndexMap::new();
  for value in values.split(',').map(str::trim).filter(|v| !v.is_empty()) {
    *groups.entry(value).or_insert(0) += 1;
  }
  let lines: Vec<String> = groups
    .iter()
    .map(|(value, count)| format!("Replace missing values in {count} column(s) with {value}"))
    .collect();
  Ok(lines.join("\n"))
}

/// Describes a column-selecting stage.
pub(super) fn describe_select(attrs: &AttrMap) -> Result<String, DetailError> {
  let columns = required(attrs, "_selectedColumns")?;
  Ok(format!("Select columns {columns}"))
}
