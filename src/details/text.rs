//! Formatters for text-processing stages: normalization, word and character
//! tokenization, and n-gram extraction.

use serde::Deserialize;

use super::{AttrMap, DetailError, decode, parse_bool, required, strip_pair_markers};

/// Case conversion applied by a text-normalizing stage, decoded from the
/// flattened `_caseMode` attribute (name or numeric wire code).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseMode {
  /// Convert to lowercase.
  Lower,
  /// Convert to uppercase.
  Upper,
  /// Leave case unchanged.
  None,
}

impl CaseMode {
  /// Parses the flattened attribute text: `Lower`/`Upper`/`None` or the
  /// wire codes 0/1/2.
  fn parse(text: &str) -> Option<Self> {
    match text {
      "Lower" | "0" => Some(Self::Lower),
      "Upper" | "1" => Some(Self::Upper),
      "None" | "2" => Some(Self::None),
      _ => None,
    }
  }
}

/// Describes a text-normalizing stage.
///
/// Enumerates the active operations in fixed order — punctuation removal,
/// number removal, diacritic removal, then case conversion (omitted when
/// unchanged) — prefixed by the affected columns.
pub(super) fn describe_normalize(attrs: &AttrMap) -> Result<String, DetailError> {
  let case_text = required(attrs, "_caseMode")?;
  let case_mode = CaseMode::parse(case_text).ok_or_else(|| DetailError::Parse {
    name: "_caseMode",
    value: case_text.to_string(),
  })?;
  let keep_diacritics = parse_bool(attrs, "_keepDiacritics")?;
  let keep_punctuation = parse_bool(attrs, "_keepPunctuations")?;
  let keep_numbers = parse_bool(attrs, "_keepNumbers")?;
  let columns = strip_pair_markers(required(attrs, "ColumnPairs")?);

  let mut ops = Vec::new();
  if !keep_punctuation {
    ops.push("remove punctuation");
  }
  if !keep_numbers {
    ops.push("remove numbers");
  }
  if !keep_diacritics {
    ops.push("remove diacritics");
  }
  match case_mode {
    CaseMode::Lower => ops.push("convert to lowercase"),
    CaseMode::Upper => ops.push("convert to uppercase"),
    CaseMode::None => {}
  }
  Ok(format!("On columns {columns}: {}", ops.join(", ")))
}

/// One word-tokenizing column record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WordTokenizingColumn {
  name: String,
  input_column_name: String,
  separators: Vec<String>,
}

impl WordTokenizingColumn {
  /// Whether the separator set is anything other than the default single
  /// space.
  fn has_custom_separators(&self) -> bool {
    !matches!(self.separators.as_slice(), [only] if only == " ")
  }
}

/// Describes a word-tokenizing stage: `Tokenize <input>` per column, with
/// the output name when renamed and the separator list when not the default
/// single space.
pub(super) fn describe_word_tokenize(attrs: &AttrMap) -> Result<String, DetailError> {
  let columns: Vec<WordTokenizingColumn> = decode(attrs, "_columns")?;
  let clauses: Vec<String> = columns
    .iter()
    .map(|column| {
      let mut clause = format!("Tokenize {}", column.input_column_name);
      if column.input_column_name != column.name {
        clause.push_str(&format!(" as {}", column.name));
      }
      if column.has_custom_separators() {
        clause.push_str(&format!(" using separators {}", column.separators.join(", ")));
      }
      clause
    })
    .collect();
  Ok(clauses.join(", "))
}

/// Describes a character-tokenizing stage.
pub(super) fn describe_char_tokenize(attrs: &AttrMap) -> Result<String, DetailError> {
  let use_marker_chars = parse_bool(attrs, "_useMarkerChars")?;
  let columns = strip_pair_markers(required(attrs, "ColumnPairs")?);
  let mut description = format!("Tokenize columns {columns}");
  if use_marker_chars {
    description.push_str(" using marker characters");
  }
  Ok(description)
}

/// N-gram extraction settings, from the stage's transform-info record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NgramTransformInfo {
  ngram_length: u32,
  skip_length: u32,
  use_all_lengths: bool,
}

/// The n-gram dictionary, of which only the entry count matters here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NgramMaps {
  count: u64,
}

/// Describes an n-gram-extracting stage: dictionary size, then the length
/// range (variable-length mode) or the single fixed length.
pub(super) fn describe_ngram(attrs: &AttrMap) -> Result<String, DetailError> {
  let info: NgramTransformInfo = decode(attrs, "_transformInfos")?;
  let maps: NgramMaps = decode(attrs, "_ngramMaps")?;

  let mut description = format!("Extract up to {} NGrams. ", maps.count);
  if info.use_all_lengths {
    description.push_str(&format!(
      "NGrams can have lengths from {} to {}",
      info.skip_length, info.ngram_length
    ));
  } else {
    description.push_str(&format!(
      "NGrams must have a length of {}",
      info.ngram_length
    ));
  }
  Ok(description)
}
