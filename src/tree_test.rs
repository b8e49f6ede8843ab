//! Tests for the tree builder: composite detection, leaf annotation
//! dispatch, noisy-field filtering, and the feature-combining unwrap.

use serde_json::json;

use crate::details::DetailRegistry;
use crate::snapshot::StageSnapshot;
use crate::tree::TreeBuilder;

fn build(value: serde_json::Value) -> crate::tree::StageNode {
  let snapshot = StageSnapshot::from_value(value).expect("stage root");
  let registry = DetailRegistry::with_defaults();
  TreeBuilder::new(&registry).build(&snapshot)
}

#[test]
fn chain_becomes_branch_with_ordered_children() {
  let root = build(json!({
    "$type": "Microsoft.ML.Data.TransformerChain`1",
    "_chain": [
      { "$type": "MissingValueReplacingTransformer", "_repValues": ["NA", "NA"] },
      { "$type": "ColumnSelectingTransformer", "_selectedColumns": ["Label"] }
    ]
  }));
  assert_eq!(root.label, "TransformerChain");
  assert_eq!(root.children.len(), 2);
  assert_eq!(root.children[0].label, "MissingValueReplacingTransformer");
  assert_eq!(root.children[1].label, "ColumnSelectingTransformer");
  assert_eq!(root.note.as_deref(), Some("2 Child Transformers"));
}

#[test]
fn single_child_branch_names_the_child() {
  let root = build(json!({
    "$type": "TransformerChain`1",
    "_chain": [ { "$type": "ColumnSelectingTransformer", "_selectedColumns": ["A"] } ]
  }));
  assert_eq!(
    root.note.as_deref(),
    Some("1 Child Transformer: ColumnSelectingTransformer")
  );
}

#[test]
fn leaf_note_comes_from_the_registry() {
  let root = build(json!({
    "$type": "MissingValueReplacingTransformer",
    "_repValues": ["NA", "NA"]
  }));
  assert!(root.is_leaf());
  assert_eq!(
    root.note.as_deref(),
    Some("Replace missing values in 2 column(s) with NA")
  );
}

#[test]
fn every_replacement_value_counts_toward_its_column_group() {
  // Two columns replaced with the same value must report both, not collapse
  // into a single-label pair during flattening.
  let root = build(json!({
    "$type": "MissingValueReplacingTransformer",
    "_repValues": ["0", "0"]
  }));
  assert_eq!(
    root.note.as_deref(),
    Some("Replace missing values in 2 column(s) with 0")
  );
}

#[test]
fn two_selected_columns_are_comma_joined() {
  let root = build(json!({
    "$type": "ColumnSelectingTransformer",
    "_selectedColumns": ["Label", "Text"]
  }));
  assert_eq!(root.note.as_deref(), Some("Select columns Label,Text"));
}

#[test]
fn structured_columns_flow_to_the_formatter_as_json() {
  let root = build(json!({
    "$type": "TypeConvertingTransformer",
    "_columns": [ { "Name": "X", "InputColumnName": "X", "OutputKind": 10 } ]
  }));
  assert_eq!(root.note.as_deref(), Some("X to Double"));
}

#[test]
fn unknown_leaf_dumps_remaining_attributes() {
  let root = build(json!({
    "$type": "CustomScalingTransformer",
    "_factor": 2.5,
    "_columns2": ["A", "B", "C"]
  }));
  assert_eq!(root.note.as_deref(), Some("_factor: 2.5\n_columns2: A,B,C"));
}

#[test]
fn noisy_infrastructure_fields_are_filtered() {
  let root = build(json!({
    "$type": "CustomTransformer",
    "TrainSchema": { "columns": 12 },
    "_host": "env",
    "_columnsToKeepBitArray": [true, false],
    "_bindableMapper": {},
    "_value": "kept"
  }));
  assert_eq!(root.note.as_deref(), Some("_value: kept"));
}

#[test]
fn blank_attribute_values_are_dropped() {
  let root = build(json!({
    "$type": "CustomTransformer",
    "_empty": "",
    "_none": null,
    "_kept": "x"
  }));
  assert_eq!(root.note.as_deref(), Some("_kept: x"));
}

#[test]
fn leaf_with_no_attributes_has_no_note() {
  let root = build(json!({ "$type": "MysteryTransformer" }));
  assert!(root.is_leaf());
  assert_eq!(root.note, None);
}

#[test]
fn decode_failure_drops_the_note_but_not_the_sibling() {
  let root = build(json!({
    "$type": "Chain",
    "_chain": [
      // _columns records missing required fields: decode fails, note is skipped.
      { "$type": "TypeConvertingTransformer", "_columns": [ { "Wrong": true } ] },
      { "$type": "ColumnSelectingTransformer", "_selectedColumns": ["Label"] }
    ]
  }));
  assert_eq!(root.children[0].note, None);
  assert_eq!(root.children[1].note.as_deref(), Some("Select columns Label"));
}

#[test]
fn decode_failure_is_logged_with_the_stage_label() {
  use std::sync::{Arc, Mutex};

  #[derive(Clone, Default)]
  struct SharedBuf(Arc<Mutex<Vec<u8>>>);

  impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  let sink = SharedBuf::default();
  let writer = sink.clone();
  let subscriber = tracing_subscriber::fmt()
    .with_writer(move || writer.clone())
    .with_ansi(false)
    .finish();

  tracing::subscriber::with_default(subscriber, || {
    build(json!({
      "$type": "TypeConvertingTransformer",
      "_columns": [ { "Wrong": true } ]
    }));
  });

  let output = String::from_utf8(sink.0.lock().unwrap().clone()).expect("utf8 log");
  assert!(output.contains("skipping stage detail"), "log was: {output}");
  assert!(output.contains("TypeConvertingTransformer"));
}

#[test]
fn feature_combining_stage_exposes_its_inner_chain() {
  let root = build(json!({
    "$type": "OneHotEncodingTransformer",
    "_transformer": {
      "$type": "TransformerChain`1",
      "_chain": [
        { "$type": "ValueToKeyMappingTransformer", "ColumnPairs": [["Tokens", "Message"]] },
        { "$type": "KeyToVectorMappingTransformer", "ColumnPairs": [["Tokens", "Tokens"]] }
      ]
    }
  }));
  assert_eq!(root.label, "OneHotEncodingTransformer");
  assert_eq!(root.children.len(), 2);
  assert_eq!(root.children[0].label, "ValueToKeyMappingTransformer");
  assert_eq!(
    root.children[0].note.as_deref(),
    Some("Maps values in columns Tokens, Message to keys in a bag of words")
  );
  assert_eq!(root.note.as_deref(), Some("2 Child Transformers"));
}

#[test]
fn feature_combining_stage_without_inner_chain_stays_a_leaf() {
  let root = build(json!({
    "$type": "OneHotEncodingTransformer",
    "_transformer": { "$type": "PlainMapper" }
  }));
  assert!(root.is_leaf());
}

#[test]
fn nested_chains_build_recursively() {
  let root = build(json!({
    "$type": "TransformerChain`1",
    "_chain": [
      {
        "$type": "TransformerChain`1",
        "_chain": [ { "$type": "ColumnSelectingTransformer", "_selectedColumns": ["A"] } ]
      }
    ]
  }));
  assert_eq!(root.children.len(), 1);
  assert_eq!(root.children[0].children.len(), 1);
  assert_eq!(root.children[0].children[0].label, "ColumnSelectingTransformer");
}

#[test]
fn display_joins_label_and_note() {
  let node = build(json!({ "$type": "ColumnSelectingTransformer", "_selectedColumns": ["A"] }));
  assert_eq!(node.to_string(), "ColumnSelectingTransformer: Select columns A");
  let bare = build(json!({ "$type": "MysteryTransformer" }));
  assert_eq!(bare.to_string(), "MysteryTransformer");
}

#[test]
fn arity_markers_are_stripped_from_attribute_text() {
  let root = build(json!({
    "$type": "CustomTransformer",
    "_typeName": "TransformerChain`1"
  }));
  assert_eq!(root.note.as_deref(), Some("_typeName: TransformerChain1"));
}
