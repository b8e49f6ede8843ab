//! Export a stage tree to Mermaid `stateDiagram-v2` source.
//!
//! Block ids are hierarchical: the root block is `t1`, its children `t1_1`,
//! `t1_2`, … and so on down the tree, so ids stay stable across renders of
//! the same pipeline. Layout direction alternates per nesting level (top-down
//! at the root, left-right one level in, …) to keep deep diagrams legible;
//! annotation notes follow the same orientation.

use crate::error::VisualizeError;
use crate::introspect::display_label;
use crate::tree::StageNode;

/// Diagram header token.
const DIAGRAM_HEADER: &str = "stateDiagram-v2";

/// Depth ceiling applied when the caller does not choose one.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Maximum note line width, in characters.
const MAX_NOTE_WIDTH: usize = 80;

/// Options controlling diagram expansion and annotation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderOptions {
  /// How many composite levels to expand inline; children below the ceiling
  /// render as unexpanded nodes. Must be at least 1.
  pub max_depth: usize,
  /// Whether to attach annotation notes to unexpanded nodes.
  pub annotate: bool,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      max_depth: DEFAULT_MAX_DEPTH,
      annotate: false,
    }
  }
}

/// Serializes a stage tree as `stateDiagram-v2` source.
///
/// A childless root renders as a single node declaration with no block.
/// Fails only when `max_depth` violates the caller contract; no partial
/// output is produced in that case.
pub fn render(root: &StageNode, options: &RenderOptions) -> Result<String, VisualizeError> {
  if options.max_depth < 1 {
    return Err(VisualizeError::InvalidDepth {
      max_depth: options.max_depth,
    });
  }

  let mut out = String::from(DIAGRAM_HEADER);
  out.push('\n');
  if root.is_leaf() {
    out.push_str(&format!("t1: {}\n", display_label(&root.label)));
  } else {
    render_block(&mut out, root, "1", false, options.annotate, options.max_depth);
  }
  Ok(out)
}

/// Emits one `state "<label>" AS t<prefix> { … }` block.
fn render_block(
  out: &mut String,
  parent: &StageNode,
  prefix: &str,
  left_right: bool,
  annotate: bool,
  depth: usize,
) {
  out.push_str(&format!(
    "state \"{}\" AS t{} {{\n",
    display_label(&parent.label),
    prefix
  ));
  if left_right {
    out.push_str("direction LR\n");
  }

  for (index, child) in parent.children.iter().enumerate() {
    let id = format!("{}_{}", prefix, index + 1);
    out.push_str(&format!("t{}: {}\n", id, display_label(&child.label)));

    let expanded = depth > 1 && !child.is_leaf();
    if expanded {
      render_block(out, child, &id, !left_right, annotate, depth - 1);
    }

    // Expanded parents speak for themselves; notes go on unexpanded nodes.
    if annotate && !expanded {
      push_note(out, &id, left_right, child.note.as_deref());
    }
  }

  // Successor edges model execution order between consecutive siblings.
  for index in 1..parent.children.len() {
    out.push_str(&format!("t{prefix}_{index} --> t{prefix}_{}\n", index + 1));
  }

  out.push_str("}\n");
}

/// Emits a `note left|right of t<id>` callout, word-wrapped.
fn push_note(out: &mut String, id: &str, left_right: bool, note: Option<&str>) {
  let Some(note) = note else { return };
  let side = if left_right { "left" } else { "right" };
  out.push_str(&format!("note {side} of t{id}\n"));
  for line in wrap_note(note, MAX_NOTE_WIDTH) {
    out.push_str(&line);
    out.push('\n');
  }
  out.push_str("end note\n");
}

/// Greedily word-wraps note text.
///
/// Each source line wraps independently; words are never split, so a single
/// word longer than `width` stands on its own line. Trailing whitespace is
/// trimmed from every emitted line.
fn wrap_note(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();
  for source_line in text.lines() {
    let mut line = String::new();
    for word in source_line.split(' ').filter(|word| !word.is_empty()) {
      if !line.is_empty() && line.len() + word.len() > width {
        lines.push(line.trim_end().to_string());
        line.clear();
      }
      line.push_str(word);
      line.push(' ');
    }
    let trimmed = line.trim_end();
    if !trimmed.is_empty() {
      lines.push(trimmed.to_string());
    }
  }
  lines
}

#[cfg(test)]
mod tests {
  use super::*;

  fn leaf(label: &str, note: Option<&str>) -> StageNode {
    StageNode {
      label: label.to_string(),
      children: Vec::new(),
      note: note.map(ToString::to_string),
    }
  }

  fn branch(label: &str, children: Vec<StageNode>) -> StageNode {
    let note = Some(format!("{} Child Transformers", children.len()));
    StageNode {
      label: label.to_string(),
      children,
      note,
    }
  }

  #[test]
  fn childless_root_is_a_single_declaration() {
    let root = leaf("PlainTransformer", None);
    let diagram = render(&root, &RenderOptions::default()).expect("valid options");
    assert_eq!(diagram, "stateDiagram-v2\nt1: PlainTransformer\n");
  }

  #[test]
  fn block_declares_children_and_successor_edges() {
    let root = branch("TransformerChain", vec![leaf("A", None), leaf("B", None), leaf("C", None)]);
    let diagram = render(&root, &RenderOptions::default()).expect("valid options");
    assert!(diagram.contains("state \"TransformerChain\" AS t1 {"));
    assert!(diagram.contains("t1_1: A"));
    assert!(diagram.contains("t1_2: B"));
    assert!(diagram.contains("t1_3: C"));
    assert!(diagram.contains("t1_1 --> t1_2"));
    assert!(diagram.contains("t1_2 --> t1_3"));
    assert!(!diagram.contains("t1_1 --> t1_3"), "no edge may skip a sibling");
    assert_eq!(diagram.matches(" --> ").count(), 2);
  }

  #[test]
  fn nested_blocks_alternate_direction() {
    let inner = branch("Inner", vec![leaf("X", None), leaf("Y", None)]);
    let root = branch("Outer", vec![inner]);
    let diagram = render(&root, &RenderOptions::default()).expect("valid options");
    assert!(diagram.contains("state \"Inner\" AS t1_1 {"));
    // Root block is top-down; the nested level flips to left-right.
    assert_eq!(diagram.matches("direction LR").count(), 1);
    assert!(diagram.contains("t1_1_1: X"));
    assert!(diagram.contains("t1_1_1 --> t1_1_2"));
  }

  #[test]
  fn depth_one_never_expands_children() {
    let inner = branch("Inner", vec![leaf("X", None)]);
    let root = branch("Outer", vec![inner]);
    let options = RenderOptions {
      max_depth: 1,
      ..RenderOptions::default()
    };
    let diagram = render(&root, &options).expect("valid options");
    assert!(diagram.contains("t1_1: Inner"));
    assert!(!diagram.contains("AS t1_1 {"));
  }

  #[test]
  fn depth_exhausted_child_still_gets_a_note_when_annotating() {
    let inner = branch("Inner", vec![leaf("X", None)]);
    let root = branch("Outer", vec![inner]);
    let options = RenderOptions {
      max_depth: 1,
      annotate: true,
    };
    let diagram = render(&root, &options).expect("valid options");
    assert!(diagram.contains("note right of t1_1\n1 Child Transformers\nend note"));
  }

  #[test]
  fn expanded_parents_get_no_note() {
    let inner = branch("Inner", vec![leaf("X", Some("leaf note"))]);
    let root = branch("Outer", vec![inner]);
    let options = RenderOptions {
      max_depth: 3,
      annotate: true,
    };
    let diagram = render(&root, &options).expect("valid options");
    assert!(!diagram.contains("note right of t1_1\n1"));
    // The leaf inside the expanded block sits at a left-right level, so its
    // note goes on the left.
    assert!(diagram.contains("note left of t1_1_1\nleaf note\nend note"));
  }

  #[test]
  fn noteless_children_emit_no_note_block() {
    let root = branch("Outer", vec![leaf("X", None)]);
    let options = RenderOptions {
      max_depth: 3,
      annotate: true,
    };
    let diagram = render(&root, &options).expect("valid options");
    assert!(!diagram.contains("note right of t1_1"));
  }

  #[test]
  fn angle_brackets_are_replaced_in_labels() {
    let root = branch("Chain<ITransformer>", vec![leaf("Leaf<T>", None)]);
    let diagram = render(&root, &RenderOptions::default()).expect("valid options");
    assert!(diagram.contains("state \"Chain_ITransformer_\" AS t1 {"));
    assert!(diagram.contains("t1_1: Leaf_T_"));
  }

  #[test]
  fn zero_depth_is_rejected_without_output() {
    let root = leaf("X", None);
    let options = RenderOptions {
      max_depth: 0,
      ..RenderOptions::default()
    };
    let error = render(&root, &options).expect_err("contract violation");
    assert!(matches!(error, VisualizeError::InvalidDepth { max_depth: 0 }));
  }

  #[test]
  fn notes_wrap_at_eighty_characters_without_splitting_words() {
    let words = vec!["transformer"; 20].join(" ");
    let lines = wrap_note(&words, MAX_NOTE_WIDTH);
    assert!(lines.len() > 1);
    for line in &lines {
      assert!(line.len() <= MAX_NOTE_WIDTH, "line too long: {line}");
      assert!(!line.ends_with(' '));
    }
    assert_eq!(lines.join(" "), words);
  }

  #[test]
  fn note_source_lines_wrap_independently() {
    let note = "first line\nsecond line";
    assert_eq!(wrap_note(note, MAX_NOTE_WIDTH), vec!["first line", "second line"]);
  }

  #[test]
  fn oversized_word_stands_alone() {
    let long_word = "x".repeat(120);
    let note = format!("short {long_word} tail");
    let lines = wrap_note(&note, MAX_NOTE_WIDTH);
    assert_eq!(lines, vec!["short".to_string(), long_word, "tail".to_string()]);
  }
}
