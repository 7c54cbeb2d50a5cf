//! Grading metadata injection and restoration.
//!
//! The autograder only grades cells carrying a metadata block under the
//! reserved `nbgrader` key. [`inject_grading_metadata`] derives those blocks
//! from the markers in an instructor notebook; [`restore_grading_metadata`]
//! copies them back onto a submission whose editing session stripped them.

use crate::model::Notebook;
use crate::transform::{has_hidden_test_markers, has_solution_markers};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Points assigned to each graded cell.
const DEFAULT_POINTS: u32 = 10;

/// Current grading metadata schema version.
const SCHEMA_VERSION: u32 = 3;

/// The per-cell grading annotation block.
///
/// Invariants: a solution cell never carries `points`; a cell with
/// `grade = true` always does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradingMetadata {
    pub grade_id: String,
    pub locked: bool,
    pub schema_version: u32,
    pub solution: bool,
    pub grade: bool,
    pub task: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

impl GradingMetadata {
    fn solution_cell(grade_id: String) -> Self {
        Self {
            grade_id,
            locked: false,
            schema_version: SCHEMA_VERSION,
            solution: true,
            grade: false,
            task: false,
            points: None,
        }
    }

    fn test_cell(grade_id: String, points: u32) -> Self {
        Self {
            grade_id,
            // Test cells are locked so students cannot edit assertions away.
            locked: true,
            schema_version: SCHEMA_VERSION,
            solution: false,
            grade: true,
            task: false,
            points: Some(points),
        }
    }
}

/// Annotate an instructor notebook with grading metadata.
///
/// Cells containing a solution marker, a hidden-test marker, or a visible
/// `assert` (when not already a hidden-test cell) receive sequential
/// `cell_<n>` grade identifiers in document order starting at 1. Test and
/// assertion cells get the default point value; solution cells get none.
/// All other cells are left without grading metadata.
pub fn inject_grading_metadata(mut notebook: Notebook) -> Notebook {
    let mut cell_counter = 0u32;
    let mut total_points = 0u32;

    for cell in &mut notebook.cells {
        let source = cell.source_text();

        let is_solution = has_solution_markers(&source);
        let is_test = has_hidden_test_markers(&source);
        let has_assert = source.contains("assert ") && !is_test;

        if !(is_solution || is_test || has_assert) {
            continue;
        }

        cell_counter += 1;
        let grade_id = format!("cell_{cell_counter}");

        let meta = if is_solution {
            GradingMetadata::solution_cell(grade_id)
        } else {
            total_points += DEFAULT_POINTS;
            GradingMetadata::test_cell(grade_id, DEFAULT_POINTS)
        };
        cell.set_grading_metadata(serde_json::to_value(meta).expect("metadata serializes"));
    }

    tracing::info!(
        graded_cells = cell_counter,
        total_points,
        "injected grading metadata"
    );
    notebook
}

/// Restore grading metadata on a submitted notebook from its instructor source.
///
/// Cells are matched by cell id; each matched cell gets the source cell's
/// metadata block verbatim. Returns the submitted notebook together with the
/// number of cells restored.
pub fn restore_grading_metadata(source: &Notebook, mut submitted: Notebook) -> (Notebook, usize) {
    let source_metadata: HashMap<&str, &Value> = source
        .cells
        .iter()
        .filter_map(|cell| {
            let id = cell.id.as_deref()?;
            Some((id, cell.grading_metadata()?))
        })
        .collect();

    let mut restored = 0;
    for cell in &mut submitted.cells {
        if let Some(id) = cell.id.as_deref() {
            if let Some(meta) = source_metadata.get(id) {
                cell.set_grading_metadata((*meta).clone());
                restored += 1;
            }
        }
    }

    (submitted, restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notebook(cells: serde_json::Value) -> Notebook {
        Notebook::from_slice(json!({ "cells": cells }).to_string().as_bytes()).unwrap()
    }

    #[test]
    fn grade_ids_are_sequential_in_document_order() {
        let nb = notebook(json!([
            {"cell_type": "markdown", "metadata": {}, "source": "intro"},
            {"cell_type": "code", "metadata": {}, "source": "### BEGIN SOLUTION\nx=1\n### END SOLUTION"},
            {"cell_type": "code", "metadata": {}, "source": "print('plain')"},
            {"cell_type": "code", "metadata": {}, "source": "assert x == 1"},
            {"cell_type": "code", "metadata": {}, "source": "### BEGIN HIDDEN TESTS\nassert x\n### END HIDDEN TESTS"}
        ]));
        let out = inject_grading_metadata(nb);

        let ids: Vec<Option<String>> = out
            .cells
            .iter()
            .map(|c| {
                c.grading_metadata()
                    .and_then(|m| m["grade_id"].as_str().map(String::from))
            })
            .collect();
        assert_eq!(
            ids,
            vec![
                None,
                Some("cell_1".into()),
                None,
                Some("cell_2".into()),
                Some("cell_3".into())
            ]
        );
    }

    #[test]
    fn solution_cells_carry_no_points() {
        let nb = notebook(json!([
            {"cell_type": "code", "metadata": {}, "source": "### BEGIN SOLUTION\nx=1\n### END SOLUTION"}
        ]));
        let out = inject_grading_metadata(nb);
        let meta = out.cells[0].grading_metadata().unwrap();
        assert_eq!(meta["solution"], true);
        assert_eq!(meta["grade"], false);
        assert_eq!(meta["locked"], false);
        assert!(meta.get("points").is_none());
    }

    #[test]
    fn test_cells_are_locked_and_graded_with_points() {
        let nb = notebook(json!([
            {"cell_type": "code", "metadata": {}, "source": "assert f() == 2"}
        ]));
        let out = inject_grading_metadata(nb);
        let meta = out.cells[0].grading_metadata().unwrap();
        assert_eq!(meta["grade"], true);
        assert_eq!(meta["points"], 10);
        assert_eq!(meta["locked"], true);
        assert_eq!(meta["schema_version"], 3);
    }

    #[test]
    fn unmarked_cells_receive_no_metadata() {
        let nb = notebook(json!([
            {"cell_type": "code", "metadata": {}, "source": "x = compute()"}
        ]));
        let out = inject_grading_metadata(nb);
        assert!(out.cells[0].grading_metadata().is_none());
    }

    #[test]
    fn restore_copies_blocks_onto_id_matched_cells() {
        let source = notebook(json!([
            {"cell_type": "code", "id": "c1", "metadata": {"nbgrader": {"grade_id": "cell_1", "grade": true, "points": 10}}, "source": "assert x"},
            {"cell_type": "code", "id": "c2", "metadata": {}, "source": "plain"}
        ]));
        let submitted = notebook(json!([
            {"cell_type": "code", "id": "c1", "metadata": {}, "source": "assert x"},
            {"cell_type": "code", "id": "c2", "metadata": {}, "source": "plain"},
            {"cell_type": "code", "id": "c3", "metadata": {}, "source": "student extra"}
        ]));

        let (restored, count) = restore_grading_metadata(&source, submitted);
        assert_eq!(count, 1);
        assert_eq!(
            restored.cells[0].grading_metadata().unwrap()["grade_id"],
            "cell_1"
        );
        assert!(restored.cells[1].grading_metadata().is_none());
        assert!(restored.cells[2].grading_metadata().is_none());
    }

    #[test]
    fn restore_without_ids_restores_nothing() {
        let source = notebook(json!([
            {"cell_type": "code", "metadata": {"nbgrader": {"grade_id": "cell_1"}}, "source": "assert x"}
        ]));
        let submitted = notebook(json!([
            {"cell_type": "code", "metadata": {}, "source": "assert x"}
        ]));
        let (_, count) = restore_grading_metadata(&source, submitted);
        assert_eq!(count, 0);
    }
}
