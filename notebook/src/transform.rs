//! Student-safe notebook sanitization.
//!
//! Instructor notebooks carry solution code and hidden tests between comment
//! marker pairs. [`sanitize_for_students`] strips both, replacing solutions
//! with a scaffold the student fills in and dropping hidden tests outright.

use crate::model::Notebook;

pub const BEGIN_SOLUTION: &str = "### BEGIN SOLUTION";
pub const BEGIN_SOLUTION_LOOSE: &str = "# BEGIN SOLUTION";
pub const END_SOLUTION: &str = "### END SOLUTION";
pub const END_SOLUTION_LOOSE: &str = "# END SOLUTION";
pub const BEGIN_HIDDEN_TESTS: &str = "### BEGIN HIDDEN TESTS";
pub const BEGIN_HIDDEN_TESTS_LOOSE: &str = "# BEGIN HIDDEN TESTS";
pub const END_HIDDEN_TESTS: &str = "### END HIDDEN TESTS";
pub const END_HIDDEN_TESTS_LOOSE: &str = "# END HIDDEN TESTS";

const SCAFFOLD_COMMENT: &str = "# YOUR CODE HERE";
const SCAFFOLD_RAISE: &str = "raise NotImplementedError()";

pub fn has_solution_markers(source: &str) -> bool {
    source.contains(BEGIN_SOLUTION) || source.contains(BEGIN_SOLUTION_LOOSE)
}

pub fn has_hidden_test_markers(source: &str) -> bool {
    source.contains(BEGIN_HIDDEN_TESTS) || source.contains(BEGIN_HIDDEN_TESTS_LOOSE)
}

/// Leading whitespace of a line, used to indent replacement scaffolding.
fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Remove code between begin/end solution markers.
///
/// The marker line's indentation carries over to the two replacement lines.
/// Markers themselves are suppressed. Only one nesting level is supported; an
/// unmatched begin marker suppresses through to the end of the cell.
pub fn strip_solution_code(source: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut in_solution = false;

    for line in source.split('\n') {
        if line.contains(BEGIN_SOLUTION) || line.contains(BEGIN_SOLUTION_LOOSE) {
            in_solution = true;
            let indent = leading_whitespace(line);
            result.push(format!("{indent}{SCAFFOLD_COMMENT}"));
            result.push(format!("{indent}{SCAFFOLD_RAISE}"));
            continue;
        } else if line.contains(END_SOLUTION) || line.contains(END_SOLUTION_LOOSE) {
            in_solution = false;
            continue;
        }
        if !in_solution {
            result.push(line.to_string());
        }
    }

    result.join("\n")
}

/// Remove code between begin/end hidden-test markers. Hidden tests vanish
/// entirely; no replacement lines are inserted.
pub fn strip_hidden_tests(source: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut in_hidden = false;

    for line in source.split('\n') {
        if line.contains(BEGIN_HIDDEN_TESTS) || line.contains(BEGIN_HIDDEN_TESTS_LOOSE) {
            in_hidden = true;
            continue;
        } else if line.contains(END_HIDDEN_TESTS) || line.contains(END_HIDDEN_TESTS_LOOSE) {
            in_hidden = false;
            continue;
        }
        if !in_hidden {
            result.push(line.to_string());
        }
    }

    result.join("\n")
}

/// Produce the student-safe variant of a notebook.
///
/// Code cells lose solution code first, then hidden tests; each step takes the
/// previous step's output, so a cell carrying both marker kinds is handled in
/// one sequential pass. Outputs and execution counters are cleared on every
/// cell. Idempotent: a sanitized notebook has no markers left to strip.
pub fn sanitize_for_students(mut notebook: Notebook) -> Notebook {
    for cell in &mut notebook.cells {
        if cell.is_code() {
            let source = cell.source_text();
            let had_solution = has_solution_markers(&source);
            let source = if had_solution {
                strip_solution_code(&source)
            } else {
                source
            };
            let had_hidden = has_hidden_test_markers(&source);
            let source = if had_hidden {
                strip_hidden_tests(&source)
            } else {
                source
            };
            if had_solution || had_hidden {
                cell.set_source(source);
            }
        }
        cell.clear_outputs();
    }
    notebook
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellSource;
    use serde_json::json;

    fn notebook_with_code(source: serde_json::Value) -> Notebook {
        let raw = json!({
            "cells": [{
                "cell_type": "code",
                "metadata": {},
                "source": source,
                "outputs": [{"output_type": "stream", "text": "1"}],
                "execution_count": 7
            }]
        });
        Notebook::from_slice(raw.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn solution_block_becomes_scaffold_at_marker_indent() {
        let source = "def f():\n    ### BEGIN SOLUTION\n    return 1\n    ### END SOLUTION\n";
        assert_eq!(
            strip_solution_code(source),
            "def f():\n    # YOUR CODE HERE\n    raise NotImplementedError()\n"
        );
    }

    #[test]
    fn loose_marker_variant_is_recognized() {
        let source = "# BEGIN SOLUTION\nsecret()\n# END SOLUTION";
        assert_eq!(
            strip_solution_code(source),
            "# YOUR CODE HERE\nraise NotImplementedError()"
        );
    }

    #[test]
    fn guarded_lines_and_markers_never_survive() {
        let source = "a\n### BEGIN SOLUTION\nhidden_one\nhidden_two\n### END SOLUTION\nb";
        let out = strip_solution_code(source);
        assert!(!out.contains("hidden_one"));
        assert!(!out.contains("hidden_two"));
        assert!(!out.contains("SOLUTION"));
        assert!(out.starts_with("a\n"));
        assert!(out.ends_with("\nb"));
    }

    #[test]
    fn hidden_tests_vanish_with_no_replacement() {
        let source = "assert f(1) == 1\n### BEGIN HIDDEN TESTS\nassert f(2) == 2\n### END HIDDEN TESTS\n";
        assert_eq!(strip_hidden_tests(source), "assert f(1) == 1\n");
    }

    #[test]
    fn unmatched_begin_marker_suppresses_to_end_of_cell() {
        let source = "a\n### BEGIN SOLUTION\nsecret\nmore secret";
        assert_eq!(
            strip_solution_code(source),
            "a\n# YOUR CODE HERE\nraise NotImplementedError()"
        );
    }

    #[test]
    fn sanitize_strips_both_marker_kinds_in_one_cell() {
        let nb = notebook_with_code(json!(
            "def f():\n    ### BEGIN SOLUTION\n    return 1\n    ### END SOLUTION\n\n### BEGIN HIDDEN TESTS\nassert f() == 1\n### END HIDDEN TESTS\n"
        ));
        let out = sanitize_for_students(nb);
        let text = out.cells[0].source_text();
        assert_eq!(
            text,
            "def f():\n    # YOUR CODE HERE\n    raise NotImplementedError()\n\n"
        );
    }

    #[test]
    fn sanitize_joins_line_list_sources() {
        let nb = notebook_with_code(json!([
            "def f():\n",
            "    ### BEGIN SOLUTION\n",
            "    return 1\n",
            "    ### END SOLUTION\n"
        ]));
        let out = sanitize_for_students(nb);
        assert_eq!(
            out.cells[0].source_text(),
            "def f():\n    # YOUR CODE HERE\n    raise NotImplementedError()\n"
        );
    }

    #[test]
    fn sanitize_clears_outputs_and_execution_count() {
        let nb = notebook_with_code(json!("print(1)"));
        let out = sanitize_for_students(nb);
        assert_eq!(out.cells[0].rest["outputs"], json!([]));
        assert_eq!(out.cells[0].rest["execution_count"], serde_json::Value::Null);
        // Unmarked source is left in its original form.
        assert_eq!(out.cells[0].source, CellSource::Text("print(1)".into()));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let nb = notebook_with_code(json!(
            "### BEGIN SOLUTION\nx = 1\n### END SOLUTION\n### BEGIN HIDDEN TESTS\nassert x\n### END HIDDEN TESTS"
        ));
        let once = sanitize_for_students(nb);
        let twice = sanitize_for_students(once.clone());
        assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );
    }

    #[test]
    fn markdown_cells_pass_through_unmodified() {
        let raw = json!({
            "cells": [{
                "cell_type": "markdown",
                "metadata": {},
                "source": "### BEGIN SOLUTION looks like a heading"
            }]
        });
        let nb = Notebook::from_slice(raw.to_string().as_bytes()).unwrap();
        let out = sanitize_for_students(nb);
        assert_eq!(
            out.cells[0].source_text(),
            "### BEGIN SOLUTION looks like a heading"
        );
    }
}
