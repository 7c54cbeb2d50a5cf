//! # Notebook Library
//!
//! This module provides the core logic for transforming Jupyter notebooks in the
//! grading pipeline. It supports parsing notebook documents into typed values,
//! producing student-safe variants with solutions and hidden tests removed, and
//! annotating instructor notebooks with the grading metadata the autograder needs.
//!
//! ## Key Concepts
//! - **Notebook / Cell**: Typed views over the ipynb JSON document. Unknown fields
//!   are carried through untouched so a transformed notebook round-trips cleanly.
//! - **Sanitization**: A sequential pipeline of pure transforms, each taking and
//!   returning an owned [`Notebook`] value.
//! - **Grading metadata**: Per-cell annotations (`grade_id`, points, solution/test
//!   flags) stored under the reserved `nbgrader` metadata key.

pub mod error;
pub mod metadata;
pub mod model;
pub mod transform;

pub use error::NotebookError;
pub use metadata::{inject_grading_metadata, restore_grading_metadata};
pub use model::{Cell, CellSource, Notebook};
pub use transform::sanitize_for_students;
