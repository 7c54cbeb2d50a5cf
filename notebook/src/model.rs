use crate::error::NotebookError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::io::{Read, Write};
use std::path::Path;

/// Reserved metadata key under which grading annotations live.
pub const GRADING_METADATA_KEY: &str = "nbgrader";

/// A cell source as stored in ipynb: either a single string or a list of lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl CellSource {
    /// The cell source as one string, joining line lists without separators
    /// (ipynb line lists already carry their trailing newlines).
    pub fn as_text(&self) -> String {
        match self {
            CellSource::Text(s) => s.clone(),
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Text(String::new())
    }
}

/// One notebook cell. Fields the transform engine touches are typed; everything
/// else (`outputs`, `execution_count`, nbformat extras) rides along in `rest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub source: CellSource,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Cell {
    pub fn is_code(&self) -> bool {
        self.cell_type == "code"
    }

    pub fn source_text(&self) -> String {
        self.source.as_text()
    }

    pub fn set_source(&mut self, source: String) {
        self.source = CellSource::Text(source);
    }

    /// Clear execution artifacts if the cell carries them. Output fields are
    /// cleared on every transformed copy regardless of cell type.
    pub fn clear_outputs(&mut self) {
        if self.rest.contains_key("outputs") {
            self.rest.insert("outputs".into(), json!([]));
        }
        if self.rest.contains_key("execution_count") {
            self.rest.insert("execution_count".into(), Value::Null);
        }
    }

    /// The grading metadata block, if the cell has one.
    pub fn grading_metadata(&self) -> Option<&Value> {
        self.metadata.get(GRADING_METADATA_KEY)
    }

    pub fn set_grading_metadata(&mut self, meta: Value) {
        self.metadata.insert(GRADING_METADATA_KEY.into(), meta);
    }
}

/// A notebook document: an ordered sequence of cells plus top-level fields
/// (nbformat, kernel metadata) carried through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Notebook {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, NotebookError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, NotebookError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, NotebookError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, NotebookError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), NotebookError> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), NotebookError> {
        let file = std::fs::File::create(path)?;
        self.to_writer(std::io::BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_joins_line_lists_without_separators() {
        let source = CellSource::Lines(vec!["def f():\n".into(), "    return 1\n".into()]);
        assert_eq!(source.as_text(), "def f():\n    return 1\n");
    }

    #[test]
    fn malformed_documents_are_a_parse_failure() {
        let err = Notebook::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, NotebookError::Parse(_)));
    }

    #[test]
    fn unknown_fields_round_trip() {
        let raw = serde_json::json!({
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {"kernelspec": {"name": "python3"}},
            "cells": [{
                "cell_type": "code",
                "id": "abc",
                "metadata": {},
                "source": "print(1)",
                "outputs": [{"output_type": "stream"}],
                "execution_count": 3
            }]
        });
        let nb = Notebook::from_slice(raw.to_string().as_bytes()).unwrap();
        let back: Value = serde_json::from_slice(&nb.to_vec().unwrap()).unwrap();
        assert_eq!(back["nbformat"], 4);
        assert_eq!(back["cells"][0]["execution_count"], 3);
        assert_eq!(back["cells"][0]["id"], "abc");
    }

    #[test]
    fn clear_outputs_only_touches_present_fields() {
        let raw = serde_json::json!({
            "cells": [
                {"cell_type": "code", "metadata": {}, "source": "", "outputs": [{"a": 1}], "execution_count": 2},
                {"cell_type": "markdown", "metadata": {}, "source": "hi"}
            ]
        });
        let mut nb = Notebook::from_slice(raw.to_string().as_bytes()).unwrap();
        for cell in &mut nb.cells {
            cell.clear_outputs();
        }
        assert_eq!(nb.cells[0].rest["outputs"], json!([]));
        assert_eq!(nb.cells[0].rest["execution_count"], Value::Null);
        assert!(!nb.cells[1].rest.contains_key("outputs"));
    }
}
