//! File processing logic for sharpfix

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use sharpfix_core::{validate_spans, Node, TypeTable};
use sharpfix_rules::Pipeline;

use crate::output::FindingInfo;

/// Suffix of the documents written in fix mode
pub const FIXED_SUFFIX: &str = ".fixed.json";

/// A syntax tree together with the binder's type facts for it
#[derive(Debug, Serialize, Deserialize)]
pub struct Document {
    pub tree: Node,
    #[serde(default)]
    pub types: TypeTable,
}

/// Result of processing a single file
#[derive(Debug)]
pub struct ProcessResult {
    /// Findings reported against the input tree
    pub findings: Vec<FindingInfo>,
    /// Rendered input tree
    pub before: String,
    /// Rendered tree after every fixable finding was applied
    pub after: String,
    /// The fixed document (only if something was fixed)
    pub fixed: Option<Document>,
}

/// Process a single document and return its findings and the fixed tree
pub fn process_file(path: &Path, pipeline: &Pipeline) -> Result<ProcessResult> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let document: Document = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid syntax tree document: {}", path.display()))?;
    process_document(document, pipeline)
}

pub fn process_document(document: Document, pipeline: &Pipeline) -> Result<ProcessResult> {
    validate_spans(&document.tree).context("Malformed syntax tree")?;

    let findings = pipeline.report(&document.tree, &document.types);
    debug!(findings = findings.len(), "scanned document");

    let before = document.tree.to_string();
    if findings.is_empty() {
        return Ok(ProcessResult {
            findings: vec![],
            after: before.clone(),
            before,
            fixed: None,
        });
    }

    let outcome = pipeline
        .fix_all(&document.tree, &document.types)
        .context("Failed to apply fixes")?;

    let findings = findings
        .iter()
        .map(|finding| {
            let mut info = FindingInfo::from(finding);
            info.unfixable = outcome
                .failed
                .iter()
                .find(|(failed, _)| failed == finding)
                .map(|(_, err)| err.to_string());
            info
        })
        .collect();

    let after = outcome.tree.to_string();
    let fixed = (!outcome.applied.is_empty()).then(|| Document {
        tree: outcome.tree,
        types: document.types,
    });

    Ok(ProcessResult {
        findings,
        before,
        after,
        fixed,
    })
}

/// Path the fixed document of `path` is written to: `Program.json` becomes
/// `Program.fixed.json`
pub fn fixed_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", stem, FIXED_SUFFIX))
}

/// Whether `path` is a document written by a previous fix run
pub fn is_fixed_output(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(FIXED_SUFFIX))
}

/// Write the fixed document next to its input
pub fn write_fixed(path: &Path, document: &Document) -> Result<PathBuf> {
    let target = fixed_path(path);
    let json = serde_json::to_string_pretty(document)
        .with_context(|| format!("Failed to serialize {}", target.display()))?;
    std::fs::write(&target, json)
        .with_context(|| format!("Failed to write file: {}", target.display()))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // if (val == null) { }
    const NULL_CHECK_TREE: &str = r#"{
        "kind": "if",
        "span": {"start": 0, "end": 20},
        "condition": {
            "kind": "binary",
            "span": {"start": 4, "end": 15},
            "operator": "equals",
            "left": {"kind": "identifier", "span": {"start": 4, "end": 7}, "name": "val"},
            "right": {"kind": "literal", "span": {"start": 11, "end": 15}, "value": "null"}
        },
        "then_branch": {"kind": "block", "span": {"start": 17, "end": 20}}
    }"#;

    // `val` is an int?
    const NULLABLE_INT_TYPES: &str = r#"[
        {"span": {"start": 4, "end": 7}, "fact": {"known": {"is_value_type": true}}},
        {"span": {"start": 11, "end": 15}, "fact": {"known": {"is_value_type": true}}}
    ]"#;

    fn null_check() -> String {
        format!(r#"{{"tree": {}, "types": {}}}"#, NULL_CHECK_TREE, NULLABLE_INT_TYPES)
    }

    fn write_doc(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_process_reports_and_fixes() {
        let temp = TempDir::new().unwrap();
        let path = write_doc(&temp, "Program.json", &null_check());

        let result = process_file(&path, &Pipeline::default()).unwrap();
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].rule, "NullEqualityAnalyzer");
        assert_eq!(result.before, "if (val == null) { }");
        assert_eq!(result.after, "if (val is null) { }");
        assert!(result.fixed.is_some());
    }

    #[test]
    fn test_without_types_nothing_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = write_doc(
            &temp,
            "Program.json",
            &format!(r#"{{"tree": {}}}"#, NULL_CHECK_TREE),
        );

        let result = process_file(&path, &Pipeline::default()).unwrap();
        assert!(result.findings.is_empty());
        assert_eq!(result.before, result.after);
        assert!(result.fixed.is_none());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_doc(&temp, "Broken.json", "{\"tree\": 42}");
        let err = process_file(&path, &Pipeline::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid syntax tree document"));
    }

    #[test]
    fn test_malformed_spans_are_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_doc(
            &temp,
            "Escaping.json",
            r#"{"tree": {
                "kind": "block",
                "span": {"start": 0, "end": 5},
                "statements": [{
                    "kind": "expression_statement",
                    "span": {"start": 2, "end": 9},
                    "expression": {"kind": "identifier", "span": {"start": 2, "end": 8}, "name": "x"}
                }]
            }}"#,
        );
        let err = process_file(&path, &Pipeline::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("Malformed syntax tree"));
    }

    #[test]
    fn test_write_fixed_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = write_doc(&temp, "Program.json", &null_check());
        let result = process_file(&path, &Pipeline::default()).unwrap();

        let written = write_fixed(&path, &result.fixed.unwrap()).unwrap();
        assert_eq!(written, temp.path().join("Program.fixed.json"));

        let again = process_file(&written, &Pipeline::default()).unwrap();
        assert!(again.findings.is_empty());
        assert_eq!(again.before, "if (val is null) { }");
    }

    #[test]
    fn test_fixed_output_names() {
        assert_eq!(
            fixed_path(Path::new("src/Program.json")),
            PathBuf::from("src/Program.fixed.json")
        );
        assert!(is_fixed_output(Path::new("src/Program.fixed.json")));
        assert!(!is_fixed_output(Path::new("src/Program.json")));
    }
}
