//! Output formatting for sharpfix
//!
//! Supports text (colored terminal) and JSON output formats.

use colored::*;
use serde::{Deserialize, Serialize};
use sharpfix_rules::{Finding, Severity};
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// A single finding as shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct FindingInfo {
    pub rule: String,
    pub start: u32,
    pub end: u32,
    pub severity: Severity,
    pub message: String,
    /// Set when the finding was reported but its fix could not be built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfixable: Option<String>,
}

impl From<&Finding> for FindingInfo {
    fn from(finding: &Finding) -> Self {
        Self {
            rule: finding.rule_id.clone(),
            start: finding.span.start,
            end: finding.span.end,
            severity: finding.severity,
            message: finding.message.clone(),
            unfixable: None,
        }
    }
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<FindingInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn success(path: &Path, findings: Vec<FindingInfo>) -> Self {
        Self {
            path: path.display().to_string(),
            findings,
            error: None,
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            findings: Vec::new(),
            error: Some(error),
        }
    }

    #[cfg(test)]
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    #[cfg(test)]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_findings: usize,
    pub total_findings: usize,
    pub errors: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report a file's findings in check mode, with a preview of the fix
    pub fn report_check(&mut self, path: &Path, findings: Vec<FindingInfo>, before: &str, after: &str) {
        self.summary.files_processed += 1;

        if findings.is_empty() {
            self.report_clean(path);
            return;
        }

        self.summary.files_with_findings += 1;
        self.summary.total_findings += findings.len();

        if self.format == OutputFormat::Text {
            println!("{}", path.display().to_string().bold());
            for finding in &findings {
                print_finding(finding);
            }
            if before != after {
                println!();
                print_diff(before, after);
            }
            println!();
        }

        self.results.push(FileResult::success(path, findings));
    }

    /// Report a file after writing its fixed document
    pub fn report_fix(&mut self, path: &Path, findings: Vec<FindingInfo>, written: &Path) {
        self.summary.files_processed += 1;

        if findings.is_empty() {
            self.report_clean(path);
            return;
        }

        self.summary.files_with_findings += 1;
        self.summary.total_findings += findings.len();

        if self.format == OutputFormat::Text {
            let fixed = findings.iter().filter(|f| f.unfixable.is_none()).count();
            println!("{}", path.display().to_string().bold());
            println!(
                "  {} Applied {} fix(es), wrote {}",
                "OK".green(),
                fixed,
                written.display()
            );
            for finding in findings.iter().filter(|f| f.unfixable.is_some()) {
                print_finding(finding);
            }
            println!();
        }

        self.results.push(FileResult::success(path, findings));
    }

    /// Report a file with nothing to fix
    pub fn report_skipped(&mut self, path: &Path) {
        self.summary.files_processed += 1;
        self.report_clean(path);
    }

    fn report_clean(&mut self, path: &Path) {
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: No findings", path.display());
        }
        self.results.push(FileResult::success(path, vec![]));
    }

    /// Report an error processing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }

        self.results.push(FileResult::error(path, error.to_string()));
    }

    /// Print final summary/output
    pub fn finish(self, check_mode: bool) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!();
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                println!("  Files with findings: {}", self.summary.files_with_findings);
                println!("  Total findings: {}", self.summary.total_findings);
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }

                if check_mode && self.summary.total_findings > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply changes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    summary: self.summary,
                    files: self.results,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Ok(())
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

fn print_finding(finding: &FindingInfo) {
    let severity = match finding.severity {
        Severity::Error => finding.severity.to_string().red(),
        Severity::Warning => finding.severity.to_string().yellow(),
        Severity::Info => finding.severity.to_string().blue(),
    };
    println!(
        "  {}..{} {} [{}] {}",
        finding.start,
        finding.end,
        severity,
        finding.rule.cyan(),
        finding.message
    );
    if let Some(reason) = &finding.unfixable {
        println!("    {} {}", "no fix:".red(), reason);
    }
}

/// Print a colored diff between the rendered trees before and after fixing
fn print_diff(old: &str, new: &str) {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    for change in diff.iter_all_changes() {
        let line = change.to_string_lossy();
        let line = line.trim_end_matches('\n');
        match change.tag() {
            ChangeTag::Delete => println!("  {}", format!("- {}", line).red()),
            ChangeTag::Insert => println!("  {}", format!("+ {}", line).green()),
            ChangeTag::Equal => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpfix_core::Span;

    fn finding() -> Finding {
        Finding {
            rule_id: "NullEqualityAnalyzer".to_string(),
            span: Span::new(4, 15),
            message: "Use 'is' pattern".to_string(),
            severity: Severity::Warning,
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("TEXT"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("xml"), None);
    }

    #[test]
    fn test_finding_info_from_finding() {
        let info = FindingInfo::from(&finding());
        assert_eq!(info.rule, "NullEqualityAnalyzer");
        assert_eq!((info.start, info.end), (4, 15));
        assert_eq!(info.severity, Severity::Warning);
        assert!(info.unfixable.is_none());
    }

    #[test]
    fn test_file_result_success() {
        let result = FileResult::success(Path::new("Program.json"), vec![]);
        assert!(!result.has_findings());
        assert!(!result.has_error());
    }

    #[test]
    fn test_file_result_with_findings() {
        let result = FileResult::success(Path::new("Program.json"), vec![(&finding()).into()]);
        assert!(result.has_findings());
        assert!(!result.has_error());
    }

    #[test]
    fn test_file_result_error() {
        let result = FileResult::error(Path::new("Program.json"), "invalid document".to_string());
        assert!(!result.has_findings());
        assert!(result.has_error());
    }

    #[test]
    fn test_reporter_counts() {
        let mut reporter = Reporter::new(OutputFormat::Json, false);
        reporter.report_check(Path::new("a.json"), vec![(&finding()).into()], "a", "b");
        reporter.report_skipped(Path::new("b.json"));
        reporter.report_error(Path::new("c.json"), "broken");

        let summary = reporter.summary();
        assert_eq!(summary.files_processed, 3);
        assert_eq!(summary.files_with_findings, 1);
        assert_eq!(summary.total_findings, 1);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn test_json_serialization() {
        let output = JsonOutput {
            version: "0.1.0".to_string(),
            summary: Summary {
                files_processed: 10,
                files_with_findings: 3,
                total_findings: 7,
                errors: 0,
            },
            files: vec![FileResult::success(
                Path::new("Program.json"),
                vec![(&finding()).into()],
            )],
        };

        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"version\":\"0.1.0\""));
        assert!(json.contains("\"files_processed\":10"));
        assert!(json.contains("\"rule\":\"NullEqualityAnalyzer\""));
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(!json.contains("unfixable"));
    }
}
