//! Document linting - static analysis of a hyper-schema without resolving it.
//!
//! Unlike resolution, linting never aborts on the first problem. It reports:
//! - `$ref` values that do not resolve
//! - href tokens that do not resolve
//! - links missing `method` or `href`
//! - resources without a `description`

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::document::SchemaDocument;
use crate::error::LoadError;
use crate::link::href_references;
use crate::loader::{load_document, load_document_auto};
use crate::node::Node;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    /// JSON pointer to the issue (e.g., "/definitions/post/links/0")
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of linting one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }

    /// Like [`is_ok`](Self::is_ok), but warnings also fail when `strict`.
    pub fn passes(&self, strict: bool) -> bool {
        self.is_ok() && !(strict && self.warnings > 0)
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        self.diagnostics.push(diagnostic);
    }

    fn from_load_error(error: &LoadError) -> Self {
        let mut report = Self::default();
        report.push(Diagnostic::error("E000", "/", format!("load error: {}", error)));
        report
    }
}

/// Lint a loaded document.
pub fn lint(doc: &SchemaDocument) -> LintReport {
    let mut report = LintReport::default();

    check_refs(doc, doc.root(), "", &mut report);

    for (name, declaration) in doc.resources() {
        // A declaration that fails to dereference is already an E001.
        let Ok(resolved) = doc.dereference(declaration) else {
            continue;
        };
        let path = match resolved.reference {
            Some(reference) => reference.trim_start_matches('#').to_string(),
            None => format!("/properties/{}", escape(name)),
        };
        let node = Node(resolved.node);

        if node.description().map_or(true, str::is_empty) {
            report.push(Diagnostic::warning(
                "W001",
                path.clone(),
                format!("resource \"{}\" has no description", name),
            ));
        }

        if let Some(links) = node.get("links").and_then(Value::as_array) {
            for (index, link) in links.iter().enumerate() {
                check_link(doc, link, &format!("{}/links/{}", path, index), &mut report);
            }
        }
    }

    report
}

/// Lint a schema file, reporting load failures as `E000`.
pub fn lint_file(path: &Path) -> LintReport {
    match load_document(path) {
        Ok(doc) => lint(&doc),
        Err(e) => LintReport::from_load_error(&e),
    }
}

/// Lint a schema file path or URL, reporting load failures as `E000`.
pub fn lint_source(source: &str) -> LintReport {
    match load_document_auto(source) {
        Ok(doc) => lint(&doc),
        Err(e) => LintReport::from_load_error(&e),
    }
}

/// Recursively check `$ref` values in the document.
fn check_refs(doc: &SchemaDocument, value: &Value, path: &str, report: &mut LintReport) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                if let Err(e) = doc.resolve_ref(reference) {
                    report.push(Diagnostic::error(
                        "E001",
                        format!("{}/$ref", path),
                        e.to_string(),
                    ));
                }
            }

            for (key, val) in map {
                let child_path = format!("{}/{}", path, escape(key));
                check_refs(doc, val, &child_path, report);
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                let child_path = format!("{}/{}", path, i);
                check_refs(doc, item, &child_path, report);
            }
        }
        _ => {}
    }
}

fn check_link(doc: &SchemaDocument, link: &Value, path: &str, report: &mut LintReport) {
    let link = Node(link);

    for field in ["method", "href"] {
        if link.str_field(field).is_none() {
            report.push(Diagnostic::error(
                "E003",
                path,
                format!("link is missing required field \"{}\"", field),
            ));
        }
    }

    if let Some(href) = link.str_field("href") {
        for reference in href_references(href) {
            if let Err(e) = doc.resolve_ref(&reference) {
                report.push(Diagnostic::error("E002", format!("{}/href", path), e.to_string()));
            }
        }
    }
}

/// JSON pointer escaping for a single segment.
fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lint_value(value: Value) -> LintReport {
        lint(&SchemaDocument::new(value).unwrap())
    }

    fn codes(report: &LintReport) -> Vec<&str> {
        report.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn lint_clean_document() {
        let report = lint_value(json!({
            "definitions": {
                "post": {
                    "description": "A post",
                    "definitions": { "id": { "type": "string" } },
                    "properties": { "id": { "$ref": "#/definitions/post/definitions/id" } },
                    "links": [
                        { "method": "GET", "rel": "self", "href": "/posts/{(%23%2Fdefinitions%2Fpost%2Fdefinitions%2Fid)}" }
                    ]
                }
            },
            "properties": { "post": { "$ref": "#/definitions/post" } }
        }));
        assert!(report.is_ok());
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn lint_reports_every_broken_ref() {
        let report = lint_value(json!({
            "properties": {
                "post": {
                    "description": "A post",
                    "properties": {
                        "a": { "$ref": "#/definitions/missing" },
                        "b": { "$ref": "#/definitions/also_missing" }
                    }
                }
            }
        }));
        assert_eq!(report.errors, 2);
        assert_eq!(codes(&report), vec!["E001", "E001"]);
        assert_eq!(report.diagnostics[0].path, "/properties/post/properties/a/$ref");
    }

    #[test]
    fn lint_reports_broken_href_token() {
        let report = lint_value(json!({
            "properties": {
                "post": {
                    "description": "A post",
                    "links": [{ "method": "GET", "href": "/posts/{(#/definitions/nope)}" }]
                }
            }
        }));
        assert_eq!(codes(&report), vec!["E002"]);
        assert_eq!(report.diagnostics[0].path, "/properties/post/links/0/href");
    }

    #[test]
    fn lint_reports_malformed_links() {
        let report = lint_value(json!({
            "properties": {
                "post": {
                    "description": "A post",
                    "links": [{ "rel": "self" }]
                }
            }
        }));
        assert_eq!(codes(&report), vec!["E003", "E003"]);
        assert!(report.diagnostics[0].message.contains("method"));
        assert!(report.diagnostics[1].message.contains("href"));
    }

    #[test]
    fn lint_warns_on_missing_description() {
        let report = lint_value(json!({
            "definitions": { "user": { "type": "object" } },
            "properties": { "user": { "$ref": "#/definitions/user" } }
        }));
        assert!(report.is_ok());
        assert!(!report.passes(true));
        assert_eq!(report.warnings, 1);
        assert_eq!(report.diagnostics[0].code, "W001");
        assert_eq!(report.diagnostics[0].path, "/definitions/user");
    }

    #[test]
    fn lint_file_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not valid json }}").unwrap();

        let report = lint_file(file.path());
        assert!(!report.is_ok());
        assert_eq!(codes(&report), vec!["E000"]);
    }

    #[test]
    fn lint_source_missing_file() {
        let report = lint_source("/nonexistent/schema.json");
        assert_eq!(codes(&report), vec!["E000"]);
        assert!(report.diagnostics[0].message.contains("not found"));
    }
}
