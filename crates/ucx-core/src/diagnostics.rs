//! Diagnostics collected while validating, assembling and solving a model.
//!
//! Non-fatal findings (a part-load unit without start-up energy, a very large
//! capacity bound next to boolean variables, a boolean returned off {0, 1})
//! are gathered here instead of aborting the run.
//!
//! # Example
//!
//! ```
//! use ucx_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_with_entity("validation", "no start-up energy", "2020.Mid.Gas plant");
//! diag.add_warning_at_step("integrality", "run = 0.4", "2020.Mid.Gas plant", 3);
//!
//! assert_eq!(diag.warning_count(), 2);
//! assert_eq!(diag.summary(), "2 warnings");
//! ```

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but the run continued
    Warning,
    /// Configuration error, no model can be built
    Error,
}

/// A single diagnostic issue
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping ("validation", "integrality", "horizon", ...)
    pub category: String,
    pub message: String,
    /// Entity label, e.g. "2020.Mid.Gas plant"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Timestep label the issue refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
            step: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_step(mut self, step: u32) -> Self {
        self.step = Some(step);
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        if let Some(step) = self.step {
            write!(f, " at t={}", step)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_warning_at_step(&mut self, category: &str, message: &str, entity: &str, step: u32) {
        self.issues.push(
            DiagnosticIssue::new(Severity::Warning, category, message)
                .with_entity(entity)
                .with_step(step),
        );
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    pub fn add_error(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message));
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    /// One-line count, e.g. "2 warnings, 1 error".
    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, plural(w)),
            (0, e) => format!("{} error{}", e, plural(e)),
            (w, e) => format!("{} warning{}, {} error{}", w, plural(w), e, plural(e)),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_counts() {
        let mut diag = Diagnostics::new();
        diag.add_warning("validation", "test warning");
        diag.add_error("validation", "test error");
        diag.add_warning_at_step("integrality", "run = 0.5", "2020.Mid.Coal", 4);

        assert_eq!(diag.warning_count(), 2);
        assert_eq!(diag.error_count(), 1);
        assert!(diag.has_issues());
        assert!(diag.has_errors());
    }

    #[test]
    fn test_diagnostic_issue_display() {
        let issue = DiagnosticIssue::new(Severity::Warning, "integrality", "startup = 0.3")
            .with_entity("2020.Mid.Coal")
            .with_step(7);

        let display = issue.to_string();
        assert_eq!(display, "[warning:integrality] startup = 0.3 (2020.Mid.Coal) at t=7");
    }

    #[test]
    fn test_diagnostics_serialization() {
        let mut diag = Diagnostics::new();
        diag.add_warning_at_step("integrality", "build = 0.5", "2020.Mid.Coal", 3);
        diag.add_error("config", "bad horizon");

        let json = serde_json::to_string_pretty(&diag).unwrap();
        assert!(json.contains("\"warning\""));
        assert!(json.contains("\"step\": 3"));
        assert!(json.contains("\"entity\": \"2020.Mid.Coal\""));
        assert!(!json.contains("\"entity\": null"));
    }

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "No issues");

        diag.add_warning("validation", "warning");
        assert_eq!(diag.summary(), "1 warning");

        diag.add_error("validation", "error");
        assert_eq!(diag.summary(), "1 warning, 1 error");

        diag.add_warning("validation", "another warning");
        assert_eq!(diag.summary(), "2 warnings, 1 error");
    }

    #[test]
    fn test_issues_by_category_and_merge() {
        let mut diag = Diagnostics::new();
        diag.add_warning("validation", "large cap-up");

        let mut other = Diagnostics::new();
        other.add_warning("integrality", "build = 0.5");
        other.add_warning("integrality", "run = 0.5");
        diag.merge(other);

        assert_eq!(diag.issues_by_category("integrality").count(), 2);
        assert_eq!(diag.issues_by_category("validation").count(), 1);
    }
}
