//! Diagnostics produced while generating documents.
//!
//! Recoverable problems never abort generation. They are recorded as [`Diagnostic`]s and
//! returned next to the generated documents for the caller to report.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Hint,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Hint => write!(f, "HINT"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Catalogue of diagnostic conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Two stages of an interceptor chain bind the same parameter to unrelated types.
    IncompatibleParameterType {
        param: String,
        existing: String,
        incoming: String,
    },
    /// A parameter conflict was settled in favour of the target resource's type.
    DefaultedToTargetType { param: String, ty: String },
    /// Resources with rest parameters cannot be expressed as OpenAPI paths.
    RestParameterNotSupported { path: String },
    /// `default` resources accept every method and have no single OpenAPI operation.
    DefaultMethodNotSupported { path: String },
    InvalidConstraintValue {
        facet: String,
        value: String,
        type_name: String,
    },
    ResourceAnalysisFailed { resource: String, message: String },
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::IncompatibleParameterType { .. } => "BAL_OAS_101",
            DiagnosticKind::DefaultedToTargetType { .. } => "BAL_OAS_102",
            DiagnosticKind::RestParameterNotSupported { .. } => "BAL_OAS_201",
            DiagnosticKind::DefaultMethodNotSupported { .. } => "BAL_OAS_202",
            DiagnosticKind::InvalidConstraintValue { .. } => "BAL_OAS_301",
            DiagnosticKind::ResourceAnalysisFailed { .. } => "BAL_OAS_401",
        }
    }

    pub fn message(&self) -> String {
        match self {
            DiagnosticKind::IncompatibleParameterType {
                param,
                existing,
                incoming,
            } => format!(
                "incompatible types for parameter '{}' in the interceptor chain: '{}' and '{}'",
                param, existing, incoming
            ),
            DiagnosticKind::DefaultedToTargetType { param, ty } => format!(
                "parameter '{}' has incompatible interceptor types, defaulting to the target resource type '{}'",
                param, ty
            ),
            DiagnosticKind::RestParameterNotSupported { path } => format!(
                "resource '{}' has a rest path parameter and is not included in the document",
                path
            ),
            DiagnosticKind::DefaultMethodNotSupported { path } => format!(
                "resource '{}' uses the 'default' accessor and is not included in the document",
                path
            ),
            DiagnosticKind::InvalidConstraintValue {
                facet,
                value,
                type_name,
            } => format!(
                "constraint '{}' of '{}' has a non-numeric value '{}' and is ignored",
                facet, type_name, value
            ),
            DiagnosticKind::ResourceAnalysisFailed { resource, message } => {
                format!("could not generate resource '{}': {}", resource, message)
            }
        }
    }
}

/// A reported condition with its severity and optional location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub location: Option<String>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            location: None,
        }
    }

    pub fn error(kind: DiagnosticKind) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> String {
        self.kind.message()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {} {}", self.severity, self.code(), self.message())?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_location() {
        let diagnostic = Diagnostic::warning(DiagnosticKind::DefaultedToTargetType {
            param: "id".into(),
            ty: "int".into(),
        })
        .at("petstore: get pets/[int id]");
        assert_eq!(
            diagnostic.to_string(),
            "[WARNING] BAL_OAS_102 parameter 'id' has incompatible interceptor types, \
             defaulting to the target resource type 'int' (petstore: get pets/[int id])"
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Hint);
    }
}
