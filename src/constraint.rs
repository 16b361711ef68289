//! Constraint annotation facets attached to Ballerina types and record fields.
//!
//! A `@constraint:*` annotation carries up to eight facets. Values are kept as the raw
//! strings the annotation declared; the schema generator decides how to interpret them
//! (numeric bounds, lengths or a regular expression).

use serde::{Deserialize, Serialize};

/// Immutable set of constraint facets.
///
/// Build one with [`ConstraintAnnotation::builder`]:
///
/// ```
/// use ballerina_openapi::constraint::ConstraintAnnotation;
///
/// let constraint = ConstraintAnnotation::builder()
///     .min_length("1")
///     .max_length("32")
///     .build();
/// assert!(constraint.has_constraints());
/// assert_eq!(constraint.max_length(), Some("32"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConstraintAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_value_exclusive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_value_exclusive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
}

impl ConstraintAnnotation {
    /// Start building a constraint annotation with no facets set.
    pub fn builder() -> ConstraintAnnotationBuilder {
        ConstraintAnnotationBuilder::default()
    }

    /// True when at least one facet is present.
    pub fn has_constraints(&self) -> bool {
        self.min_value.is_some()
            || self.max_value.is_some()
            || self.length.is_some()
            || self.min_length.is_some()
            || self.max_length.is_some()
            || self.min_value_exclusive.is_some()
            || self.max_value_exclusive.is_some()
            || self.pattern.is_some()
    }

    pub fn min_value(&self) -> Option<&str> {
        self.min_value.as_deref()
    }

    pub fn max_value(&self) -> Option<&str> {
        self.max_value.as_deref()
    }

    pub fn length(&self) -> Option<&str> {
        self.length.as_deref()
    }

    pub fn min_length(&self) -> Option<&str> {
        self.min_length.as_deref()
    }

    pub fn max_length(&self) -> Option<&str> {
        self.max_length.as_deref()
    }

    pub fn min_value_exclusive(&self) -> Option<&str> {
        self.min_value_exclusive.as_deref()
    }

    pub fn max_value_exclusive(&self) -> Option<&str> {
        self.max_value_exclusive.as_deref()
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }
}

/// Builder for [`ConstraintAnnotation`].
#[derive(Debug, Default)]
pub struct ConstraintAnnotationBuilder {
    inner: ConstraintAnnotation,
}

impl ConstraintAnnotationBuilder {
    pub fn min_value(mut self, value: impl Into<String>) -> Self {
        self.inner.min_value = Some(value.into());
        self
    }

    pub fn max_value(mut self, value: impl Into<String>) -> Self {
        self.inner.max_value = Some(value.into());
        self
    }

    pub fn length(mut self, value: impl Into<String>) -> Self {
        self.inner.length = Some(value.into());
        self
    }

    pub fn min_length(mut self, value: impl Into<String>) -> Self {
        self.inner.min_length = Some(value.into());
        self
    }

    pub fn max_length(mut self, value: impl Into<String>) -> Self {
        self.inner.max_length = Some(value.into());
        self
    }

    pub fn min_value_exclusive(mut self, value: impl Into<String>) -> Self {
        self.inner.min_value_exclusive = Some(value.into());
        self
    }

    pub fn max_value_exclusive(mut self, value: impl Into<String>) -> Self {
        self.inner.max_value_exclusive = Some(value.into());
        self
    }

    pub fn pattern(mut self, value: impl Into<String>) -> Self {
        self.inner.pattern = Some(value.into());
        self
    }

    pub fn build(self) -> ConstraintAnnotation {
        self.inner
    }
}
