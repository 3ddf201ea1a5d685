//! Field-level validation results.
//!
//! Validators never fail: they return a [`ValidationResult`] that is either
//! ok or an ordered list of [`FieldViolation`]s. Callers decide whether a
//! violation blocks the operation or is merely shown as a warning.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single problem with one field of a settings or answer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Path of the offending field (e.g. `options[2]`, `selected`).
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    violations: Vec<FieldViolation>,
}

impl ValidationResult {
    /// A result with no violations.
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// A result holding exactly one violation.
    #[must_use]
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut result = Self::ok();
        result.push(field, reason);
        result
    }

    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.violations.push(FieldViolation::new(field, reason));
    }

    /// Record a violation when `condition` does not hold.
    pub fn check(&mut self, condition: bool, field: impl Into<String>, reason: impl Into<String>) {
        if !condition {
            self.push(field, reason);
        }
    }

    /// Append all violations from `other`, keeping their order.
    pub fn merge(&mut self, other: ValidationResult) {
        self.violations.extend(other.violations);
    }

    /// Prefix every field path with `prefix` (`prefix.field`).
    #[must_use]
    pub fn prefixed(self, prefix: &str) -> Self {
        Self {
            violations: self
                .violations
                .into_iter()
                .map(|v| FieldViolation::new(format!("{prefix}.{}", v.field), v.reason))
                .collect(),
        }
    }

    /// Whether any violation names `field` (exact match or as the last path segment).
    pub fn mentions(&self, field: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field || v.field.ends_with(&format!(".{field}")))
    }

    /// Convert into `Ok(())` or `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationResult> {
        if self.is_ok() { Ok(()) } else { Err(self) }
    }
}

impl From<Vec<FieldViolation>> for ValidationResult {
    fn from(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("ok");
        }
        let parts: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

/// Validate a list of option labels: at least `min` entries, none blank, no duplicates.
pub(crate) fn check_options(result: &mut ValidationResult, field: &str, options: &[String], min: usize) {
    if options.len() < min {
        result.push(field, format!("at least {min} options are required"));
    }
    for (i, option) in options.iter().enumerate() {
        if option.trim().is_empty() {
            result.push(format!("{field}[{i}]"), "option must not be empty");
        } else if options[..i].iter().any(|o| o.trim() == option.trim()) {
            result.push(format!("{field}[{i}]"), format!("duplicate option '{}'", option.trim()));
        }
    }
}
