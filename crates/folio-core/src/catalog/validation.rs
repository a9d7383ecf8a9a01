//! Structured validation errors.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Validation messages keyed by the attribute they concern.
///
/// Renders as a JSON object so the messages can be logged verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Create an empty set of errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against an attribute.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.0
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    /// Check if no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for an attribute.
    pub fn get(&self, attribute: &str) -> &[String] {
        self.0.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if an attribute has any messages.
    pub fn has(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    /// Iterate over attributes and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Merge another set of errors into this one.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (attribute, messages) in other.0 {
            self.0.entry(attribute).or_default().extend(messages);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_render() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("template", "Template cannot be blank.");
        errors.add("handle", "Handle is not a valid identifier.");
        errors.add("handle", "Handle is reserved.");

        assert!(errors.has("handle"));
        assert_eq!(errors.get("handle").len(), 2);
        assert!(errors.get("name").is_empty());
        assert_eq!(
            errors.to_string(),
            r#"{"handle":["Handle is not a valid identifier.","Handle is reserved."],"template":["Template cannot be blank."]}"#
        );
    }
}
