//! Merge entry point

use crate::composite::merge_composite;
use crate::document::{parse_document, parse_payload, to_pretty};
use crate::error::Result;
use crate::include::merge_include;
use crate::report::Reporter;
use crate::schema::FileSchema;
use serde::{Deserialize, Serialize};

/// A translated payload for one locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub translated_content: String,
    pub target_locale: String,
}

impl Target {
    /// Create a new target
    pub fn new(translated_content: impl Into<String>, target_locale: impl Into<String>) -> Self {
        Self {
            translated_content: translated_content.into(),
            target_locale: target_locale.into(),
        }
    }
}

/// Everything a merge needs besides the reporter
#[derive(Debug, Clone)]
pub struct MergeRequest<'a> {
    /// Original document text
    pub original_content: &'a str,
    /// Name of the original, used in error messages only
    pub identity: &'a str,
    /// Schema selected for this file, if any
    pub schema: Option<&'a FileSchema>,
    /// Targets in the order they should be applied
    pub targets: &'a [Target],
    pub default_locale: &'a str,
}

impl<'a> MergeRequest<'a> {
    /// Create a request without a schema or targets
    pub fn new(original_content: &'a str, identity: &'a str, default_locale: &'a str) -> Self {
        Self {
            original_content,
            identity,
            schema: None,
            targets: &[],
            default_locale,
        }
    }

    /// Use this schema
    pub fn with_schema(mut self, schema: &'a FileSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Apply these targets
    pub fn with_targets(mut self, targets: &'a [Target]) -> Self {
        self.targets = targets;
        self
    }
}

/// Merge translated targets into the original document.
///
/// Output cardinality depends on the schema:
/// - no schema: each payload re-serialized, one per target
/// - include: one document per target, each from the pristine original
/// - composite: a single document holding every target, or nothing when
///   there are no targets
///
/// Taxonomy errors are passed to `reporter.error` before being returned.
/// Unparsable payloads return [`crate::Error::Json`] without a report.
pub fn merge(request: &MergeRequest<'_>, reporter: &dyn Reporter) -> Result<Vec<String>> {
    let _span = tracing::debug_span!("merge", identity = %request.identity).entered();

    let result = run(request, reporter);
    if let Err(err) = &result {
        if err.is_reported() {
            reporter.error(&err.to_string());
        }
    }
    result
}

fn run(request: &MergeRequest<'_>, reporter: &dyn Reporter) -> Result<Vec<String>> {
    let original = parse_document(request.original_content, request.identity)?;

    match request.schema {
        None => {
            tracing::debug!(targets = request.targets.len(), "no schema; passing payloads through");
            request
                .targets
                .iter()
                .map(|t| parse_payload(&t.translated_content).and_then(|v| to_pretty(&v)))
                .collect()
        }
        Some(FileSchema::Include(_)) => {
            tracing::debug!(targets = request.targets.len(), "include merge");
            merge_include(&original, request.targets, reporter)
        }
        Some(FileSchema::Composite(composite)) => {
            tracing::debug!(
                targets = request.targets.len(),
                entries = composite.entries.len(),
                "composite merge"
            );
            let merged = merge_composite(
                &original,
                composite,
                request.targets,
                request.default_locale,
                reporter,
            )?;
            Ok(merged.into_iter().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::report::CollectingReporter;

    #[test]
    fn test_no_schema_reserializes_payloads() {
        let targets = vec![Target::new(r#"{"a":1}"#, "fr"), Target::new("[1,2]", "de")];
        let request = MergeRequest::new(r#"{"ignored": true}"#, "page.json", "en")
            .with_targets(&targets);

        let outputs = merge(&request, &CollectingReporter::new()).unwrap();

        assert_eq!(outputs, vec!["{\n  \"a\": 1\n}", "[\n  1,\n  2\n]"]);
    }

    #[test]
    fn test_invalid_original_is_reported() {
        let reporter = CollectingReporter::new();
        let request = MergeRequest::new("{", "broken.json", "en");

        let err = merge(&request, &reporter).unwrap_err();

        assert!(matches!(err, Error::InvalidDocument { .. }));
        assert_eq!(reporter.errors(), vec!["Invalid JSON file: broken.json".to_string()]);
    }

    #[test]
    fn test_payload_error_is_not_reported() {
        let reporter = CollectingReporter::new();
        let targets = vec![Target::new("not json", "fr")];
        let request = MergeRequest::new("{}", "page.json", "en").with_targets(&targets);

        let err = merge(&request, &reporter).unwrap_err();

        assert!(matches!(err, Error::Json(_)));
        assert!(reporter.errors().is_empty());
    }

    #[test]
    fn test_target_serde_uses_camel_case() {
        let target: Target =
            serde_json::from_str(r#"{"translatedContent": "{}", "targetLocale": "fr"}"#).unwrap();
        assert_eq!(target, Target::new("{}", "fr"));
    }
}
