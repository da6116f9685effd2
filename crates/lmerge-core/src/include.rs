//! Include merges: flat pointer→value patches over independent copies
//!
//! Every target starts from the pristine original, so targets never observe
//! each other's writes. The schema's include list is not consulted here.

use crate::document::{apply_fields, parse_payload, to_pretty};
use crate::error::Result;
use crate::merge::Target;
use crate::report::Reporter;
use serde_json::Value;

/// Merge one document per target, in target order
pub fn merge_include(
    original: &Value,
    targets: &[Target],
    reporter: &dyn Reporter,
) -> Result<Vec<String>> {
    targets
        .iter()
        .map(|target| merge_target(original, target, reporter))
        .collect()
}

fn merge_target(original: &Value, target: &Target, reporter: &dyn Reporter) -> Result<String> {
    let payload = parse_payload(&target.translated_content)?;
    let mut document = original.clone();

    match payload.as_object() {
        Some(fields) => {
            tracing::debug!(
                locale = %target.target_locale,
                fields = fields.len(),
                "applying include patch"
            );
            apply_fields(&mut document, fields, reporter);
        }
        None => tracing::debug!(
            locale = %target.target_locale,
            "include payload is not an object; nothing to apply"
        ),
    }

    to_pretty(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::report::{CollectingReporter, NullReporter};
    use serde_json::json;

    #[test]
    fn test_targets_start_from_pristine_original() {
        let original = json!({"title": "Title", "body": "Body"});
        let targets = vec![
            Target::new(r#"{"/title": "Titre"}"#, "fr"),
            Target::new(r#"{"/body": "Cuerpo"}"#, "es"),
        ];

        let outputs = merge_include(&original, &targets, &NullReporter).unwrap();

        assert_eq!(outputs.len(), 2);
        let fr: Value = serde_json::from_str(&outputs[0]).unwrap();
        let es: Value = serde_json::from_str(&outputs[1]).unwrap();
        assert_eq!(fr, json!({"title": "Titre", "body": "Body"}));
        assert_eq!(es, json!({"title": "Title", "body": "Cuerpo"}));
    }

    #[test]
    fn test_stale_pointers_are_skipped() {
        let original = json!({"sections": [{"heading": "One"}]});
        let targets = vec![Target::new(
            r#"{"/sections/0/heading": "Uno", "/sections/3/heading": "Cuatro", "heading": "x"}"#,
            "es",
        )];
        let reporter = CollectingReporter::new();

        let outputs = merge_include(&original, &targets, &reporter).unwrap();

        let es: Value = serde_json::from_str(&outputs[0]).unwrap();
        assert_eq!(es, json!({"sections": [{"heading": "Uno"}]}));
        assert_eq!(reporter.skipped_pointers().len(), 2);
        assert!(reporter.errors().is_empty());
    }

    #[test]
    fn test_payload_parse_error_propagates_raw() {
        let original = json!({});
        let targets = vec![Target::new("{oops", "fr")];
        let reporter = CollectingReporter::new();

        let err = merge_include(&original, &targets, &reporter).unwrap_err();

        assert!(matches!(err, Error::Json(_)));
        assert!(reporter.events().is_empty());
    }
}
