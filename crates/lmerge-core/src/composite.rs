//! Composite merges: locale-keyed collections reconciled in one shared document
//!
//! Targets and entries are folded in caller order over a single document, so
//! later pairs see earlier writes. Array payloads are keyed by absolute index
//! into the collection as it was before the merge started:
//!
//! ```json
//! { "/items": { "/0": { "/title": "Titre" }, "/2": { "/title": "Autre" } } }
//! ```
//!
//! Object payloads hold field pointers relative to the default-locale item:
//!
//! ```json
//! { "/translations": { "/title": "Titre" } }
//! ```

use crate::document::{
    apply_fields, definite_pointer, parse_payload, select_first, select_pointers, set_pointer,
    to_pretty,
};
use crate::error::{Error, Result, Warning};
use crate::merge::Target;
use crate::report::Reporter;
use crate::schema::{CollectionKind, CompositeEntry, CompositeSchema};
use crate::transform::Transformer;
use serde_json::{Map, Value};

/// Run every (target, entry) pair and serialize the single resulting document.
///
/// Returns `None` when there are no targets.
pub fn merge_composite(
    original: &Value,
    schema: &CompositeSchema,
    targets: &[Target],
    default_locale: &str,
    reporter: &dyn Reporter,
) -> Result<Option<String>> {
    if targets.is_empty() {
        return Ok(None);
    }

    let pass = CompositePass {
        original,
        default_locale,
        reporter,
    };
    let mut document = original.clone();
    for target in targets {
        pass.apply_target(&mut document, &schema.entries, target)?;
    }

    to_pretty(&document).map(Some)
}

/// State shared by every (target, entry) step of one merge
struct CompositePass<'a> {
    /// Snapshot taken before any target ran
    original: &'a Value,
    default_locale: &'a str,
    reporter: &'a dyn Reporter,
}

/// One (target, entry) step
struct Step<'a> {
    root_path: &'a str,
    root_pointer: String,
    entry: &'a CompositeEntry,
    locale: &'a str,
    section: Option<&'a Map<String, Value>>,
    transformer: Option<Transformer>,
}

impl CompositePass<'_> {
    fn apply_target(
        &self,
        document: &mut Value,
        entries: &[(String, CompositeEntry)],
        target: &Target,
    ) -> Result<()> {
        let payload = parse_payload(&target.translated_content)?;
        let sections = payload.as_object();

        for (root_path, entry) in entries {
            let _span = tracing::debug_span!(
                "composite_entry",
                path = %root_path,
                locale = %target.target_locale
            )
            .entered();

            let root_pointer = select_pointers(document, root_path)?
                .into_iter()
                .next()
                .ok_or_else(|| type_mismatch(entry.kind, root_path))?;

            let section = sections
                .and_then(|s| s.get(&root_pointer))
                .and_then(Value::as_object);
            let transformer = entry
                .transform
                .as_deref()
                .map(|rules| {
                    Transformer::compile(rules, self.default_locale, &target.target_locale)
                })
                .transpose()?;

            let step = Step {
                root_path,
                root_pointer,
                entry,
                locale: &target.target_locale,
                section,
                transformer,
            };
            match entry.kind {
                CollectionKind::Array => self.merge_array(document, &step)?,
                CollectionKind::Object => self.merge_object(document, &step)?,
            }
        }

        Ok(())
    }

    fn merge_array(&self, document: &mut Value, step: &Step<'_>) -> Result<()> {
        let key_path = step
            .entry
            .key
            .as_deref()
            .ok_or_else(|| Error::MissingKeyPath {
                path: step.root_path.to_string(),
            })?;
        let Some(items) = document
            .pointer_mut(&step.root_pointer)
            .and_then(Value::as_array_mut)
        else {
            return Err(type_mismatch(CollectionKind::Array, step.root_path));
        };

        let Some(section) = step.section else {
            return self.transform_only_array(items, key_path, step);
        };

        let mut indexed: Vec<(usize, &Map<String, Value>)> = Vec::with_capacity(section.len());
        for (raw_index, fields) in section {
            let index = raw_index
                .strip_prefix('/')
                .and_then(|i| i.parse::<usize>().ok());
            match (index, fields.as_object()) {
                (Some(index), Some(fields)) => indexed.push((index, fields)),
                _ => self.reporter.skipped(raw_index, "not an array item patch"),
            }
        }
        indexed.sort_by_key(|(index, _)| *index);

        let source = self
            .original
            .pointer(&step.root_pointer)
            .and_then(Value::as_array);
        let mut new_items = Vec::with_capacity(indexed.len());
        for (index, fields) in indexed {
            let template = source
                .and_then(|s| s.get(index))
                .ok_or_else(|| Error::IndexOutOfRange {
                    index,
                    path: step.root_path.to_string(),
                })?;
            let mut item = template.clone();
            apply_fields(&mut item, fields, self.reporter);
            if let Some(transformer) = &step.transformer {
                transformer.apply(&mut item)?;
            }
            self.force_key(&mut item, key_path, step.locale)?;
            new_items.push(item);
        }

        let existing = matching_indices(items, key_path, step.locale)?;
        if new_items.len() < existing.len() {
            return Err(Error::ReconciliationCount {
                path: step.root_path.to_string(),
                to_add: new_items.len(),
                to_remove: existing.len(),
            });
        }

        tracing::debug!(
            replaced = existing.len(),
            appended = new_items.len() - existing.len(),
            "reconciled array items"
        );
        let mut new_items = new_items.into_iter();
        for (slot, item) in existing.iter().zip(new_items.by_ref()) {
            items[*slot] = item;
        }
        items.extend(new_items);

        Ok(())
    }

    fn transform_only_array(
        &self,
        items: &mut Vec<Value>,
        key_path: &str,
        step: &Step<'_>,
    ) -> Result<()> {
        let Some(transformer) = &step.transformer else {
            self.warn_missing_section(step);
            return Ok(());
        };

        let templates: Vec<Value> = matching_indices(items, key_path, self.default_locale)?
            .into_iter()
            .map(|i| items[i].clone())
            .collect();
        if templates.is_empty() {
            self.reporter.warning(
                &Warning::NoDefaultLocaleItems {
                    path: step.root_path.to_string(),
                    default_locale: self.default_locale.to_string(),
                }
                .to_string(),
            );
            return Ok(());
        }

        tracing::debug!(count = templates.len(), "appending transformed items");
        for mut item in templates {
            transformer.apply(&mut item)?;
            self.force_key(&mut item, key_path, step.locale)?;
            items.push(item);
        }
        Ok(())
    }

    fn merge_object(&self, document: &mut Value, step: &Step<'_>) -> Result<()> {
        let Some(Value::Object(collection)) = document.pointer_mut(&step.root_pointer) else {
            return Err(type_mismatch(CollectionKind::Object, step.root_path));
        };
        let template = collection
            .get(self.default_locale)
            .cloned()
            .ok_or_else(|| Error::DefaultLocaleMissing {
                path: step.root_path.to_string(),
            })?;

        let mut item = template;
        match (step.section, &step.transformer) {
            (Some(fields), transformer) => {
                apply_fields(&mut item, fields, self.reporter);
                if let Some(transformer) = transformer {
                    transformer.apply(&mut item)?;
                }
            }
            (None, Some(transformer)) => transformer.apply(&mut item)?,
            (None, None) => {
                self.warn_missing_section(step);
                return Ok(());
            }
        }

        collection.insert(step.locale.to_string(), item);
        Ok(())
    }

    /// Write the target locale into the item's key field
    fn force_key(&self, item: &mut Value, key_path: &str, locale: &str) -> Result<()> {
        let pointers = select_pointers(item, key_path)?;
        if pointers.is_empty() {
            let written = definite_pointer(key_path)
                .map(|pointer| set_pointer(item, &pointer, Value::String(locale.to_string())));
            match written {
                Some(Ok(())) => {}
                Some(Err(err)) => self.reporter.skipped(key_path, &err.to_string()),
                None => self
                    .reporter
                    .skipped(key_path, "key path matches nothing in the item"),
            }
            return Ok(());
        }

        for pointer in pointers {
            if let Some(slot) = item.pointer_mut(&pointer) {
                *slot = Value::String(locale.to_string());
            }
        }
        Ok(())
    }

    fn warn_missing_section(&self, step: &Step<'_>) {
        self.reporter.warning(
            &Warning::MissingSourcePointer {
                locale: step.locale.to_string(),
                pointer: step.root_pointer.clone(),
            }
            .to_string(),
        );
    }
}

/// Ascending indices of items whose key equals `locale`; items without the key never match
fn matching_indices(items: &[Value], key_path: &str, locale: &str) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if let Some(Value::String(key)) = select_first(item, key_path)? {
            if key == locale {
                indices.push(i);
            }
        }
    }
    Ok(indices)
}

fn type_mismatch(kind: CollectionKind, root_path: &str) -> Error {
    let path = root_path.to_string();
    match kind {
        CollectionKind::Array => Error::NotAnArray { path },
        CollectionKind::Object => Error::NotAnObject { path },
    }
}
