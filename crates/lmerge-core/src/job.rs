//! Job files: file-level wrapper around [`merge`](crate::merge::merge)
//!
//! The merge engine itself works on strings. A job names the files to read
//! and where to write the results, so a whole locale batch can be replayed
//! from one JSON file.

use crate::error::{Error, Result};
use crate::merge::{merge, MergeRequest, Target};
use crate::report::Reporter;
use crate::schema::{FileSchema, SchemaFile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A translated payload file for one locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTarget {
    pub locale: String,
    pub path: PathBuf,
}

/// A merge described by file paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFile {
    /// Original document
    pub original: PathBuf,
    /// Schema file; without one, payloads are passed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
    /// Glob key to select when the schema file is a glob map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_key: Option<String>,
    pub default_locale: String,
    /// Targets in application order
    pub targets: Vec<JobTarget>,
    /// Directory for merged documents
    pub output_dir: PathBuf,
}

impl JobFile {
    /// Load a job file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = read_file(path.as_ref())?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the job file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load the schema this job refers to
    pub fn load_schema(&self) -> Result<Option<FileSchema>> {
        let Some(path) = &self.schema else {
            return Ok(None);
        };
        match &self.schema_key {
            None => FileSchema::load(path).map(Some),
            Some(key) => {
                let file = SchemaFile::load(path)?;
                file.get(key).cloned().map(Some).ok_or_else(|| {
                    Error::SchemaConfiguration(format!(
                        "schema key '{}' not found in {}",
                        key,
                        path.display()
                    ))
                })
            }
        }
    }

    /// Read every target payload
    pub fn load_targets(&self) -> Result<Vec<Target>> {
        self.targets
            .iter()
            .map(|t| Ok(Target::new(read_file(&t.path)?, t.locale.clone())))
            .collect()
    }

    /// Run the merge and write the outputs, returning the written paths
    ///
    /// Schema and target-list problems found here go through `reporter.error`
    /// the same way merge failures do.
    pub fn run(&self, reporter: &dyn Reporter) -> Result<Vec<PathBuf>> {
        let schema = self.load_schema().inspect_err(|e| report(reporter, e))?;
        let single_document = matches!(schema, Some(FileSchema::Composite(_)));
        if !single_document {
            self.check_distinct_locales()
                .inspect_err(|e| report(reporter, e))?;
        }

        let original = read_file(&self.original)?;
        let targets = self.load_targets()?;
        let identity = self.original.display().to_string();

        let mut request = MergeRequest::new(&original, &identity, &self.default_locale)
            .with_targets(&targets);
        if let Some(schema) = &schema {
            request = request.with_schema(schema);
        }
        let outputs = merge(&request, reporter)?;

        fs::create_dir_all(&self.output_dir)?;
        let mut written = Vec::with_capacity(outputs.len());
        for (i, content) in outputs.iter().enumerate() {
            let locale = if single_document {
                None
            } else {
                targets.get(i).map(|t| t.target_locale.as_str())
            };
            let path = output_path(&self.original, &self.output_dir, locale);
            fs::write(&path, content)?;
            tracing::info!(path = %path.display(), "wrote merged document");
            written.push(path);
        }

        Ok(written)
    }

    /// Per-locale outputs are named after the locale, so each may appear once
    fn check_distinct_locales(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for target in &self.targets {
            if !seen.insert(target.locale.as_str()) {
                return Err(Error::DuplicateLocale {
                    locale: target.locale.clone(),
                });
            }
        }
        Ok(())
    }
}

fn report(reporter: &dyn Reporter, err: &Error) {
    if err.is_reported() {
        reporter.error(&err.to_string());
    }
}

/// Where a merged document is written.
///
/// Per-locale outputs are named `<stem>.<locale>.<ext>`; the single composite
/// output keeps the original file name.
pub fn output_path(original: &Path, output_dir: &Path, locale: Option<&str>) -> PathBuf {
    let file_name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.json".to_string());

    let Some(locale) = locale else {
        return output_dir.join(file_name);
    };

    let path = Path::new(&file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());
    match path.extension() {
        Some(ext) => output_dir.join(format!("{}.{}.{}", stem, locale, ext.to_string_lossy())),
        None => output_dir.join(format!("{}.{}", stem, locale)),
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use serde_json::{json, Value};

    #[test]
    fn test_output_path_naming() {
        let out = Path::new("out");
        assert_eq!(
            output_path(Path::new("content/page.json"), out, Some("fr")),
            PathBuf::from("out/page.fr.json")
        );
        assert_eq!(
            output_path(Path::new("content/page.json"), out, None),
            PathBuf::from("out/page.json")
        );
        assert_eq!(
            output_path(Path::new("README"), out, Some("de")),
            PathBuf::from("out/README.de")
        );
    }

    #[test]
    fn test_job_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let job = JobFile {
            original: PathBuf::from("page.json"),
            schema: None,
            schema_key: None,
            default_locale: "en".to_string(),
            targets: vec![JobTarget {
                locale: "fr".to_string(),
                path: PathBuf::from("page.fr.json"),
            }],
            output_dir: PathBuf::from("out"),
        };

        let path = dir.path().join("job.json");
        job.save(&path).unwrap();
        let loaded = JobFile::load(&path).unwrap();

        assert_eq!(loaded, job);
        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("schema"));
    }

    #[test]
    fn test_run_composite_job_writes_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("menu.json"),
            r#"{"menu": {"en": {"label": "Home"}}}"#,
        )
        .unwrap();
        fs::write(
            root.join("schema.json"),
            r#"{"data/menu.json": {"composite": {"$.menu": {"type": "object", "include": []}}}}"#,
        )
        .unwrap();
        fs::write(root.join("fr.json"), r#"{"/menu": {"/label": "Accueil"}}"#).unwrap();
        fs::write(root.join("de.json"), r#"{"/menu": {"/label": "Start"}}"#).unwrap();

        let job = JobFile {
            original: root.join("menu.json"),
            schema: Some(root.join("schema.json")),
            schema_key: Some("data/menu.json".to_string()),
            default_locale: "en".to_string(),
            targets: vec![
                JobTarget {
                    locale: "fr".to_string(),
                    path: root.join("fr.json"),
                },
                JobTarget {
                    locale: "de".to_string(),
                    path: root.join("de.json"),
                },
            ],
            output_dir: root.join("out"),
        };

        let written = job.run(&CollectingReporter::new()).unwrap();

        assert_eq!(written, vec![root.join("out").join("menu.json")]);
        let merged: Value =
            serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(
            merged,
            json!({"menu": {
                "en": {"label": "Home"},
                "fr": {"label": "Accueil"},
                "de": {"label": "Start"}
            }})
        );
    }

    #[test]
    fn test_unknown_schema_key() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.json");
        fs::write(&schema_path, r#"{"a.json": {"include": []}}"#).unwrap();

        let job = JobFile {
            original: PathBuf::from("a.json"),
            schema: Some(schema_path),
            schema_key: Some("b.json".to_string()),
            default_locale: "en".to_string(),
            targets: Vec::new(),
            output_dir: PathBuf::from("out"),
        };

        assert!(matches!(
            job.load_schema(),
            Err(Error::SchemaConfiguration(_))
        ));
    }

    #[test]
    fn test_run_reports_schema_without_kind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("page.json"), r#"{"title": "T"}"#).unwrap();
        fs::write(root.join("schema.json"), r#"{"paths": []}"#).unwrap();

        let job = JobFile {
            original: root.join("page.json"),
            schema: Some(root.join("schema.json")),
            schema_key: None,
            default_locale: "en".to_string(),
            targets: Vec::new(),
            output_dir: root.join("out"),
        };
        let reporter = CollectingReporter::new();

        let err = job.run(&reporter).unwrap_err();

        assert!(matches!(err, Error::SchemaConfiguration(_)));
        assert_eq!(reporter.errors(), vec![crate::error::NO_SCHEMA_KIND.to_string()]);
        assert!(!root.join("out").exists());
    }

    #[test]
    fn test_run_reports_array_entry_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("page.json"), r#"{"x": []}"#).unwrap();
        fs::write(
            root.join("schema.json"),
            r#"{"composite": {"$.x": {"type": "array"}}}"#,
        )
        .unwrap();

        let job = JobFile {
            original: root.join("page.json"),
            schema: Some(root.join("schema.json")),
            schema_key: None,
            default_locale: "en".to_string(),
            targets: Vec::new(),
            output_dir: root.join("out"),
        };
        let reporter = CollectingReporter::new();

        let err = job.run(&reporter).unwrap_err();

        assert!(matches!(err, Error::MissingKeyPath { .. }));
        assert_eq!(reporter.errors(), vec![err.to_string()]);
    }

    #[test]
    fn test_run_rejects_duplicate_locales_for_per_locale_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("page.json"), r#"{"title": "T"}"#).unwrap();
        fs::write(root.join("schema.json"), r#"{"include": ["$.title"]}"#).unwrap();
        fs::write(root.join("a.json"), r#"{"/title": "Un"}"#).unwrap();
        fs::write(root.join("b.json"), r#"{"/title": "Deux"}"#).unwrap();

        let job = JobFile {
            original: root.join("page.json"),
            schema: Some(root.join("schema.json")),
            schema_key: None,
            default_locale: "en".to_string(),
            targets: vec![
                JobTarget {
                    locale: "fr".to_string(),
                    path: root.join("a.json"),
                },
                JobTarget {
                    locale: "fr".to_string(),
                    path: root.join("b.json"),
                },
            ],
            output_dir: root.join("out"),
        };
        let reporter = CollectingReporter::new();

        let err = job.run(&reporter).unwrap_err();

        assert!(matches!(err, Error::DuplicateLocale { ref locale } if locale == "fr"));
        assert_eq!(reporter.errors().len(), 1);
        assert!(!root.join("out").exists());
    }
}
