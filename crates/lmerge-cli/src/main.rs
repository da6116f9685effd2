//! lmerge CLI
//!
//! Command-line tool for merging translated JSON payloads back into source documents.

use clap::{Parser, Subcommand};
use lmerge_core::{FileSchema, JobFile, JobTarget, Reporter, SchemaFile};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lmerge")]
#[command(about = "Merge translated JSON payloads into source documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge translated payloads into one original document
    Merge {
        /// Original JSON document
        #[arg(short, long)]
        original: PathBuf,

        /// Schema file (a single file schema, or a glob map with --schema-key)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Glob key to select from a schema map
        #[arg(long, requires = "schema")]
        schema_key: Option<String>,

        /// Translated payloads as locale=path, in application order
        #[arg(short, long = "target", value_parser = parse_target)]
        targets: Vec<JobTarget>,

        /// Locale of the original content
        #[arg(short, long, default_value = "en")]
        default_locale: String,

        /// Output directory for merged documents
        #[arg(long)]
        output: PathBuf,
    },

    /// Run a job file
    Batch {
        /// Path to job file (JSON)
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Create a job file template
    CreateJob {
        /// Output path for the job file
        #[arg(short, long)]
        output: PathBuf,

        /// Original JSON document
        #[arg(long)]
        original: PathBuf,

        /// Locale of the original content
        #[arg(short, long, default_value = "en")]
        default_locale: String,

        /// Example targets as locale=path
        #[arg(short, long = "target", value_parser = parse_target)]
        targets: Vec<JobTarget>,
    },

    /// Load a schema and print what it declares
    CheckSchema {
        /// Schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Glob key to select from a schema map; without it every entry is listed
        #[arg(long)]
        schema_key: Option<String>,
    },
}

/// Reporter that routes merge events to tracing
#[derive(Default)]
struct TracingReporter {
    logged_error: Cell<bool>,
}

impl TracingReporter {
    /// Whether an error has already been logged during this run
    fn logged_error(&self) -> bool {
        self.logged_error.get()
    }
}

impl Reporter for TracingReporter {
    fn error(&self, message: &str) {
        self.logged_error.set(true);
        tracing::error!("{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn skipped(&self, pointer: &str, reason: &str) {
        tracing::debug!(pointer, reason, "skipped patch pointer");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let reporter = TracingReporter::default();
    if let Err(e) = run(&reporter) {
        if !reporter.logged_error() {
            tracing::error!("{}", e);
        }
        std::process::exit(1);
    }
}

fn run(reporter: &TracingReporter) -> lmerge_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            original,
            schema,
            schema_key,
            targets,
            default_locale,
            output,
        } => {
            let job = JobFile {
                original,
                schema,
                schema_key,
                default_locale,
                targets,
                output_dir: output,
            };
            cmd_run_job(&job, reporter)
        }
        Commands::Batch { job } => cmd_batch(&job, reporter),
        Commands::CreateJob {
            output,
            original,
            default_locale,
            targets,
        } => cmd_create_job(&output, original, default_locale, targets),
        Commands::CheckSchema { schema, schema_key } => {
            cmd_check_schema(&schema, schema_key.as_deref())
        }
    }
}

fn cmd_run_job(job: &JobFile, reporter: &dyn Reporter) -> lmerge_core::Result<()> {
    println!(
        "Merging {} target(s) into {}",
        job.targets.len(),
        job.original.display()
    );

    let written = job.run(reporter)?;

    println!("Wrote {} file(s):", written.len());
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}

fn cmd_batch(job_path: &Path, reporter: &dyn Reporter) -> lmerge_core::Result<()> {
    let job = JobFile::load(job_path)?;
    println!("Running job {}", job_path.display());
    cmd_run_job(&job, reporter)
}

fn cmd_create_job(
    output: &Path,
    original: PathBuf,
    default_locale: String,
    mut targets: Vec<JobTarget>,
) -> lmerge_core::Result<()> {
    // Placeholder target so the template shows the expected shape
    if targets.is_empty() {
        targets.push(JobTarget {
            locale: "fr".to_string(),
            path: PathBuf::from("translations/fr.json"),
        });
    }

    let job = JobFile {
        original,
        schema: Some(PathBuf::from("schema.json")),
        schema_key: None,
        default_locale,
        targets,
        output_dir: PathBuf::from("merged"),
    };

    job.save(output)?;
    println!("Created job file: {}", output.display());
    println!();
    println!("Edit the file to configure your merge, then run:");
    println!("  lmerge batch --job {}", output.display());

    Ok(())
}

fn cmd_check_schema(path: &Path, schema_key: Option<&str>) -> lmerge_core::Result<()> {
    let schemas = match schema_key {
        Some(key) => {
            let file = SchemaFile::load(path)?;
            let schema = file.get(key).cloned().ok_or_else(|| {
                lmerge_core::Error::SchemaConfiguration(format!("schema key '{}' not found", key))
            })?;
            vec![(key.to_string(), schema)]
        }
        None => match FileSchema::load(path) {
            Ok(schema) => vec![("(file)".to_string(), schema)],
            Err(_) => SchemaFile::load(path)?.files,
        },
    };

    for (glob, schema) in &schemas {
        println!("{} [{}]", glob, schema.kind_label());
        match schema {
            FileSchema::Include(include) => {
                for path in &include.include_paths {
                    println!("  include {}", path);
                }
            }
            FileSchema::Composite(composite) => {
                for (root, entry) in &composite.entries {
                    let key = entry.key.as_deref().unwrap_or("-");
                    let rules = entry.transform.as_ref().map_or(0, |r| r.len());
                    println!(
                        "  {} ({:?}, key {}, {} include path(s), {} transform rule(s))",
                        root,
                        entry.kind,
                        key,
                        entry.include.len(),
                        rules
                    );
                }
            }
        }
    }

    Ok(())
}

/// Parse a `locale=path` target argument
fn parse_target(raw: &str) -> Result<JobTarget, String> {
    let (locale, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid target '{}', expected 'locale=path'", raw))?;
    if locale.is_empty() || path.is_empty() {
        return Err(format!("invalid target '{}', expected 'locale=path'", raw));
    }
    Ok(JobTarget {
        locale: locale.to_string(),
        path: PathBuf::from(path),
    })
}
