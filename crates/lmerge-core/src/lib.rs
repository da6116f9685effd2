//! lmerge-core: Core library for merging translated content into JSON documents
//!
//! This library provides functionality to:
//! - Overlay flat pointer→value translation patches onto copies of a document
//! - Reconcile locale-keyed arrays and objects in a single shared document
//! - Rewrite URLs and other strings per locale with regex/placeholder rules
//! - Load schemas and job files describing which files to merge and how

pub mod composite;
pub mod document;
pub mod error;
pub mod include;
pub mod job;
pub mod locale;
pub mod merge;
pub mod report;
pub mod schema;
pub mod transform;

pub use error::{Error, Result, Warning};
pub use job::{output_path, JobFile, JobTarget};
pub use merge::{merge, MergeRequest, Target};
pub use report::{CollectingReporter, Event, NullReporter, Reporter};
pub use schema::{
    CollectionKind, CompositeEntry, CompositeSchema, FileSchema, IncludeSchema, SchemaFile,
    TransformRule,
};
pub use transform::Transformer;
