//! Error types emitted by the medroute CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use medroute_core::{
    DispatchRequestValidationError, ParseCategoryError, ParseSeverityError, RecommendError,
    StoreError,
};
use thiserror::Error;

/// Errors emitted by the medroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Both a snapshot and a database were named.
    #[error("choose either --snapshot or --database, not both")]
    ConflictingStores,
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The category argument names no known resource.
    #[error(transparent)]
    InvalidCategory(#[from] ParseCategoryError),
    /// The condition argument names no known severity.
    #[error(transparent)]
    InvalidCondition(#[from] ParseSeverityError),
    /// Opening the dispatch request file failed.
    #[error("failed to open dispatch request at {path:?}: {source}")]
    OpenRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Dispatch request JSON could not be decoded.
    #[error("failed to parse dispatch request JSON at {path:?}: {source}")]
    ParseRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The dispatch request failed validation.
    #[error("dispatch request in {path:?} failed validation: {source}")]
    InvalidRequest {
        path: Utf8PathBuf,
        #[source]
        source: DispatchRequestValidationError,
    },
    /// Opening the facility snapshot failed.
    #[error("failed to open facility snapshot at {path:?}: {source}")]
    OpenSnapshot {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Facility snapshot JSON could not be decoded.
    #[error("failed to parse facility snapshot at {path:?}: {source}")]
    ParseSnapshot {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A facility in the snapshot breaks the capacity invariant.
    #[error("facility snapshot at {path:?} is invalid: {source}")]
    InvalidSnapshot {
        path: Utf8PathBuf,
        #[source]
        source: StoreError,
    },
    /// Taking the exclusive lock on the facility snapshot failed.
    #[error("failed to lock facility snapshot at {path:?}: {source}")]
    LockSnapshot {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing the updated snapshot back failed.
    #[error("failed to write facility snapshot to {path:?}: {source}")]
    WriteSnapshot {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening or importing into the SQLite store failed.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    Database(#[from] medroute_core::SqliteCapacityStoreError),
    /// Reading from the capacity store failed.
    #[error("capacity store failed: {0}")]
    Store(#[from] StoreError),
    /// The recommender rejected the request.
    #[error("recommendation failed: {source}")]
    Recommend { source: RecommendError },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
