//! Import command implementation for the medroute CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::store::require_existing;
use crate::{
    ARG_DATABASE, ARG_IMPORT_SNAPSHOT, CliError, ENV_IMPORT_DATABASE, ENV_IMPORT_SNAPSHOT,
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a JSON facility snapshot into a SQLite capacity \
                 database, creating the database when it does not exist. \
                 Facilities already present are replaced.",
    about = "Import a facility snapshot into SQLite"
)]
#[ortho_config(prefix = "MEDROUTE")]
pub(crate) struct ImportArgs {
    /// Facility snapshot (JSON array) to import.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot_path: Option<Utf8PathBuf>,
    /// SQLite database to create or update.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) snapshot_path: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let snapshot_path = args.snapshot_path.ok_or(CliError::MissingArgument {
            field: ARG_IMPORT_SNAPSHOT,
            env: ENV_IMPORT_SNAPSHOT,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_IMPORT_DATABASE,
        })?;
        Ok(Self {
            snapshot_path,
            database,
        })
    }
}

pub(super) fn run_import_with(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.snapshot_path, ARG_IMPORT_SNAPSHOT)?;
    let written = execute_import(&config)?;
    writeln!(writer, "imported {written} facilities into {}", config.database)
        .map_err(CliError::WriteOutput)
}

#[cfg(feature = "store-sqlite")]
pub(super) fn execute_import(config: &ImportConfig) -> Result<usize, CliError> {
    let facilities = crate::store::load_snapshot(&config.snapshot_path)?;
    medroute_fs::ensure_parent_dir(&config.database).map_err(|source| {
        CliError::InspectSourcePath {
            field: ARG_DATABASE,
            path: config.database.clone(),
            source,
        }
    })?;
    let store = medroute_core::SqliteCapacityStore::open(config.database.as_std_path())?;
    Ok(store.import(&facilities)?)
}

#[cfg(not(feature = "store-sqlite"))]
pub(super) fn execute_import(_config: &ImportConfig) -> Result<usize, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "importing a snapshot",
    })
}
