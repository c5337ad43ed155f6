//! Command-line interface for ranking hospitals and booking capacity.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

mod book;
mod error;
mod import;
mod recommend;
mod store;

pub use error::CliError;

use book::{BookArgs, run_book_with};
use import::{ImportArgs, run_import_with};
use recommend::{RecommendArgs, run_recommend_with};
use store::StoreSource;

pub(crate) const ARG_SNAPSHOT: &str = "snapshot";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_RECOMMEND_REQUEST: &str = "request";
pub(crate) const ARG_IMPORT_SNAPSHOT: &str = "snapshot-path";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_RESULT_SIZE: &str = "result-size";
pub(crate) const ARG_TOP_K: &str = "top-k";
pub(crate) const ARG_FACILITY: &str = "facility";
pub(crate) const ARG_CATEGORY: &str = "category";
pub(crate) const ARG_REQUESTER: &str = "requester";
pub(crate) const ARG_CONDITION: &str = "condition";
pub(crate) const ENV_RECOMMEND_REQUEST: &str = "MEDROUTE_CMDS_RECOMMEND_REQUEST_PATH";
pub(crate) const ENV_RECOMMEND_SNAPSHOT: &str = "MEDROUTE_CMDS_RECOMMEND_SNAPSHOT";
pub(crate) const ENV_BOOK_FACILITY: &str = "MEDROUTE_CMDS_BOOK_FACILITY";
pub(crate) const ENV_BOOK_CATEGORY: &str = "MEDROUTE_CMDS_BOOK_CATEGORY";
pub(crate) const ENV_BOOK_REQUESTER: &str = "MEDROUTE_CMDS_BOOK_REQUESTER";
pub(crate) const ENV_BOOK_SNAPSHOT: &str = "MEDROUTE_CMDS_BOOK_SNAPSHOT";
pub(crate) const ENV_FACILITIES_SNAPSHOT: &str = "MEDROUTE_CMDS_FACILITIES_SNAPSHOT";
pub(crate) const ENV_IMPORT_SNAPSHOT: &str = "MEDROUTE_CMDS_IMPORT_SNAPSHOT_PATH";
pub(crate) const ENV_IMPORT_DATABASE: &str = "MEDROUTE_CMDS_IMPORT_DATABASE";

/// Run the medroute CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Recommend(args) => run_recommend_with(args, writer),
        Command::Book(args) => run_book_with(args, writer),
        Command::Facilities(args) => run_facilities_with(args, writer),
        Command::Import(args) => run_import_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "medroute",
    about = "Rank hospitals for emergency dispatch and book their capacity",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank hospitals for a dispatch request.
    Recommend(RecommendArgs),
    /// Claim a bed or specialist without operator approval.
    Book(BookArgs),
    /// Print the current facility records as JSON.
    Facilities(FacilitiesArgs),
    /// Load a facility snapshot into a SQLite database.
    Import(ImportArgs),
}

/// CLI arguments for the `facilities` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print facility records from a snapshot or database")]
#[ortho_config(prefix = "MEDROUTE")]
struct FacilitiesArgs {
    /// Facility snapshot (JSON array) to read.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    snapshot: Option<Utf8PathBuf>,
    /// SQLite capacity database to read.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    database: Option<Utf8PathBuf>,
}

fn run_facilities_with(args: FacilitiesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let source = StoreSource::choose(merged.snapshot, merged.database, ENV_FACILITIES_SNAPSHOT)?;
    source.validate()?;
    let facilities = source.open()?.store.all()?;
    write_json(writer, &facilities)
}

pub(crate) fn write_json<T>(writer: &mut dyn Write, value: &T) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
