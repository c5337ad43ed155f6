//! Book command implementation for the medroute CLI.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use medroute_core::{FacilityId, InstantBooking, ReservationOutcome, ResourceCategory, Severity};
use medroute_reserve::{ReservationCoordinator, SubscriberRegistry};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::store::StoreSource;
use crate::{
    ARG_CATEGORY, ARG_CONDITION, ARG_DATABASE, ARG_FACILITY, ARG_REQUESTER, ARG_SNAPSHOT,
    CliError, ENV_BOOK_CATEGORY, ENV_BOOK_FACILITY, ENV_BOOK_REQUESTER, ENV_BOOK_SNAPSHOT,
    write_json,
};

/// CLI arguments for the `book` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Claim one unit of capacity at a facility without operator \
                 approval. A rejected booking is reported in the JSON output \
                 rather than as a command failure. Claims against a snapshot \
                 are written back to the snapshot file.",
    about = "Book a bed or specialist instantly"
)]
#[ortho_config(prefix = "MEDROUTE")]
pub(crate) struct BookArgs {
    /// Facility identifier.
    #[arg(long = ARG_FACILITY, value_name = "id")]
    #[serde(default)]
    pub(crate) facility: Option<String>,
    /// Resource to claim: icuBeds, generalBeds or a specialist such as cardiologist.
    #[arg(long = ARG_CATEGORY, value_name = "category")]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Identifier of the requesting unit, e.g. an ambulance call sign.
    #[arg(long = ARG_REQUESTER, value_name = "id")]
    #[serde(default)]
    pub(crate) requester: Option<String>,
    /// Patient condition passed on to the facility.
    #[arg(long = ARG_CONDITION, value_name = "severity")]
    #[serde(default)]
    pub(crate) condition: Option<String>,
    /// Facility snapshot (JSON array) to book against.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
    /// SQLite capacity database to book against.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl BookArgs {
    pub(crate) fn into_config(self) -> Result<BookConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BookConfig::try_from(merged)
    }
}

/// Resolved `book` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BookConfig {
    pub(crate) booking: InstantBooking,
    pub(crate) source: StoreSource,
}

impl TryFrom<BookArgs> for BookConfig {
    type Error = CliError;

    fn try_from(args: BookArgs) -> Result<Self, Self::Error> {
        let facility = args.facility.ok_or(CliError::MissingArgument {
            field: ARG_FACILITY,
            env: ENV_BOOK_FACILITY,
        })?;
        let category: ResourceCategory = args
            .category
            .ok_or(CliError::MissingArgument {
                field: ARG_CATEGORY,
                env: ENV_BOOK_CATEGORY,
            })?
            .parse()?;
        let requester_id = args.requester.ok_or(CliError::MissingArgument {
            field: ARG_REQUESTER,
            env: ENV_BOOK_REQUESTER,
        })?;
        let condition = args
            .condition
            .as_deref()
            .map(str::parse::<Severity>)
            .transpose()?;
        let source = StoreSource::choose(args.snapshot, args.database, ENV_BOOK_SNAPSHOT)?;
        Ok(Self {
            booking: InstantBooking {
                facility_id: FacilityId::new(facility),
                category,
                requester_id,
                condition,
            },
            source,
        })
    }
}

pub(super) fn run_book_with(args: BookArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.source.validate()?;
    let outcome = execute_book(config)?;
    write_json(writer, &outcome)
}

pub(super) fn execute_book(config: BookConfig) -> Result<ReservationOutcome, CliError> {
    let opened = config.source.open_exclusive()?;
    let coordinator =
        ReservationCoordinator::new(Arc::clone(&opened.store), Arc::new(SubscriberRegistry::new()));
    let session = coordinator.registry().connect();
    let outcome = coordinator.instant_booking(session.id(), config.booking);
    if outcome.granted {
        opened.persist()?;
        info!(
            "booked {} at {}, {} left",
            outcome.category,
            outcome.facility_id,
            outcome.remaining.unwrap_or_default()
        );
    }
    Ok(outcome)
}
