//! Recommend command implementation for the medroute CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use medroute_core::{DispatchRequest, Recommendation, Recommender};
use medroute_fs::read_utf8;
use medroute_refine::{AnnealingRecommender, RefinementConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::store::{StoreSource, require_existing};
use crate::{
    ARG_DATABASE, ARG_RECOMMEND_REQUEST, ARG_RESULT_SIZE, ARG_SEED, ARG_SNAPSHOT, ARG_TOP_K,
    CliError, ENV_RECOMMEND_REQUEST, ENV_RECOMMEND_SNAPSHOT, write_json,
};

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank hospitals for one patient. The dispatch request is a \
                 JSON file giving the patient's location, condition and \
                 hard requirements; facilities come from a JSON snapshot or \
                 a SQLite capacity database.",
    about = "Recommend hospitals for a dispatch request"
)]
#[ortho_config(prefix = "MEDROUTE")]
pub(crate) struct RecommendArgs {
    /// Path to a JSON file containing a DispatchRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Facility snapshot (JSON array) to rank.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
    /// SQLite capacity database to rank.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Seed for reproducible refinement. Omit for fresh randomness.
    #[arg(long = ARG_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Number of hospitals to return (default 10).
    #[arg(long = ARG_RESULT_SIZE, value_name = "n")]
    #[serde(default)]
    pub(crate) result_size: Option<usize>,
    /// Number of heuristic candidates to refine (default 15).
    #[arg(long = ARG_TOP_K, value_name = "n")]
    #[serde(default)]
    pub(crate) top_k: Option<usize>,
}

impl RecommendArgs {
    pub(crate) fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecommendConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) source: StoreSource,
    pub(crate) seed: Option<u64>,
    pub(crate) refinement: RefinementConfig,
}

impl RecommendConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_RECOMMEND_REQUEST)?;
        self.source.validate()
    }
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_RECOMMEND_REQUEST,
            env: ENV_RECOMMEND_REQUEST,
        })?;
        let source = StoreSource::choose(args.snapshot, args.database, ENV_RECOMMEND_SNAPSHOT)?;
        let defaults = RefinementConfig::default();
        let refinement = RefinementConfig {
            top_k: args.top_k.unwrap_or(defaults.top_k),
            result_size: args.result_size.unwrap_or(defaults.result_size),
            ..defaults
        };
        Ok(Self {
            request_path,
            source,
            seed: args.seed,
            refinement,
        })
    }
}

pub(super) fn run_recommend_with(
    args: RecommendArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let recommendation = execute_recommend(&config)?;
    write_json(writer, &recommendation)
}

pub(super) fn execute_recommend(config: &RecommendConfig) -> Result<Recommendation, CliError> {
    let request = load_dispatch_request(&config.request_path)?;
    request
        .validate()
        .map_err(|source| CliError::InvalidRequest {
            path: config.request_path.clone(),
            source,
        })?;
    let opened = config.source.open()?;
    let recommender = match config.seed {
        Some(seed) => AnnealingRecommender::seeded(opened.store, seed),
        None => AnnealingRecommender::from_entropy(opened.store),
    }
    .with_refinement(config.refinement.clone());
    recommender
        .recommend(&request)
        .map_err(|source| CliError::Recommend { source })
}

/// Loads a JSON-encoded [`DispatchRequest`] from disk.
pub(super) fn load_dispatch_request(path: &Utf8Path) -> Result<DispatchRequest, CliError> {
    let contents = read_utf8(path).map_err(|source| CliError::OpenRequest {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::ParseRequest {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RecommendConfig, CliError> {
    let merged = RecommendArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RecommendConfig::try_from(merged)
}
