//! Anomaly detection command

use super::{print_json, read_input};
use crate::error::{CliError, CliResult};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use vitals_anomaly::{
    parse_bands, parse_primary, AnomalyAggregator, AnomalyType, EngineConfig, SampleBatch,
};

/// Arguments for `vitals detect`
#[derive(Debug, Args)]
pub struct DetectArgs {
    /// JSON array of ECG samples (`timestamp`, `value`)
    #[arg(long)]
    pub primary: Option<PathBuf>,

    /// JSON array of EEG band samples (`timestamp`, `alpha`, `beta`, `theta`, `delta`)
    #[arg(long)]
    pub bands: Option<PathBuf>,

    /// Only report one anomaly type (ECG, EEG, Combined)
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Drop samples before this epoch-ms timestamp
    #[arg(long)]
    pub start: Option<i64>,

    /// Drop samples after this epoch-ms timestamp
    #[arg(long)]
    pub end: Option<i64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the detect command
pub async fn execute(args: DetectArgs, engine: EngineConfig) -> CliResult<()> {
    if args.primary.is_none() && args.bands.is_none() {
        return Err(CliError::InvalidInput(
            "at least one of --primary or --bands is required".into(),
        ));
    }

    let filter = args
        .kind
        .as_deref()
        .map(str::parse::<AnomalyType>)
        .transpose()?;

    let primary = match &args.primary {
        Some(path) => parse_primary(&read_input(path)?)?,
        None => Vec::new(),
    };
    let bands = match &args.bands {
        Some(path) => parse_bands(&read_input(path)?)?,
        None => Vec::new(),
    };

    let mut batch = SampleBatch::new(Some(&primary), Some(&bands))?;
    if args.start.is_some() || args.end.is_some() {
        let start = args.start.unwrap_or(i64::MIN);
        let end = args.end.unwrap_or(i64::MAX);
        if start > end {
            return Err(CliError::InvalidInput(format!(
                "--start {} is after --end {}",
                start, end
            )));
        }
        batch = batch.within(start, end);
    }

    let aggregator = AnomalyAggregator::new(engine);
    let anomalies = aggregator.detect(&batch, filter).await;
    info!(count = anomalies.len(), "detection finished");

    print_json(&anomalies, args.pretty)
}
