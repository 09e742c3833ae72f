//! Band synthesis command

use super::{print_json, read_input};
use crate::error::CliResult;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use vitals_anomaly::{
    parse_primary, CrossSignalModel, EngineConfig, NoNoise, NoiseSource, SampleBatch,
    SystemClock, UniformNoise,
};

/// Arguments for `vitals synthesize`
#[derive(Debug, Args)]
pub struct SynthesizeArgs {
    /// JSON array of ECG samples to derive bands from
    #[arg(long)]
    pub primary: PathBuf,

    /// Seed the noise generator for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable noise entirely
    #[arg(long, conflicts_with = "seed")]
    pub no_noise: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the synthesize command
pub async fn execute(args: SynthesizeArgs, engine: EngineConfig) -> CliResult<()> {
    let primary = parse_primary(&read_input(&args.primary)?)?;
    // Same validation as detection input.
    SampleBatch::new(Some(&primary), None)?;

    let noise: Arc<dyn NoiseSource> = if args.no_noise {
        Arc::new(NoNoise)
    } else {
        match args.seed {
            Some(seed) => Arc::new(UniformNoise::seeded(engine.noise_amplitude, seed)),
            None => Arc::new(UniformNoise::new(engine.noise_amplitude)),
        }
    };
    let model = CrossSignalModel::new(Arc::new(SystemClock), noise);

    let bands = model.synthesize(&primary);
    info!(count = bands.len(), "synthesized band samples");

    print_json(&bands, args.pretty)
}
