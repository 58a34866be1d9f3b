use anyhow::Context;
use clap::Parser;
use phylosample::config::Settings;
use phylosample::{pipeline, TracingDropLog};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "phylosample",
    about = "Normalise collection dates and subsample a sequence set per category"
)]
struct Cli {
    /// JSON array of records: [{"name", "description", "seq"}, ...].
    #[arg(long)]
    input: PathBuf,

    /// Config file (TOML, YAML or JSON). Defaults to the per-user config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the output document here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Override the segment name.
    #[arg(long)]
    segment: Option<String>,

    /// Override the per-category threshold.
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<i64>,

    /// Seed for the random default priority.
    #[arg(long)]
    seed: Option<u64>,

    /// Log every dropped record.
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let mut settings = Settings::load(cli.config.as_deref()).context("could not load config")?;
    if let Some(segment) = cli.segment {
        settings.segment = segment;
    }
    if let Some(threshold) = cli.threshold {
        settings.subsample.threshold = threshold;
    }
    if cli.seed.is_some() {
        settings.subsample.seed = cli.seed;
    }

    let records = pipeline::load_records(&cli.input)?;
    let outcome = pipeline::run(&settings, records, &mut TracingDropLog)?;

    let input_file = cli.input.display().to_string();
    match &cli.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("could not create {}", path.display()))?;
            outcome
                .set
                .write_json(std::io::BufWriter::new(file), Some(&input_file))?;
            tracing::info!(path = %path.display(), n = outcome.set.len(), "wrote sequences");
        }
        None => outcome.set.write_json(std::io::stdout().lock(), Some(&input_file))?,
    }
    Ok(())
}
