use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tripmeter::{TripProcessor, TripmeterConfig, batch, provider};

fn usage() -> ! {
    eprintln!("Usage: tripmeter <resolve|survey> <input.csv> <output.csv>");
    eprintln!();
    eprintln!("  resolve  one mode per record, derived from its travel-method text");
    eprintln!("  survey   every ground mode plus the flight approximation per record");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let [_, command, input, output] = args.as_slice() else {
        usage();
    };
    let input = PathBuf::from(input);
    let output = PathBuf::from(output);

    // Configuration problems abort here, before any record is touched.
    let config = TripmeterConfig::load().context("failed to load configuration")?;
    init_logging(&config);

    let provider = provider::from_config(&config)?;
    let processor = TripProcessor::from_config(provider.as_ref(), &config);
    let pacing = Duration::from_millis(config.provider.pacing_ms);

    let summary = match command.as_str() {
        "resolve" => batch::run_resolve(&processor, &input, &output, pacing).await?,
        "survey" => batch::run_survey(&processor, &input, &output, pacing).await?,
        other => bail!("unknown command '{other}', expected 'resolve' or 'survey'"),
    };

    println!(
        "Processed {} records: {} succeeded, {} skipped, {} failed",
        summary.processed, summary.succeeded, summary.skipped, summary.failed
    );
    Ok(())
}

fn init_logging(config: &TripmeterConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
