use clap::Parser;
use ipp_registry::cli::TypegenArgs;
use ipp_registry::config::Config;
use ipp_registry::{RecordCorpus, resolve};
use miette::{Report, miette};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "IPP_TYPEGEN_LOG";
const DEFAULT_OUTPUT: &str = "ipp-model.json";

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = match std::env::var(LOG_ENV) {
        Ok(_) => EnvFilter::from_env(LOG_ENV),
        Err(_) => EnvFilter::new(format!("ipp_registry={default},ipp_typegen={default}")),
    };
    tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> miette::Result<()> {
    let args = TypegenArgs::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let input = args
        .input
        .or(config.input)
        .ok_or_else(|| miette!("No input given; pass --input or set `input` in the config file"))?;
    let output = args
        .output
        .or(config.output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let deny_warnings = args.deny_warnings || config.deny_warnings;

    tracing::info!(input = %input.display(), "loading registry records");
    let corpus = RecordCorpus::load(&input)?;
    tracing::info!(files = corpus.files().len(), records = corpus.len(), "loaded records");

    let model = resolve(corpus.records());
    model.write_json(&output)?;

    let count = model.warning_count();
    if count > 0 {
        for warning in &model.warnings {
            eprintln!("{:?}", Report::new(warning.clone()));
        }
        eprintln!("{count} warning(s)");
    }
    println!(
        "Resolved {} types and {} collections to {}",
        model.types.len(),
        model.collections.len(),
        output.display()
    );

    if deny_warnings && count > 0 {
        return Err(miette!("{count} warning(s) with --deny-warnings"));
    }
    Ok(())
}
