use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Resolve IANA IPP registry records into a typed model for code generation"
)]
pub struct TypegenArgs {
    /// Record JSON file, or a directory of record files
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Where to write the resolved model JSON
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Path to KDL config file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Exit with an error when the run produced warnings (the model is still written)
    #[arg(long)]
    pub deny_warnings: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
