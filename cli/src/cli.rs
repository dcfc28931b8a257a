use std::path::PathBuf;

/// Ballot-measure vote normalization and census apportionment
#[derive(clap::Parser, Debug)]
#[command(name = "nimbyvote", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Apportion census block-group values onto precincts for every era
    Apportion(ApportionArgs),

    /// Normalize election results and build the analysis table
    Analyze(AnalyzeArgs),

    /// List workbook sheets that look like proposition results
    Sheets(SheetsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ApportionArgs {
    /// Pipeline configuration file (TOML)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output directory, overrides `output_dir` from the configuration
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Pipeline configuration file (TOML)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output directory, overrides `output_dir` from the configuration
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Reuse census_by_precinct_<key>.csv tables from the output directory
    /// instead of recomputing the apportionment
    #[arg(long)]
    pub reuse: bool,
}

#[derive(clap::Args, Debug)]
pub struct SheetsArgs {
    /// Election results workbook (.xls or .xlsx)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub workbook: PathBuf,

    /// Case-insensitive regex a sheet name must match
    #[arg(short, long, default_value = "prop")]
    pub pattern: String,

    /// Case-insensitive regex a sheet name must not match
    #[arg(short, long)]
    pub exclude: Option<String>,
}
