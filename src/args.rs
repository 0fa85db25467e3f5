use clap::Parser;

/// Voting alliance analysis for elimination-style competition seasons.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (number, optional) A single season to analyze or validate. When a single season is
    /// requested, a detailed report of its strongest pairs is printed.
    #[clap(value_parser)]
    pub season: Option<u32>,

    /// (two numbers) An inclusive range of seasons to process. Without this flag and without a
    /// season argument, every season present in the metadata table is processed.
    #[clap(long, number_of_values = 2, value_parser)]
    pub range: Option<Vec<u32>>,

    /// (file path, default season_metadata.json) The season metadata table in JSON format.
    #[clap(short, long, value_parser)]
    pub metadata: Option<String>,

    /// (directory, default data/input) Directory containing the per-season data files
    /// (season<N>.json).
    #[clap(short, long, value_parser)]
    pub data_dir: Option<String>,

    /// (directory, default data/seasons) Where the per-season result files are written.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// Run the data validation checks instead of the analysis. The exit status is non-zero if
    /// any ERROR-severity finding is reported.
    #[clap(long, takes_value = false)]
    pub validate: bool,

    /// With --validate, only check the metadata table (skip the data files).
    #[clap(long, takes_value = false)]
    pub metadata_only: bool,

    /// During analysis, fail a season when its validation reports any error instead of
    /// aggregating it anyway.
    #[clap(long, takes_value = false)]
    pub strict: bool,

    /// (default 2) Minimum number of shared votes for a pair to count as a strong alliance.
    #[clap(long, value_parser)]
    pub min_votes: Option<u32>,

    /// (file path) Reference results for a single-season run. The run fails if the computed
    /// summary differs from the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path) Import a CSV vote export (season,episode,castaway,vote,voted_out columns)
    /// and write per-season data files into the data directory.
    #[clap(long, value_parser)]
    pub import_csv: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
