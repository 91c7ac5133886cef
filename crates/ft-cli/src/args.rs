use std::path::PathBuf;

use clap::Parser;

/// Run type inference over a single source file and print its annotations.
#[derive(Parser, Debug)]
#[command(name = "ft", version, about = "Infer types for a scripting-language source file")]
pub struct CliArgs {
    /// Source file to analyze.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Use the constraint-based (MLsub biunification) pipeline instead of the
    /// default CFG-based flow analysis.
    #[arg(long)]
    pub constraints: bool,

    /// Print the result as JSON instead of colored text.
    #[arg(long)]
    pub json: bool,
}
