use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "knativize")]
#[command(about = "Migrate Go AWS Lambda handlers to Knative-style HTTP functions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the Go file containing the AWS Lambda handler
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to write the modified Go file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
