use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "depot",
    version,
    about = "Process staged app submissions into the published store tree and index"
)]
pub struct Cli {
    /// Store root containing publish/, apps/, assets/ and index.json
    #[arg(long, env = "DEPOT_STORE_ROOT")]
    pub store_root: Option<PathBuf>,

    /// Public base URL used for downloadUrl and iconUrl
    #[arg(long)]
    pub base_url: Option<String>,

    /// Payload file extension (app.<ext>)
    #[arg(long = "payload-ext")]
    pub payload_ext: Option<String>,

    /// Write the run report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Exit non-zero when any submission is denied or fails
    #[arg(long)]
    pub strict: bool,
}
