use clap::Parser;
use std::path::PathBuf;

use crate::loader::DEFAULT_INPUT;

#[derive(Debug, Parser)]
#[command(author, version, about = "PLKUMKM vs KDM reconciliation report per SLS", long_about = None)]
pub struct Cli {
    /// Spreadsheet (.xlsx) or CSV file to load
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,
    /// Directory that receives exported files
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
    /// Start with the smallest difference first
    #[arg(long)]
    pub ascending: bool,
}
