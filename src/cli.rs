use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "orderlens")]
#[command(version, about = "A terminal BI dashboard over retail order data")]
pub struct Cli {
    /// Path to the orders CSV file
    #[arg(default_value = "orders.csv")]
    pub orders: PathBuf,

    /// Path to the products CSV file
    #[arg(default_value = "products.csv")]
    pub products: PathBuf,

    /// Store backend that executes the catalogue queries
    #[arg(short, long, value_enum, default_value = "memory")]
    pub backend: Backend,

    /// Render one page to stdout instead of starting the TUI
    #[arg(short, long)]
    pub page: Option<String>,

    /// Output format for non-interactive mode
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Replace the built-in query catalogue with a TOML file
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Directory where exported CSV files are written
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// In-memory engine seeded from the two CSV files
    #[default]
    Memory,
    /// Remote Postgres endpoint configured via DB_* environment variables
    Postgres,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
