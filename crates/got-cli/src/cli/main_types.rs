use clap::{Args, Parser, Subcommand, ValueEnum};
use got_core::display::TableDisplay;

#[derive(Parser)]
#[command(name = "got")]
#[command(about = "Browse the houses of Westeros from the Ice and Fire API")]
#[command(version)]
#[command(after_help = "Examples:
  got houses                          # First page of houses
  got houses --page 3 --page-size 10  # Third page, ten per page
  got houses --format json            # Output as JSON
  got browse --pages 5                # Walk the first five pages
  got status                          # Check network and API reachability
  got config show                     # Show effective configuration
  got config set page_size 30         # Change a setting

Environment Variables:
  GOT_API_URL   Base URL of the API (overrides config.toml)
  RUST_LOG      Log filter, e.g. got_core=debug")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// API base URL for this run only
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Maximum table width in columns (clamped to 40..=200)
    #[arg(long, global = true)]
    pub width: Option<usize>,

    /// Plain table output without colors
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Table renderer shaped by `--width` and `--no-color`.
    pub fn table_display(&self) -> TableDisplay {
        let display = match self.width {
            Some(width) => TableDisplay::new().with_max_width(width),
            None => TableDisplay::new(),
        };
        if self.no_color {
            display.with_colors(false)
        } else {
            display
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a single page of houses
    Houses(HousesArgs),
    /// Page through houses until the last page or --pages
    Browse(BrowseArgs),
    /// Report connectivity and API reachability
    Status,
    /// Configuration management (show, set)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Set one configuration value
    #[command(after_help = "Keys:
  base_url, page_size, connect_timeout_secs, request_timeout_secs,
  connectivity_probe, probe_interval_secs

Examples:
  got config set base_url https://www.anapioficeandfire.com/api/
  got config set connectivity_probe 8.8.8.8:53")]
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct HousesArgs {
    /// Page to fetch, starting at 1
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Houses per page (defaults to the configured page_size)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Show every field of each house instead of a summary row
    #[arg(long)]
    pub detail: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Stop after this many pages
    #[arg(long)]
    pub pages: Option<u32>,

    /// Houses per page (defaults to the configured page_size)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}
