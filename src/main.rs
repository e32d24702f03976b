use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

mod api;
mod feed;
mod inventory;
mod output;
mod stats;
mod telemetry;
mod util;

use api::ApiConfig;
use feed::cursor::CursorMode;

#[derive(Parser)]
#[command(name = "herb", about = "Herb inventory log CLI")]
struct Cli {
    /// Server base URL (overrides HERB_API_URL)
    #[arg(global = true, long)]
    base_url: Option<String>,
    /// Pagination style of the log endpoint (overrides HERB_CURSOR_MODE)
    #[arg(global = true, long, value_enum)]
    cursor: Option<CursorMode>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Log(feed::LogCmd),
    Stats(stats::StatsCmd),
    Inventory(inventory::InventoryCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // logs go to stderr; respects RUST_LOG and HERB_LOG_FORMAT
    telemetry::config::init_tracing();
    let cfg = ApiConfig::from_env().with_overrides(cli.base_url, cli.cursor);

    match cli.command {
        Commands::Log(args) => feed::run(&cfg, args).await?,
        Commands::Stats(args) => stats::run(&cfg, args).await?,
        Commands::Inventory(args) => inventory::run(&cfg, args).await?,
    }

    Ok(())
}
