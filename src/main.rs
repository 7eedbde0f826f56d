pub mod types;
pub mod config;
pub mod data;
pub mod format;
pub mod geometry;
pub mod index;
pub mod legend;
pub mod metrics;
pub mod page;
pub mod projection;
pub mod render;
pub mod scale;
pub mod server;
pub mod state;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use types::Statistic;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the choropleth to an SVG file
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Statistic to color counties by
        #[arg(short, long, value_enum, default_value_t = Statistic::Population)]
        statistic: Statistic,
        /// Overrides `output.svg` from the config
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Serve the interactive map
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { config, statistic, output } => {
            println!("Rendering map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(&config)?;

            // 1. Load the three sources side by side
            let sources = data::load_sources(&app_config.input).await;

            // 2. Build scales and apply the selection
            let mut app = state::AppState::from_sources(sources, app_config.render.clone())?;
            app.select(statistic);

            // 3. Write the SVG
            let path = output.unwrap_or(app_config.output.svg);
            render::render_to_file(&app, &path)?;

            println!("Render complete: {:?}", path);
        }
        Commands::Serve { config } => {
            println!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(&config)?;
            server::start_server(app_config).await?;
        }
    }

    Ok(())
}
