//! CLI commands implementation.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use console::style;
use url::Url;

use crate::config::HarvestConfig;
use crate::context::HarvestContext;
use crate::driver::PageDriver;
use crate::harvest::filters;
use crate::harvest::session::HarvestSession;
use crate::sink::{self, ExportFormat};
use crate::site;

#[derive(Parser)]
#[command(name = "gemharvest")]
#[command(about = "Diamond listing harvester producing typed, deduplicated datasets")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML); defaults apply when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest every configured category into one dataset file
    Harvest {
        /// Restrict the run to these category names (default: all configured)
        #[arg(short = 'C', long = "category")]
        categories: Vec<String>,
        /// Override the initial lower price bound
        #[arg(long)]
        min_price: Option<u32>,
        /// Override the initial upper price bound
        #[arg(long)]
        max_price: Option<u32>,
        /// Dataset format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,
    },

    /// List the shape chips available on the search page
    Shapes,
}

/// Parse arguments and dispatch.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = HarvestConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Harvest {
            categories,
            min_price,
            max_price,
            format,
            headed,
        } => cmd_harvest(config, categories, min_price, max_price, format, headed).await,
        Commands::Shapes => cmd_shapes(config).await,
    }
}

async fn cmd_harvest(
    mut config: HarvestConfig,
    categories: Vec<String>,
    min_price: Option<u32>,
    max_price: Option<u32>,
    format: ExportFormat,
    headed: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    if !categories.is_empty() {
        config
            .categories
            .retain(|c| categories.iter().any(|name| name.eq_ignore_ascii_case(&c.name)));
        if config.categories.is_empty() {
            anyhow::bail!("no configured category matches {:?}", categories);
        }
    }
    let bounded = min_price.is_some() || max_price.is_some();
    if let Some(min) = min_price {
        config.min_price = min;
    }
    if let Some(max) = max_price {
        config.max_price = max;
    }
    if headed {
        config.browser.headless = false;
    }

    let context = HarvestContext::prepare(&config)?;
    let driver = launch_driver(&config).await?;
    let session = HarvestSession::new(driver, config.clone(), context.clone());

    println!(
        "{} Harvesting {} categor{}...",
        style("→").cyan(),
        config.categories.len(),
        if config.categories.len() == 1 { "y" } else { "ies" }
    );
    let report = session.run().await;

    let outcome = match report.failure {
        None => {
            // the bounded single-category flow keeps its window in the filename
            let window = (bounded && config.categories.len() == 1)
                .then_some((config.min_price, config.max_price));
            let path = sink::write_dataset(&context, &report.records, format, window)?;
            println!(
                "{} {} records written to {}",
                style("✓").green(),
                report.records.len(),
                path.display()
            );
            Ok(())
        }
        Some(failure) => {
            println!("{} Harvest failed: {}", style("✗").red(), failure.error);
            if let Some(snapshot) = failure.snapshot {
                println!("  diagnostic snapshot: {}", snapshot.display());
            }
            Err(anyhow::anyhow!("harvest aborted"))
        }
    };

    println!("Finished in {:.1} seconds", started.elapsed().as_secs_f64());
    outcome
}

async fn cmd_shapes(config: HarvestConfig) -> anyhow::Result<()> {
    let landing = Url::parse(&config.base_url)?.join(
        config
            .categories
            .first()
            .map(|c| c.path.as_str())
            .unwrap_or(site::NATURAL_PATH),
    )?;

    let mut driver = launch_driver(&config).await?;
    let outcome = shape_labels(driver.as_ref(), &config, landing.as_str()).await;
    let _ = driver.close().await;

    let shapes = outcome?;
    if shapes.is_empty() {
        println!("{} No shape chips found", style("✗").red());
    } else {
        for shape in &shapes {
            println!("{shape}");
        }
    }
    Ok(())
}

async fn shape_labels(
    driver: &dyn PageDriver,
    config: &HarvestConfig,
    landing: &str,
) -> anyhow::Result<Vec<String>> {
    driver.navigate(landing).await?;
    let settle = config.waits.page_load();
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
    filters::dismiss_overlay(driver, &config.waits).await;

    let html = driver.rendered_html().await?;
    Ok(crate::extract::texts(
        &html,
        &format!("{} a", site::SHAPE_MENU),
    ))
}

#[cfg(feature = "browser")]
async fn launch_driver(config: &HarvestConfig) -> anyhow::Result<Box<dyn PageDriver>> {
    use crate::driver::ChromiumDriver;

    let driver = ChromiumDriver::launch(&config.browser)
        .await?
        .with_scroll_container(site::RESULTS_WRAPPER);
    Ok(Box::new(driver))
}

#[cfg(not(feature = "browser"))]
async fn launch_driver(_config: &HarvestConfig) -> anyhow::Result<Box<dyn PageDriver>> {
    anyhow::bail!("browser support not compiled in; rebuild with the `browser` feature")
}
