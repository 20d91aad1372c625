//! Top-level harvest session: one browser session, categories in sequence.

use std::path::PathBuf;

use tracing::{error, info, warn};
use url::Url;

use crate::config::{CategoryConfig, HarvestConfig};
use crate::context::HarvestContext;
use crate::driver::PageDriver;
use crate::error::HarvestError;
use crate::harvest::filters;
use crate::harvest::identity::merge;
use crate::harvest::paginate::Paginator;
use crate::harvest::record::Record;

/// Outcome of a harvest run. `records` holds whatever completed before a
/// failure; the caller decides what a partial dataset is worth.
#[derive(Debug)]
pub struct HarvestReport {
    pub records: Vec<Record>,
    pub failure: Option<HarvestFailure>,
}

/// Diagnostic captured when a category aborts.
#[derive(Debug)]
pub struct HarvestFailure {
    pub error: HarvestError,
    pub snapshot: Option<PathBuf>,
}

/// Owns the page driver for the lifetime of a run and releases it no matter
/// how the run ends. Categories share nothing but the browser session and
/// run strictly one after another.
pub struct HarvestSession {
    driver: Box<dyn PageDriver>,
    config: HarvestConfig,
    context: HarvestContext,
}

impl HarvestSession {
    pub fn new(
        driver: Box<dyn PageDriver>,
        config: HarvestConfig,
        context: HarvestContext,
    ) -> Self {
        Self {
            driver,
            config,
            context,
        }
    }

    /// Harvest every configured category in order. A failing category stops
    /// the run: its diagnostic is captured, later categories are skipped,
    /// and the browser session is closed either way. There is no retry.
    pub async fn run(mut self) -> HarvestReport {
        let mut dataset: Vec<Record> = Vec::new();
        let mut failure: Option<HarvestFailure> = None;

        match Url::parse(&self.config.base_url) {
            Ok(base_url) => {
                let categories = self.config.categories.clone();
                for category in &categories {
                    info!(category = %category.name, "starting category");
                    match self.harvest_category(category, &base_url).await {
                        // cross-category duplicates are pathological, but the
                        // global guarantee holds anyway
                        Ok(records) => dataset = merge(dataset, records),
                        Err(err) => {
                            error!(category = %category.name, error = %err, "category aborted");
                            let snapshot = self.capture_snapshot().await;
                            failure = Some(HarvestFailure {
                                error: err,
                                snapshot,
                            });
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                failure = Some(HarvestFailure {
                    error: HarvestError::Config(format!(
                        "invalid base url {:?}: {e}",
                        self.config.base_url
                    )),
                    snapshot: None,
                });
            }
        }

        if let Err(e) = self.driver.close().await {
            warn!("browser close failed: {}", e);
        }

        HarvestReport {
            records: dataset,
            failure,
        }
    }

    async fn harvest_category(
        &self,
        category: &CategoryConfig,
        base_url: &Url,
    ) -> Result<Vec<Record>, HarvestError> {
        let landing = base_url.join(&category.path).map_err(|e| {
            HarvestError::Config(format!("invalid category path {:?}: {e}", category.path))
        })?;
        self.driver.navigate(landing.as_str()).await?;

        let settle = self.config.waits.page_load();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
        filters::dismiss_overlay(self.driver.as_ref(), &self.config.waits).await;

        Paginator::new(
            self.driver.as_ref(),
            &self.config,
            category,
            base_url.clone(),
            self.context.started_at,
        )
        .run()
        .await
    }

    async fn capture_snapshot(&self) -> Option<PathBuf> {
        let path = self.context.snapshot_path();
        match self.driver.save_snapshot(&path).await {
            Ok(()) => {
                info!("diagnostic snapshot saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("diagnostic snapshot failed: {}", e);
                None
            }
        }
    }
}
