//! Cursor pagination over a price-filtered results view.
//!
//! The storefront has no pagination token, so progress is inferred from the
//! accumulated records themselves: the next window re-queries with the
//! highest price seen so far as the new lower bound, deliberately
//! re-observing the boundary rows, and exact-row dedup collapses the
//! overlap. The loop is done when a fresh window moves neither the price
//! extremum nor the tail identity. Either signal alone is unreliable: price
//! ties are common, and an unchanged tail can coexist with a moving
//! extremum, so both have to stall before the feed counts as exhausted.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{CategoryConfig, HarvestConfig};
use crate::driver::PageDriver;
use crate::error::HarvestError;
use crate::extract;
use crate::harvest::convergence::render_to_convergence;
use crate::harvest::filters;
use crate::harvest::identity::{assign_identity, merge};
use crate::harvest::normalize::normalize;
use crate::harvest::record::Record;
use crate::site;

/// Progress marker derived from the accumulated result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Highest price observed so far; the next window's lower bound. Never
    /// decreases across iterations.
    pub max_price: u32,
    /// Identity of the last record in extraction order.
    pub tail_identity: String,
}

/// Accumulating result set of one category's pagination run.
#[derive(Debug, Default)]
pub struct HarvestState {
    records: Vec<Record>,
    cycles: u32,
}

impl HarvestState {
    /// Fold one cycle's records in, dropping exact duplicates. Returns how
    /// many records were new.
    fn absorb(&mut self, incoming: Vec<Record>) -> usize {
        let before = self.records.len();
        let existing = std::mem::take(&mut self.records);
        self.records = merge(existing, incoming);
        self.records.len() - before
    }

    /// Current cursor; `None` while nothing has been harvested.
    pub fn cursor(&self) -> Option<Cursor> {
        let tail = self.records.last()?;
        let max_price = self
            .records
            .iter()
            .map(|record| record.price)
            .max()
            .unwrap_or(tail.price);
        Some(Cursor {
            max_price,
            tail_identity: tail.identity.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Runs the fetch → converge → extract → merge cycle for one category until
/// the cursor stops moving.
pub struct Paginator<'a> {
    driver: &'a dyn PageDriver,
    config: &'a HarvestConfig,
    category: &'a CategoryConfig,
    base_url: Url,
    fetched_at: DateTime<Utc>,
    state: HarvestState,
}

impl<'a> Paginator<'a> {
    pub fn new(
        driver: &'a dyn PageDriver,
        config: &'a HarvestConfig,
        category: &'a CategoryConfig,
        base_url: Url,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            driver,
            config,
            category,
            base_url,
            fetched_at,
            state: HarvestState::default(),
        }
    }

    /// Run the category to exhaustion and return its records, tagged and
    /// deduplicated. Any error aborts the whole category; there is no
    /// partial-result fallback.
    pub async fn run(mut self) -> Result<Vec<Record>, HarvestError> {
        if self.category.select_shapes {
            filters::select_shapes(self.driver, &self.config.shapes).await?;
        }
        filters::set_price_window(
            self.driver,
            &self.config.waits,
            self.config.min_price,
            self.config.max_price,
        )
        .await?;
        self.fetch_cycle().await?;

        let mut cursor = self.state.cursor();
        while let Some(previous) = cursor {
            if self.state.cycles >= self.config.max_cycles {
                warn!(
                    category = %self.category.name,
                    cycles = self.state.cycles,
                    "cycle cap reached, stopping pagination"
                );
                break;
            }

            filters::raise_price_floor(self.driver, &self.config.waits, previous.max_price)
                .await?;
            self.fetch_cycle().await?;

            let next = self.state.cursor();
            if next.as_ref() == Some(&previous) {
                debug!(category = %self.category.name, "cursor stalled, feed exhausted");
                break;
            }
            cursor = next;
        }

        info!(
            category = %self.category.name,
            records = self.state.len(),
            cycles = self.state.cycles,
            "category harvested"
        );
        Ok(self.state.records)
    }

    /// One fetch cycle: render to convergence, extract the data grid and the
    /// item anchors, normalize, attach identities, and fold into the state.
    async fn fetch_cycle(&mut self) -> Result<(), HarvestError> {
        render_to_convergence(
            self.driver,
            site::ITEM_ANCHOR,
            &self.config.convergence,
            self.config.waits.render_settle(),
        )
        .await?;
        let html = self.driver.rendered_html().await?;
        self.state.cycles += 1;

        let Some(grid) = extract::data_grid(&html) else {
            warn!(
                category = %self.category.name,
                "results table missing, treating as an empty window"
            );
            return Ok(());
        };
        let listings = normalize(&grid)?;
        let hrefs = extract::anchors(&html, site::ITEM_ANCHOR);
        let refs = assign_identity(&hrefs, &self.base_url)?;
        if listings.len() != refs.len() {
            debug!(
                rows = listings.len(),
                links = refs.len(),
                "row/link count mismatch, zipping the shorter side"
            );
        }

        let incoming: Vec<Record> = listings
            .into_iter()
            .zip(refs)
            .map(|(listing, item)| Record {
                identity: item.identity,
                shape: listing.shape,
                price: listing.price,
                carat: listing.carat,
                cut: listing.cut,
                color: listing.color,
                clarity: listing.clarity,
                report: listing.report,
                reference_url: item.reference_url,
                category: self.category.name.clone(),
                fetched_at: self.fetched_at,
            })
            .collect();

        let added = self.state.absorb(incoming);
        debug!(
            category = %self.category.name,
            cycle = self.state.cycles,
            added,
            total = self.state.len(),
            "fetch cycle merged"
        );
        Ok(())
    }
}
