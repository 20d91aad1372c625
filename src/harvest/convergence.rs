//! Lazy-load convergence: force a virtualized results table to materialize.

use std::time::Duration;

use tracing::{debug, trace};

use crate::config::ConvergenceOptions;
use crate::driver::{DriverError, PageDriver};
use crate::extract;

/// One item-count observation inside a convergence walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceSample {
    pub position_index: usize,
    pub observed_item_count: usize,
}

/// Walk the configured scroll positions until the rendered item count stops
/// growing by a full batch, leaving the page fully materialized for the
/// extraction that follows.
///
/// A count delta below the batch size means the current query has nothing
/// left to render: that is the success path. Running out of positions is not
/// a failure either, the table is simply used as loaded. The walk never
/// scrolls past the final configured position.
pub async fn render_to_convergence(
    driver: &dyn PageDriver,
    anchor_css: &str,
    options: &ConvergenceOptions,
    settle: Duration,
) -> Result<(), DriverError> {
    let mut previous = sample(driver, anchor_css).await?;
    if previous <= 1 {
        // Zero or one result renders in full without any scrolling.
        debug!("table converged immediately ({} item(s))", previous);
        return Ok(());
    }

    for (position_index, position) in options.positions().into_iter().enumerate() {
        driver.scroll_to(position).await?;
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
        let observed = sample(driver, anchor_css).await?;
        let point = ConvergenceSample {
            position_index,
            observed_item_count: observed,
        };
        trace!(?point, "convergence sample");

        if observed.saturating_sub(previous) < options.batch_size {
            debug!(
                "table converged at position {} with {} items",
                position_index, observed
            );
            return Ok(());
        }
        previous = observed;
    }

    debug!(
        "scroll positions exhausted at {} items, using table as loaded",
        previous
    );
    Ok(())
}

async fn sample(driver: &dyn PageDriver, anchor_css: &str) -> Result<usize, DriverError> {
    let html = driver.rendered_html().await?;
    Ok(extract::rendered_item_count(&html, anchor_css))
}
