//! Filter interactions: marketing overlay, shape chips, price bounds.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::WaitOptions;
use crate::driver::{DriverError, PageDriver};
use crate::poll::poll_until;
use crate::site;

/// Dismiss the marketing overlay when it shows up. The overlay is the one
/// element allowed to be missing: after the poll budget it is treated as
/// absent and the harvest proceeds.
pub async fn dismiss_overlay(driver: &dyn PageDriver, waits: &WaitOptions) {
    let dismissed = poll_until(waits.overlay_attempts, waits.overlay_settle(), || async move {
        driver.click(site::OVERLAY_CLOSE).await.ok()
    })
    .await;
    match dismissed {
        Some(()) => debug!("marketing overlay dismissed"),
        None => debug!("marketing overlay absent"),
    }
}

/// Select the configured shape chips, clearing the storefront's default
/// pre-selection unless it was asked for.
pub async fn select_shapes(
    driver: &dyn PageDriver,
    shapes: &[String],
) -> Result<(), DriverError> {
    if shapes.is_empty() {
        return Ok(());
    }

    let keeps_default = shapes
        .iter()
        .any(|shape| shape.eq_ignore_ascii_case(site::DEFAULT_SELECTED_SHAPE));
    if !keeps_default {
        toggle_shape(driver, site::DEFAULT_SELECTED_SHAPE).await?;
    }

    for shape in shapes {
        if shape.eq_ignore_ascii_case(site::DEFAULT_SELECTED_SHAPE) {
            continue; // already selected by the storefront
        }
        toggle_shape(driver, shape).await?;
    }
    Ok(())
}

async fn toggle_shape(driver: &dyn PageDriver, label: &str) -> Result<(), DriverError> {
    match site::shape_selector(label) {
        Some(selector) => driver.click(&selector).await,
        None => {
            warn!("unknown shape chip {:?}, skipping", label);
            Ok(())
        }
    }
}

/// Type both price bounds. The header click between the edits drops focus so
/// the storefront commits the first bound before the second is touched.
pub async fn set_price_window(
    driver: &dyn PageDriver,
    waits: &WaitOptions,
    min_price: u32,
    max_price: u32,
) -> Result<(), DriverError> {
    driver
        .type_text(site::MIN_PRICE_INPUT, &min_price.to_string())
        .await?;
    driver.click(site::SETTLE_TARGET).await?;
    driver
        .type_text(site::MAX_PRICE_INPUT, &max_price.to_string())
        .await?;
    settle(waits.filter_settle()).await;
    Ok(())
}

/// Raise only the lower bound, leaving the upper bound in place. This is how
/// the pagination engine advances its window.
pub async fn raise_price_floor(
    driver: &dyn PageDriver,
    waits: &WaitOptions,
    min_price: u32,
) -> Result<(), DriverError> {
    driver
        .type_text(site::MIN_PRICE_INPUT, &min_price.to_string())
        .await?;
    settle(waits.filter_settle()).await;
    Ok(())
}

async fn settle(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
