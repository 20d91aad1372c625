//! Storefront selector glue.
//!
//! Everything page-specific lives here: the CSS the harvester clicks and
//! types into, the scroll surface that triggers lazy rendering, and the
//! category landing paths. The rest of the pipeline is layout-agnostic.

/// Storefront root; category paths and item links resolve against this.
pub const BASE_URL: &str = "https://www.brilliantearth.com/";

/// Landing path of the natural diamond search.
pub const NATURAL_PATH: &str = "loose-diamonds/search/";

/// Landing path of the lab diamond search.
pub const LAB_PATH: &str = "lab-diamonds-search/";

/// Close button of the marketing overlay shown on first load.
pub const OVERLAY_CLOSE: &str = ".sailthru-overlay-close";

/// Wrapper around the shape chips at the top of the search page.
pub const SHAPE_MENU: &str = "div.ir246-product-shape-wrap";

/// Lower bound of the price filter.
pub const MIN_PRICE_INPUT: &str = "#min_price_display";

/// Upper bound of the price filter.
pub const MAX_PRICE_INPUT: &str = "#max_price_display";

/// Clicked between filter edits to drop focus out of the price inputs.
pub const SETTLE_TARGET: &str = "h1";

/// Scrollable container of the virtualized results table.
pub const RESULTS_WRAPPER: &str = "#diamond_search_wrapper";

/// Anchor class carried by every item's detail link, and by the trailing
/// view-all control, which is why the last matching anchor is never an item.
pub const ITEM_ANCHOR: &str = "a.td-n2";

/// Shape chips in menu order.
pub const SHAPE_ORDER: &[&str] = &[
    "Round", "Oval", "Cushion", "Pear", "Princess", "Emerald", "Marquise", "Asscher", "Radiant",
    "Heart",
];

/// Chip the storefront pre-selects on load.
pub const DEFAULT_SELECTED_SHAPE: &str = "Round";

/// Selector of a shape chip by label; `None` when the label is not a chip.
pub fn shape_selector(label: &str) -> Option<String> {
    SHAPE_ORDER
        .iter()
        .position(|shape| shape.eq_ignore_ascii_case(label))
        .map(|ix| format!("{} ul li:nth-child({}) a span", SHAPE_MENU, ix + 1))
}
