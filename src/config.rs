//! Harvest configuration.
//!
//! Every knob is serde-defaulted so the harvester runs without any config
//! file; a TOML file overrides the parts it names. Wait budgets live here so
//! tests can zero them and drive the pipeline against a fake page.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::site;

/// Default config file probed in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "gemharvest.toml";

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Storefront root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Result sets to paginate, in run order.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,

    /// Shape chips to select where a category applies shape filters.
    #[serde(default = "default_shapes")]
    pub shapes: Vec<String>,

    /// Generous initial price window applied on the first fetch.
    #[serde(default)]
    pub min_price: u32,
    #[serde(default = "default_max_price")]
    pub max_price: u32,

    #[serde(default)]
    pub convergence: ConvergenceOptions,

    #[serde(default)]
    pub waits: WaitOptions,

    /// Upper bound on pagination cycles per category. A storefront that
    /// keeps moving the cursor forever is stopped here with a warning.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,

    /// Dataset output directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Diagnostic snapshot directory.
    #[serde(default = "default_screenshots_dir")]
    pub screenshots_dir: PathBuf,

    #[serde(default)]
    pub browser: BrowserOptions,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            categories: default_categories(),
            shapes: default_shapes(),
            min_price: 0,
            max_price: default_max_price(),
            convergence: ConvergenceOptions::default(),
            waits: WaitOptions::default(),
            max_cycles: default_max_cycles(),
            data_dir: default_data_dir(),
            screenshots_dir: default_screenshots_dir(),
            browser: BrowserOptions::default(),
        }
    }
}

impl HarvestConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] in the working
    /// directory, falling back to defaults when neither exists. An explicit
    /// path that does not exist is an error; the implicit default is not.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let candidate = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if candidate.exists() {
            let raw = std::fs::read_to_string(&candidate)?;
            let config = toml::from_str(&raw)?;
            Ok(config)
        } else if path.is_some() {
            anyhow::bail!("config file {} not found", candidate.display());
        } else {
            Ok(Self::default())
        }
    }
}

/// One independently paginated result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Tag stamped on every record from this category.
    pub name: String,

    /// Landing path under the base URL.
    pub path: String,

    /// Apply the shape-chip filter after landing.
    #[serde(default)]
    pub select_shapes: bool,
}

/// Geometry of the lazy-load convergence walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceOptions {
    /// Items the table renders per virtual-scroll position.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pixel distance between consecutive scroll targets.
    #[serde(default = "default_scroll_step")]
    pub scroll_step: u32,

    /// Number of scroll targets; the walk never goes past the last one.
    #[serde(default = "default_scroll_positions")]
    pub scroll_positions: u32,
}

impl Default for ConvergenceOptions {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            scroll_step: default_scroll_step(),
            scroll_positions: default_scroll_positions(),
        }
    }
}

impl ConvergenceOptions {
    /// Ordered scroll targets, nearest first.
    pub fn positions(&self) -> Vec<u32> {
        (1..=self.scroll_positions)
            .map(|ix| ix * self.scroll_step)
            .collect()
    }
}

/// Fixed wait budgets after each suspension point. The storefront offers no
/// completion callbacks, so these stand in for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitOptions {
    /// After navigation, before touching the page.
    #[serde(default = "default_page_load_ms")]
    pub page_load_ms: u64,

    /// After committing a price filter edit.
    #[serde(default = "default_filter_settle_ms")]
    pub filter_settle_ms: u64,

    /// Between a scroll target and the next item-count sample.
    #[serde(default = "default_render_settle_ms")]
    pub render_settle_ms: u64,

    /// Marketing overlay dismissal budget.
    #[serde(default = "default_overlay_attempts")]
    pub overlay_attempts: u32,
    #[serde(default = "default_overlay_settle_ms")]
    pub overlay_settle_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            page_load_ms: default_page_load_ms(),
            filter_settle_ms: default_filter_settle_ms(),
            render_settle_ms: default_render_settle_ms(),
            overlay_attempts: default_overlay_attempts(),
            overlay_settle_ms: default_overlay_settle_ms(),
        }
    }
}

impl WaitOptions {
    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    pub fn filter_settle(&self) -> Duration {
        Duration::from_millis(self.filter_settle_ms)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle_ms)
    }

    pub fn overlay_settle(&self) -> Duration {
        Duration::from_millis(self.overlay_settle_ms)
    }

    /// Zeroed budgets for driving the pipeline against a fake page.
    pub fn none() -> Self {
        Self {
            page_load_ms: 0,
            filter_settle_ms: 0,
            render_settle_ms: 0,
            overlay_attempts: 1,
            overlay_settle_ms: 0,
        }
    }
}

/// Browser launch options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Page readiness timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Explicit Chrome executable; discovered from common paths when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            timeout: default_timeout(),
            chrome_path: None,
            chrome_args: Vec::new(),
        }
    }
}

fn default_base_url() -> String {
    site::BASE_URL.to_string()
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig {
            name: "natural".to_string(),
            path: site::NATURAL_PATH.to_string(),
            select_shapes: true,
        },
        CategoryConfig {
            name: "lab".to_string(),
            path: site::LAB_PATH.to_string(),
            select_shapes: false,
        },
    ]
}

fn default_shapes() -> Vec<String> {
    vec![
        "Cushion".to_string(),
        "Princess".to_string(),
        "Emerald".to_string(),
    ]
}

fn default_max_price() -> u32 {
    1_000_000
}

fn default_batch_size() -> usize {
    200
}

fn default_scroll_step() -> u32 {
    3000
}

fn default_scroll_positions() -> u32 {
    12
}

fn default_max_cycles() -> u32 {
    50
}

fn default_page_load_ms() -> u64 {
    2000
}

fn default_filter_settle_ms() -> u64 {
    5000
}

fn default_render_settle_ms() -> u64 {
    2000
}

fn default_overlay_attempts() -> u32 {
    3
}

fn default_overlay_settle_ms() -> u64 {
    1000
}

fn default_headless() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_screenshots_dir() -> PathBuf {
    PathBuf::from("screenshots")
}
