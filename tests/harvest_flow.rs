//! End-to-end harvest against a scripted storefront.
//!
//! Two categories, each backed by a 550-item feed; a filtered view renders
//! at most 200 rows per query, so the session has to page through each feed
//! with the price cursor, collapse the overlapping windows, and come out
//! with every item exactly once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use gemharvest::config::{HarvestConfig, WaitOptions};
use gemharvest::context::HarvestContext;
use gemharvest::driver::{DriverError, PageDriver};
use gemharvest::error::HarvestError;
use gemharvest::harvest::session::HarvestSession;

const NATURAL_BASE: u64 = 100_000;
const LAB_BASE: u64 = 600_000;
const FEED_SIZE: usize = 550;
const VIEW_CAP: usize = 200;

#[derive(Debug, Clone)]
struct FakeItem {
    id: u64,
    price: u32,
    shape: &'static str,
    carat: f64,
    cut: &'static str,
    color: &'static str,
    clarity: &'static str,
    report: &'static str,
}

struct Catalog {
    path: &'static str,
    detail: &'static str,
    items: Vec<FakeItem>,
}

fn feed(id_base: u64, report: &'static str) -> Vec<FakeItem> {
    let shapes = ["Cushion", "Princess", "Emerald"];
    let cuts = ["Good", "Very Good", "Ideal", "Super Ideal"];
    let colors = ["J", "I", "H", "G", "F", "E", "D"];
    let clarities = ["SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1", "IF", "FL"];

    let mut items: Vec<FakeItem> = (0..FEED_SIZE)
        .map(|ix| FakeItem {
            id: id_base + ix as u64,
            // prices tied in pairs so window edges re-observe rows
            price: 100 + ((ix - ix % 2) as u32) * 90,
            shape: shapes[ix % shapes.len()],
            carat: 0.5 + (ix % 40) as f64 * 0.05,
            // a grade the ladder does not know, sprinkled in
            cut: if ix % 97 == 0 {
                "Excellent"
            } else {
                cuts[ix % cuts.len()]
            },
            color: colors[ix % colors.len()],
            clarity: clarities[ix % clarities.len()],
            report,
        })
        .collect();
    items.sort_by_key(|item| (item.price, item.id));
    items
}

struct SiteState {
    catalogs: Vec<Catalog>,
    current: Option<usize>,
    min_filter: u32,
    max_filter: u32,
    overlay_present: bool,
    /// catalog index recorded for every min-price edit
    min_edits: Vec<usize>,
    /// catalog index recorded for every shape chip click
    shape_clicks: Vec<usize>,
    snapshots: Vec<PathBuf>,
    closed: bool,
    /// render 9-column rows to simulate a layout shift
    sabotage_width: bool,
}

impl SiteState {
    fn new() -> Self {
        Self {
            catalogs: vec![
                Catalog {
                    path: "loose-diamonds/search/",
                    detail: "natural-diamonds",
                    items: feed(NATURAL_BASE, "GIA"),
                },
                Catalog {
                    path: "lab-diamonds-search/",
                    detail: "lab-diamonds",
                    items: feed(LAB_BASE, "IGI"),
                },
            ],
            current: None,
            min_filter: 0,
            max_filter: u32::MAX,
            overlay_present: false,
            min_edits: Vec::new(),
            shape_clicks: Vec::new(),
            snapshots: Vec::new(),
            closed: false,
            sabotage_width: false,
        }
    }

    fn render(&self) -> String {
        let mut html =
            String::from("<html><body><h1>Search</h1><table><tr><td>nav</td></tr></table>");
        if let Some(ix) = self.current {
            let catalog = &self.catalogs[ix];
            let visible: Vec<&FakeItem> = catalog
                .items
                .iter()
                .filter(|item| item.price >= self.min_filter && item.price <= self.max_filter)
                .take(VIEW_CAP)
                .collect();

            html.push_str("<table><tr>");
            for th in [
                "", "Shape", "Price", "Carat", "Cut", "Color", "Clarity", "Report", "", "",
            ] {
                html.push_str(&format!("<th>{th}</th>"));
            }
            html.push_str("</tr>");

            for (row_ix, item) in visible.iter().enumerate() {
                html.push_str(&format!(
                    "<tr><td><a class=\"td-n2\" href=\"{detail}/{id}-{shape}/\">{n}</a></td>\
                     <td>{shape}</td><td>{price}</td><td>{carat:.2}</td><td>{cut}</td>\
                     <td>{color}</td><td>{clarity}</td><td>{report}</td><td>Compare</td>",
                    detail = catalog.detail,
                    id = item.id,
                    n = row_ix + 1,
                    shape = item.shape,
                    price = fmt_price(item.price),
                    carat = item.carat,
                    cut = item.cut,
                    color = item.color,
                    clarity = item.clarity,
                    report = item.report,
                ));
                if !self.sabotage_width {
                    html.push_str("<td></td>");
                }
                html.push_str("</tr>");
            }

            // blank separator row real pages interleave
            let columns = if self.sabotage_width { 9 } else { 10 };
            html.push_str("<tr>");
            for _ in 0..columns {
                html.push_str("<td></td>");
            }
            html.push_str("</tr></table>");

            // trailing view-all control
            html.push_str(&format!(
                "<a class=\"td-n2\" href=\"{}view-all/\">View all</a>",
                catalog.path
            ));
        } else {
            html.push_str("<table></table>");
        }
        html.push_str("</body></html>");
        html
    }
}

fn fmt_price(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (ix, ch) in digits.chars().enumerate() {
        if ix > 0 && (digits.len() - ix) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${out}")
}

struct FakeSite {
    state: Arc<Mutex<SiteState>>,
}

#[async_trait]
impl PageDriver for FakeSite {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let landed = state.catalogs.iter().position(|c| url.contains(c.path));
        state.current = landed;
        state.min_filter = 0;
        state.max_filter = u32::MAX;
        state.overlay_present = true;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if selector == ".sailthru-overlay-close" {
            if state.overlay_present {
                state.overlay_present = false;
                return Ok(());
            }
            return Err(DriverError::NotFound(selector.to_string()));
        }
        if selector.contains("ir246-product-shape-wrap") {
            let current = state.current.unwrap_or_default();
            state.shape_clicks.push(current);
            return Ok(());
        }
        if selector == "h1" {
            return Ok(());
        }
        Err(DriverError::NotFound(selector.to_string()))
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let value: u32 = text
            .parse()
            .map_err(|_| DriverError::Session(format!("non-numeric input {text:?}")))?;
        match selector {
            "#min_price_display" => {
                let current = state.current.unwrap_or_default();
                state.min_edits.push(current);
                state.min_filter = value;
                Ok(())
            }
            "#max_price_display" => {
                state.max_filter = value;
                Ok(())
            }
            _ => Err(DriverError::NotFound(selector.to_string())),
        }
    }

    async fn scroll_to(&self, _position: u32) -> Result<(), DriverError> {
        Ok(())
    }

    async fn rendered_html(&self) -> Result<String, DriverError> {
        Ok(self.state.lock().unwrap().render())
    }

    async fn save_snapshot(&self, path: &Path) -> Result<(), DriverError> {
        std::fs::write(path, b"snapshot")?;
        self.state.lock().unwrap().snapshots.push(path.to_path_buf());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

fn test_config(dir: &Path) -> HarvestConfig {
    let mut config = HarvestConfig::default();
    config.waits = WaitOptions::none();
    config.min_price = 100;
    config.max_price = 50_000;
    config.data_dir = dir.join("data");
    config.screenshots_dir = dir.join("screenshots");
    config
}

#[tokio::test]
async fn full_run_harvests_both_feeds_exactly_once() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let context = HarvestContext::prepare(&config).unwrap();

    let state = Arc::new(Mutex::new(SiteState::new()));
    let session = HarvestSession::new(
        Box::new(FakeSite {
            state: state.clone(),
        }),
        config,
        context,
    );
    let report = session.run().await;

    assert!(report.failure.is_none(), "{:?}", report.failure);
    assert_eq!(report.records.len(), FEED_SIZE * 2);

    // no two records share every field, and identities are unique
    let mut rows = HashSet::new();
    let mut identities = HashSet::new();
    for record in &report.records {
        assert!(rows.insert(record.fingerprint()));
        assert!(identities.insert(record.identity.clone()));
    }

    // every record is tagged with its source category and a sane price
    for record in &report.records {
        let id: u64 = record.identity.parse().unwrap();
        let expected = if id >= LAB_BASE { "lab" } else { "natural" };
        assert_eq!(record.category, expected);
        assert!((100..=50_000).contains(&record.price));
        assert!(record
            .reference_url
            .starts_with("https://www.brilliantearth.com/"));
    }

    // 550 items at 200 per window takes at least three windows per feed
    let state = state.lock().unwrap();
    for catalog_ix in 0..2 {
        let edits = state.min_edits.iter().filter(|ix| **ix == catalog_ix).count();
        assert!(edits >= 3, "catalog {catalog_ix} paged only {edits} windows");
    }

    // shape chips were touched on the first category only
    assert!(!state.shape_clicks.is_empty());
    assert!(state.shape_clicks.iter().all(|ix| *ix == 0));

    assert!(state.closed);
}

#[tokio::test]
async fn unknown_grades_survive_as_unknown_not_new_values() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let context = HarvestContext::prepare(&config).unwrap();

    let state = Arc::new(Mutex::new(SiteState::new()));
    let session = HarvestSession::new(
        Box::new(FakeSite {
            state: state.clone(),
        }),
        config,
        context,
    );
    let report = session.run().await;
    assert!(report.failure.is_none());

    // ix % 97 == 0 puts six "Excellent" cuts into each 550-item feed
    let unknown_cuts = report.records.iter().filter(|r| r.cut.is_none()).count();
    assert_eq!(unknown_cuts, 12);
}

#[tokio::test]
async fn layout_shift_aborts_with_a_diagnostic_and_still_closes() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let context = HarvestContext::prepare(&config).unwrap();

    let state = Arc::new(Mutex::new(SiteState::new()));
    state.lock().unwrap().sabotage_width = true;

    let session = HarvestSession::new(
        Box::new(FakeSite {
            state: state.clone(),
        }),
        config,
        context,
    );
    let report = session.run().await;

    let failure = report.failure.expect("nine-column rows must abort the run");
    assert!(matches!(
        failure.error,
        HarvestError::SchemaMismatch {
            expected: 10,
            found: 9
        }
    ));
    let snapshot = failure.snapshot.expect("diagnostic snapshot");
    assert!(snapshot.exists());

    let state = state.lock().unwrap();
    assert_eq!(state.snapshots.len(), 1);
    assert!(state.closed);
    assert!(report.records.is_empty());
}
