//! Table and anchor extraction from rendered markup.

use scraper::{ElementRef, Html, Selector};

/// One extracted table: data rows as trimmed cell strings.
pub type Grid = Vec<Vec<String>>;

/// Parse a selector known at compile time.
fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Extract every `<table>` in the document as a cell grid, in document
/// order. Rows made of `<th>` cells only are column headers, not data, and
/// are left out of the grid.
pub fn extract_tables(html: &str) -> Vec<Grid> {
    let document = Html::parse_document(html);
    let table_sel = selector("table");
    let row_sel = selector("tr");
    let cell_sel = selector("th, td");

    let mut grids = Vec::new();
    for table in document.select(&table_sel) {
        let mut grid = Grid::new();
        for row in table.select(&row_sel) {
            let mut header_only = true;
            let mut cells = Vec::new();
            for cell in row.select(&cell_sel) {
                if cell.value().name() != "th" {
                    header_only = false;
                }
                cells.push(cell_text(&cell));
            }
            if cells.is_empty() || header_only {
                continue;
            }
            grid.push(cells);
        }
        grids.push(grid);
    }
    grids
}

/// The storefront renders its results as the second table of the document.
/// `None` means the page holds no results table at all.
pub fn data_grid(html: &str) -> Option<Grid> {
    extract_tables(html).into_iter().nth(1)
}

/// Href of every element matching `css`, in document order.
pub fn anchors(html: &str, css: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let sel = selector(css);
    document
        .select(&sel)
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Trimmed text content of every element matching `css`.
pub fn texts(html: &str, css: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let sel = selector(css);
    document
        .select(&sel)
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Number of item links currently rendered, excluding the trailing view-all
/// control. The convergence walk reads this as its progress signal.
pub fn rendered_item_count(html: &str, css: &str) -> usize {
    anchors(html, css).len().saturating_sub(1)
}

fn cell_text(cell: &ElementRef) -> String {
    collapse_whitespace(&cell.text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
