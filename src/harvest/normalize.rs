//! Raw grid → typed listing rows.

use crate::error::HarvestError;
use crate::extract::Grid;
use crate::harvest::record::{Clarity, Color, Cut};

/// Column contract of the results table. Semantics are positional, so any
/// other width means the page layout moved.
pub const EXPECTED_COLUMNS: usize = 10;

/// Rows with fewer populated cells than this are layout separators.
const MIN_POPULATED_CELLS: usize = 3;

const SHAPE: usize = 1;
const PRICE: usize = 2;
const CARAT: usize = 3;
const CUT: usize = 4;
const COLOR: usize = 5;
const CLARITY: usize = 6;
const REPORT: usize = 7;
// 0 is a row index, 8 the compare button, 9 a checkbox: UI chrome, dropped.

/// Typed fields of one data row, before an identity is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub shape: String,
    pub price: u32,
    pub carat: Option<f64>,
    pub cut: Option<Cut>,
    pub color: Option<Color>,
    pub clarity: Option<Clarity>,
    pub report: Option<String>,
}

/// Convert an extracted grid into typed listing rows, in grid order.
pub fn normalize(grid: &Grid) -> Result<Vec<Listing>, HarvestError> {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    if width != EXPECTED_COLUMNS {
        return Err(HarvestError::SchemaMismatch {
            expected: EXPECTED_COLUMNS,
            found: width,
        });
    }

    let mut listings = Vec::new();
    for row in grid {
        let populated = row.iter().filter(|cell| !cell.trim().is_empty()).count();
        if populated < MIN_POPULATED_CELLS {
            continue;
        }
        listings.push(Listing {
            shape: cell(row, SHAPE).to_string(),
            price: parse_price(cell(row, PRICE))?,
            carat: parse_carat(cell(row, CARAT)),
            cut: Cut::from_label(cell(row, CUT)),
            color: Color::from_label(cell(row, COLOR)),
            clarity: Clarity::from_label(cell(row, CLARITY)),
            report: non_empty(cell(row, REPORT)),
        });
    }
    Ok(listings)
}

fn cell(row: &[String], ix: usize) -> &str {
    row.get(ix).map(String::as_str).unwrap_or("")
}

/// Strip currency formatting and parse the remainder as whole currency
/// units.
fn parse_price(cell: &str) -> Result<u32, HarvestError> {
    let stripped: String = cell
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    stripped
        .parse()
        .map_err(|_| HarvestError::MalformedPrice(cell.to_string()))
}

fn parse_carat(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|carat| carat.is_finite())
}

fn non_empty(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: [&str; EXPECTED_COLUMNS]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn data_row(price: &str) -> Vec<String> {
        row([
            "1", "Cushion", price, "1.02", "Ideal", "G", "VS1", "GIA", "Compare", "",
        ])
    }

    #[test]
    fn rejects_any_other_width() {
        let narrow: Grid = vec![vec!["a".to_string(); 9]];
        let err = normalize(&narrow).unwrap_err();
        assert!(matches!(
            err,
            HarvestError::SchemaMismatch {
                expected: 10,
                found: 9
            }
        ));

        let wide: Grid = vec![vec!["a".to_string(); 11]];
        assert!(normalize(&wide).is_err());
    }

    #[test]
    fn blank_separator_rows_never_become_listings() {
        let grid: Grid = vec![
            data_row("$1,234"),
            row(["", "", "", "", "", "", "", "", "", ""]),
            row(["2", "", "", "", "", "", "", "", "Compare", ""]),
        ];
        let listings = normalize(&grid).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, 1234);
    }

    #[test]
    fn price_formatting_is_stripped() {
        let grid: Grid = vec![data_row("$1,234"), data_row("$0")];
        let listings = normalize(&grid).unwrap();
        assert_eq!(listings[0].price, 1234);
        assert_eq!(listings[1].price, 0);
    }

    #[test]
    fn non_numeric_price_is_malformed() {
        let grid: Grid = vec![data_row("N/A")];
        let err = normalize(&grid).unwrap_err();
        assert!(matches!(err, HarvestError::MalformedPrice(cell) if cell == "N/A"));
    }

    #[test]
    fn out_of_ladder_grades_become_unknown() {
        let grid: Grid = vec![row([
            "1", "Princess", "$900", "0.71", "Excellent", "G", "VS1", "IGI", "Compare", "",
        ])];
        let listings = normalize(&grid).unwrap();
        assert_eq!(listings[0].cut, None);
        assert_eq!(listings[0].color, Some(crate::harvest::record::Color::G));
    }

    #[test]
    fn unparsable_carat_is_none() {
        let grid: Grid = vec![row([
            "1", "Oval", "$900", "-", "Ideal", "G", "VS1", "", "Compare", "",
        ])];
        let listings = normalize(&grid).unwrap();
        assert_eq!(listings[0].carat, None);
        assert_eq!(listings[0].report, None);
    }
}
