//! Item identity derivation and exact-row deduplication.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::HarvestError;
use crate::harvest::record::Record;

/// Identity and detail link of one rendered item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRef {
    pub identity: String,
    pub reference_url: String,
}

fn digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").unwrap())
}

/// Derive identities from the item anchors of one extraction, in row order.
///
/// The final anchor is the view-all control the storefront appends after the
/// item links; it is skipped unconditionally, whatever its href looks like.
/// Identity is the first digit run of the href.
pub fn assign_identity(hrefs: &[String], base: &Url) -> Result<Vec<ItemRef>, HarvestError> {
    let items = match hrefs.split_last() {
        Some((_control, items)) => items,
        None => return Ok(Vec::new()),
    };
    items
        .iter()
        .map(|href| {
            let identity = digit_run()
                .find(href)
                .ok_or_else(|| HarvestError::IdentityExtraction(href.clone()))?
                .as_str()
                .to_string();
            let reference_url = base
                .join(href)
                .map_err(|_| HarvestError::BadItemLink(href.clone()))?
                .to_string();
            Ok(ItemRef {
                identity,
                reference_url,
            })
        })
        .collect()
}

/// Merge `incoming` into `existing`, keeping extraction order and dropping
/// rows equal to an already-seen row in every field. Overlapping fetch
/// windows re-observe boundary rows on purpose, so this is load-bearing.
pub fn merge(existing: Vec<Record>, incoming: Vec<Record>) -> Vec<Record> {
    let mut seen: HashSet<blake3::Hash> = existing.iter().map(Record::fingerprint).collect();
    let mut merged = existing;
    for record in incoming {
        if seen.insert(record.fingerprint()) {
            merged.push(record);
        }
    }
    merged
}
