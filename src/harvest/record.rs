//! Typed listing records and their ordinal grades.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Cut grades, worst to best. Declaration order is the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Cut {
    Fair,
    Good,
    #[serde(rename = "Very Good")]
    VeryGood,
    Ideal,
    #[serde(rename = "Super Ideal")]
    SuperIdeal,
}

impl Cut {
    /// Cast a storefront label into the grade ladder. Anything outside the
    /// ladder is unknown, never a new grade.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Fair" => Some(Self::Fair),
            "Good" => Some(Self::Good),
            "Very Good" => Some(Self::VeryGood),
            "Ideal" => Some(Self::Ideal),
            "Super Ideal" => Some(Self::SuperIdeal),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::VeryGood => "Very Good",
            Self::Ideal => "Ideal",
            Self::SuperIdeal => "Super Ideal",
        }
    }
}

/// Color grades, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Color {
    J,
    I,
    H,
    G,
    F,
    E,
    D,
}

impl Color {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "J" => Some(Self::J),
            "I" => Some(Self::I),
            "H" => Some(Self::H),
            "G" => Some(Self::G),
            "F" => Some(Self::F),
            "E" => Some(Self::E),
            "D" => Some(Self::D),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::J => "J",
            Self::I => "I",
            Self::H => "H",
            Self::G => "G",
            Self::F => "F",
            Self::E => "E",
            Self::D => "D",
        }
    }
}

/// Clarity grades, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Clarity {
    SI2,
    SI1,
    VS2,
    VS1,
    VVS2,
    VVS1,
    IF,
    FL,
}

impl Clarity {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "SI2" => Some(Self::SI2),
            "SI1" => Some(Self::SI1),
            "VS2" => Some(Self::VS2),
            "VS1" => Some(Self::VS1),
            "VVS2" => Some(Self::VVS2),
            "VVS1" => Some(Self::VVS1),
            "IF" => Some(Self::IF),
            "FL" => Some(Self::FL),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SI2 => "SI2",
            Self::SI1 => "SI1",
            Self::VS2 => "VS2",
            Self::VS1 => "VS1",
            Self::VVS2 => "VVS2",
            Self::VVS1 => "VVS1",
            Self::IF => "IF",
            Self::FL => "FL",
        }
    }
}

/// One harvested listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Stable key derived from the detail-page link. Unique in a final
    /// dataset.
    pub identity: String,
    pub shape: String,
    /// Whole currency units, never negative.
    pub price: u32,
    pub carat: Option<f64>,
    pub cut: Option<Cut>,
    pub color: Option<Color>,
    pub clarity: Option<Clarity>,
    /// Grading report lab, when the storefront shows one.
    pub report: Option<String>,
    pub reference_url: String,
    pub category: String,
    pub fetched_at: DateTime<Utc>,
}

impl Record {
    /// Exact-row fingerprint: two records hash equal iff every field is
    /// equal. Overlapping fetch windows re-observe boundary rows, and this
    /// is what collapses them.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        let price = self.price.to_string();
        let carat = self.carat.map(|c| c.to_string()).unwrap_or_default();
        let fetched = self.fetched_at.to_rfc3339();
        let parts: [&str; 11] = [
            &self.identity,
            &self.shape,
            &price,
            &carat,
            self.cut.map(Cut::label).unwrap_or(""),
            self.color.map(Color::label).unwrap_or(""),
            self.clarity.map(Clarity::label).unwrap_or(""),
            self.report.as_deref().unwrap_or(""),
            &self.reference_url,
            &self.category,
            &fetched,
        ];
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update(b"\x1f");
        }
        hasher.finalize()
    }
}
