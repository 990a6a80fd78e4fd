//! Domain types for catalog location records.

use serde::{Deserialize, Serialize};

/// A raw coordinate value as delivered by the catalog service.
///
/// Editors enter coordinates by hand, so records carry them either as JSON
/// numbers or as strings, and string values sometimes use a comma as the
/// decimal separator (`"46,05"` instead of `"46.05"`). Raw values are
/// preserved end to end; [`CoordValue::to_f64`] is the one place that
/// normalizes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordValue {
    Num(f64),
    Text(String),
}

impl CoordValue {
    /// Parse the raw value into decimal degrees, accepting a comma as the
    /// decimal separator. Returns `None` for values that are not a number.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            CoordValue::Num(n) => Some(*n),
            CoordValue::Text(s) => s.trim().replacen(',', ".", 1).parse().ok(),
        }
    }
}

impl std::fmt::Display for CoordValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordValue::Num(n) => write!(f, "{n}"),
            CoordValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CoordValue {
    fn from(n: f64) -> Self {
        CoordValue::Num(n)
    }
}

impl From<&str> for CoordValue {
    fn from(s: &str) -> Self {
        CoordValue::Text(s.to_string())
    }
}

/// A parsed coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A location record as held by the catalog service.
///
/// Everything but `title` is optional; coordinates stay raw so discovery
/// responses return exactly what the catalog holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Catalog document id, stitched in from the response envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<CoordValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<CoordValue>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_city: Option<String>,
    /// Comma-separated list as entered upstream; display code normalizes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_numbers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Location {
    /// Both coordinates parsed, when present and numeric.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.as_ref()?.to_f64()?;
        let lng = self.lng.as_ref()?.to_f64()?;
        Some(Coordinate::new(lat, lng))
    }
}
