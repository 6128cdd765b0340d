use crate::Recipe;
use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics of a single band. Unknown values are absent, never zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BandStatistics {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mean: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stddev: Option<f64>,
}

/// Per-band statistics keyed by 0-based band index.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Meta {
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub values: BTreeMap<usize, BandStatistics>,
}

/// Descriptor telling a rendering pipeline how to read and color-process one raster.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Source {
	pub url: String,
	pub name: Option<String>,
	/// Ground resolution in meters per pixel `(x, y)`.
	pub resolution: (f64, f64),
	/// Always empty for single-raster catalogs.
	pub band_info: BTreeMap<String, String>,
	pub meta: Meta,
	pub recipes: Recipe,
}
