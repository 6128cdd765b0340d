use crate::Source;
use anyhow::Result;
use rastercat_core::{GeoBBox, GeoCenter};
use serde_json::{Value, json};
use std::fmt::Debug;

/// A collection of imagery sources that callers query by area and resolution.
pub trait Catalog: Debug + Send + Sync {
	/// Optional human-readable name.
	fn name(&self) -> Option<&str>;

	/// Extent in WGS84 longitude/latitude.
	fn bounds(&self) -> &GeoBBox;

	/// Suggested initial view.
	fn center(&self) -> &GeoCenter;

	fn minzoom(&self) -> i32;

	fn maxzoom(&self) -> i32;

	/// Sources needed to render `bounds` at `resolution` (meters per pixel).
	fn get_sources(&self, bounds: &GeoBBox, resolution: f64) -> Result<Box<dyn Iterator<Item = Source> + '_>>;

	/// TileJSON 2.1.0 description of the catalog.
	fn tilejson(&self) -> Value {
		let mut tilejson = json!({
			"tilejson": "2.1.0",
			"bounds": self.bounds(),
			"center": self.center(),
			"minzoom": self.minzoom(),
			"maxzoom": self.maxzoom(),
		});
		if let Some(name) = self.name() {
			tilejson["name"] = Value::from(name);
		}
		tilejson
	}
}
