//! Tag metadata passed through from the raster, with keys rewritten to camelCase.

use crate::raster::{RasterSource, Tags};
use anyhow::{Context, Result};
use rastercat_core::snake_to_camel_case;
use serde::Serialize;
use std::collections::BTreeMap;

/// A tag value: either plain text as stored in the raster, or a nested mapping.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
	Text(String),
	Map(TagMap),
}

pub type TagMap = BTreeMap<String, TagValue>;

impl From<&str> for TagValue {
	fn from(value: &str) -> Self {
		TagValue::Text(value.to_string())
	}
}

/// Rewrites the top-level keys of `map` to camelCase.
///
/// Nested mappings are kept as they are, including their keys.
#[must_use]
pub fn camelize_keys(map: TagMap) -> TagMap {
	map.into_iter()
		.map(|(key, value)| (snake_to_camel_case(&key), value))
		.collect()
}

fn tags_to_map(tags: Tags) -> TagMap {
	tags.into_iter().map(|(k, v)| (k, TagValue::Text(v))).collect()
}

/// Dataset tags plus one entry per band under `bands`.
///
/// Bands are keyed by their `BAND_ORDER` name when the raster has one for
/// them, otherwise by their 0-based index.
pub fn collect_source_metadata(src: &dyn RasterSource, band_order: Option<&[&str]>) -> Result<TagMap> {
	let mut meta = camelize_keys(tags_to_map(src.tags(None).context("Failed to read dataset tags")?));

	let mut bands = TagMap::new();
	for band in 0..src.count() {
		let tags = src
			.tags(Some(band + 1))
			.with_context(|| format!("Failed to read tags of band {}", band + 1))?;
		let key = band_order
			.and_then(|order| order.get(band))
			.map_or_else(|| band.to_string(), |name| (*name).to_string());
		bands.insert(key, TagValue::Map(camelize_keys(tags_to_map(tags))));
	}
	meta.insert("bands".to_string(), TagValue::Map(bands));

	Ok(meta)
}
