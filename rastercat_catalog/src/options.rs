use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

/// Rendering options for a [`VirtualCatalog`](crate::VirtualCatalog).
///
/// Every field is optional; an absent field means "use the pipeline's default".
/// The struct can be filled in code or loaded from YAML:
///
/// ```yaml
/// rgb: metadata
/// linear_stretch: per_band
/// resample: bilinear
/// to_vis: true
/// ```
#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CatalogOptions {
	/// Comma-separated 1-based band indices for red, green and blue,
	/// or `metadata` to derive them from the raster's `BAND_ORDER` tag.
	pub rgb: Option<String>,

	/// Pixel value that marks "no data".
	pub nodata: Option<f64>,

	/// Contrast stretch mode: `per_band`, `global` or `if_needed`.
	/// Any other value is replaced by `per_band`.
	pub linear_stretch: Option<String>,

	/// Resampling algorithm name, e.g. `bilinear`. Unknown names are ignored.
	pub resample: Option<String>,

	/// Lower bound of the output value range.
	pub dst_min: Option<f64>,

	/// Upper bound of the output value range.
	pub dst_max: Option<f64>,

	/// Output pixel data type, e.g. `uint8`.
	pub force_cast: Option<String>,

	/// Produce 8-bit visualization output (`0..=255`, `uint8`) whenever present,
	/// even as `false`.
	/// Explicit `dst_min`, `dst_max` and `force_cast` still take precedence.
	pub to_vis: Option<bool>,

	/// Human readable catalog name.
	pub name: Option<String>,
}

impl CatalogOptions {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("Failed to open catalog options {path:?}"))?;
		CatalogOptions::from_reader(BufReader::new(file))
			.with_context(|| format!("Failed to parse catalog options {path:?}"))
	}

	/// Returns `self` with every field that is set in `other` replaced.
	#[must_use]
	pub fn merged_with(mut self, other: CatalogOptions) -> CatalogOptions {
		macro_rules! take {
			($($field:ident),*) => {
				$(if other.$field.is_some() {
					self.$field = other.$field;
				})*
			};
		}
		take!(rgb, nodata, linear_stretch, resample, dst_min, dst_max, force_cast, to_vis, name);
		self
	}
}
