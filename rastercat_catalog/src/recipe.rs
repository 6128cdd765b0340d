use crate::Resampling;
use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use std::{fmt::Display, str::FromStr};

/// How pixel values are stretched to the output range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinearStretch {
	#[default]
	PerBand,
	Global,
	IfNeeded,
}

impl LinearStretch {
	#[must_use]
	pub fn name(&self) -> &'static str {
		match self {
			LinearStretch::PerBand => "per_band",
			LinearStretch::Global => "global",
			LinearStretch::IfNeeded => "if_needed",
		}
	}

	/// Parses `value`, replacing anything outside the known modes with [`LinearStretch::PerBand`].
	#[must_use]
	pub fn normalize(value: &str) -> LinearStretch {
		value.parse().unwrap_or_else(|_| {
			let fallback = LinearStretch::default();
			log::debug!("No specific linear_stretch passed ({value:?}), using: {fallback}");
			fallback
		})
	}
}

impl FromStr for LinearStretch {
	type Err = anyhow::Error;

	fn from_str(value: &str) -> Result<Self> {
		Ok(match value {
			"per_band" => LinearStretch::PerBand,
			"global" => LinearStretch::Global,
			"if_needed" => LinearStretch::IfNeeded,
			_ => anyhow::bail!("unknown linear stretch mode '{value}'"),
		})
	}
}

impl Display for LinearStretch {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

impl Serialize for LinearStretch {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(self.name())
	}
}

/// Rendering flags attached to a [`Source`](crate::Source).
///
/// Unset flags are left out of the serialized form entirely.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recipe {
	pub imagery: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rgb_bands: Option<Vec<i32>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub nodata: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub linear_stretch: Option<LinearStretch>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub resample: Option<Resampling>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dst_min: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dst_max: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub force_cast: Option<String>,
}

impl Default for Recipe {
	fn default() -> Self {
		Recipe {
			imagery: true,
			rgb_bands: None,
			nodata: None,
			linear_stretch: None,
			resample: None,
			dst_min: None,
			dst_max: None,
			force_cast: None,
		}
	}
}

/// Parses a comma-separated band list such as `"1,2,3"`.
pub fn parse_rgb_bands(rgb: &str) -> Result<Vec<i32>> {
	rgb.split(',')
		.map(|part| {
			part.trim()
				.parse::<i32>()
				.with_context(|| format!("invalid band index '{part}' in rgb '{rgb}'"))
		})
		.collect()
}
