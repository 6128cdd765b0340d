use serde::{Serialize, Serializer};
use std::fmt::Debug;

/// A center point in geographic space, represented by:
/// - `f64` longitude
/// - `f64` latitude
/// - `i32` zoom level
///
/// The zoom is signed: it is derived from a raster's native resolution by
/// subtracting a fixed offset, which can go below zero for very coarse rasters.
///
/// Serializes as `[longitude, latitude, zoom]`.
#[derive(Clone, Copy, PartialEq)]
pub struct GeoCenter(pub f64, pub f64, pub i32);

impl GeoCenter {
	/// Converts the `GeoCenter` into a `Vec<f64>` in the form `[longitude, latitude, zoom]`.
	#[must_use]
	pub fn as_vec(&self) -> Vec<f64> {
		vec![self.0, self.1, f64::from(self.2)]
	}
}

impl Debug for GeoCenter {
	/// Formats the `GeoCenter` as `"longitude, latitude (zoom)"`.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}, {} ({})", self.0, self.1, self.2)
	}
}

impl Serialize for GeoCenter {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		(self.0, self.1, self.2).serialize(serializer)
	}
}
