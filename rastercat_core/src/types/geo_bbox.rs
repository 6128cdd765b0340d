use anyhow::{Context, Result, ensure};
use serde::{Serialize, Serializer};
use std::fmt::Debug;

/// A geographical bounding box (`GeoBBox`) represents a rectangular area on a map
/// defined by its minimum and maximum longitude (x) and latitude (y) coordinates.
///
/// The bounding box is defined by four `f64` values:
/// - `x_min` (west): Minimum longitude.
/// - `y_min` (south): Minimum latitude.
/// - `x_max` (east): Maximum longitude.
/// - `y_max` (north): Maximum latitude.
///
/// It serializes as the JSON array `[west, south, east, north]`.
///
/// # Examples
///
/// ```
/// use rastercat_core::GeoBBox;
///
/// let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// assert_eq!(bbox.as_tuple(), (-10.0, -5.0, 10.0, 5.0));
/// ```
#[derive(Clone, Copy, PartialEq)]
#[allow(clippy::manual_non_exhaustive)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
	phantom: (),
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from `west, south, east, north`.
	///
	/// # Errors
	/// Fails if a coordinate lies outside the longitude/latitude domain or if
	/// a minimum exceeds its maximum.
	#[must_use = "GeoBBox::new returns a Result; handle the error or unwrap"]
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
			phantom: (),
		}
		.checked()
	}

	/// Like [`GeoBBox::new`], but orders the corners and clamps them to the
	/// longitude/latitude domain first.
	///
	/// Reprojected raster extents often overshoot ±180° by a rounding error; this
	/// constructor absorbs that.
	///
	/// ```
	/// use rastercat_core::GeoBBox;
	///
	/// let bbox = GeoBBox::new_clamped(180.000001, -91.0, -180.0000001, 91.0).unwrap();
	/// assert_eq!(bbox.as_tuple(), (-180.0, -90.0, 180.0, 90.0));
	/// ```
	pub fn new_clamped(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min: x0.min(x1).clamp(-180.0, 180.0),
			y_min: y0.min(y1).clamp(-90.0, 90.0),
			x_max: x0.max(x1).clamp(-180.0, 180.0),
			y_max: y0.max(y1).clamp(-90.0, 90.0),
			phantom: (),
		}
		.checked()
	}

	/// Returns the bounding box as a fixed‑size array `[west, south, east, north]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	/// Returns the bounding box as a tuple `(x_min, y_min, x_max, y_max)`.
	#[must_use]
	pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
		(self.x_min, self.y_min, self.x_max, self.y_max)
	}

	/// Returns the arithmetic midpoint `(longitude, latitude)`.
	///
	/// ```
	/// use rastercat_core::GeoBBox;
	///
	/// let bbox = GeoBBox::new(-10.0, 20.0, 30.0, 40.0).unwrap();
	/// assert_eq!(bbox.midpoint(), (10.0, 30.0));
	/// ```
	#[must_use]
	pub fn midpoint(&self) -> (f64, f64) {
		((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
	}

	fn checked(self) -> Result<Self> {
		ensure!(self.x_min >= -180., "x_min ({}) must be >= -180", self.x_min);
		ensure!(self.y_min >= -90., "y_min ({}) must be >= -90", self.y_min);
		ensure!(self.x_max <= 180., "x_max ({}) must be <= 180", self.x_max);
		ensure!(self.y_max <= 90., "y_max ({}) must be <= 90", self.y_max);
		ensure!(
			self.x_min <= self.x_max,
			"x_min ({}) must be <= x_max ({})",
			self.x_min,
			self.x_max
		);
		ensure!(
			self.y_min <= self.y_max,
			"y_min ({}) must be <= y_max ({})",
			self.y_min,
			self.y_max
		);
		Ok(self)
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GeoBBox({}, {}, {}, {})",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

impl Serialize for GeoBBox {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		self.as_array().serialize(serializer)
	}
}

impl TryFrom<[f64; 4]> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(input: [f64; 4]) -> Result<Self> {
		GeoBBox::new(input[0], input[1], input[2], input[3])
	}
}

impl TryFrom<Vec<f64>> for GeoBBox {
	type Error = anyhow::Error;

	/// Builds a `GeoBBox` from exactly four elements `[west, south, east, north]`.
	fn try_from(input: Vec<f64>) -> Result<Self> {
		ensure!(
			input.len() == 4,
			"GeoBBox must have 4 elements (x_min, y_min, x_max, y_max)"
		);
		GeoBBox::new(input[0], input[1], input[2], input[3]).with_context(|| format!("Failed to convert {input:?} to GeoBBox"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn new_and_accessors() -> Result<()> {
		let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0)?;
		assert_eq!(bbox.as_array(), [-10.0, -5.0, 10.0, 5.0]);
		assert_eq!(bbox.midpoint(), (0.0, 0.0));
		assert_eq!(format!("{bbox:?}"), "GeoBBox(-10, -5, 10, 5)");
		Ok(())
	}

	#[rstest]
	#[case([-181.0, 0.0, 0.0, 1.0], "x_min (-181) must be >= -180")]
	#[case([0.0, -91.0, 1.0, 1.0], "y_min (-91) must be >= -90")]
	#[case([0.0, 0.0, 181.0, 1.0], "x_max (181) must be <= 180")]
	#[case([0.0, 0.0, 1.0, 91.0], "y_max (91) must be <= 90")]
	#[case([2.0, 0.0, 1.0, 1.0], "x_min (2) must be <= x_max (1)")]
	#[case([0.0, 2.0, 1.0, 1.0], "y_min (2) must be <= y_max (1)")]
	fn invalid_boxes(#[case] input: [f64; 4], #[case] message: &str) {
		let err = GeoBBox::try_from(input).unwrap_err();
		assert_eq!(err.to_string(), message);
	}

	#[test]
	fn clamped_orders_and_limits() -> Result<()> {
		let bbox = GeoBBox::new_clamped(20.0, 95.0, -200.0, -10.0)?;
		assert_eq!(bbox.as_tuple(), (-180.0, -10.0, 20.0, 90.0));
		Ok(())
	}

	#[test]
	fn try_from_vec_checks_length() {
		let err = GeoBBox::try_from(vec![1.0, 2.0, 3.0]).unwrap_err();
		assert_eq!(
			err.to_string(),
			"GeoBBox must have 4 elements (x_min, y_min, x_max, y_max)"
		);
	}

	#[test]
	fn serializes_as_array() -> Result<()> {
		let bbox = GeoBBox::new(-10.5, -5.0, 10.0, 5.25)?;
		assert_eq!(serde_json::to_string(&bbox)?, "[-10.5,-5.0,10.0,5.25]");
		Ok(())
	}
}
