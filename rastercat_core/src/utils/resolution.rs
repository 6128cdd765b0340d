//! Ground resolution and Web‑Mercator zoom levels.

use crate::Crs;
use anyhow::{Result, ensure};

/// Radius used for both the haversine distance and the Web‑Mercator pyramid (WGS84 semi-major axis).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Web‑Mercator world circumference in meters (2πR).
pub const EARTH_CIRCUMFERENCE: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS;

/// Edge length of a tile in pixels; zoom levels are defined against it.
pub const TILE_SIZE: f64 = 256.0;

/// How a fractional zoom level is turned into an integer one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoomRounding {
	/// Smallest zoom that is at least as fine as the resolution.
	#[default]
	Ceil,
	Floor,
	Round,
}

impl ZoomRounding {
	fn apply(self, value: f64) -> f64 {
		match self {
			ZoomRounding::Ceil => value.ceil(),
			ZoomRounding::Floor => value.floor(),
			ZoomRounding::Round => value.round(),
		}
	}
}

/// Ground resolution in meters per pixel `(x, y)` of a raster with native
/// `bounds` (`[left, bottom, right, top]` in `crs`) and `dims` `(height, width)`.
///
/// Geographic rasters are measured with the haversine distance along their
/// horizontal and vertical center lines. Projected rasters are assumed to use
/// meters as linear unit.
pub fn get_resolution_in_meters(bounds: [f64; 4], crs: &Crs, dims: (usize, usize)) -> Result<(f64, f64)> {
	let (height, width) = dims;
	ensure!(width > 0 && height > 0, "raster must not be empty, got {width}x{height} pixels");

	let [left, bottom, right, top] = bounds;
	let (dx, dy) = if crs.is_geographic()? {
		let lat = f64::midpoint(bottom, top);
		let lon = f64::midpoint(left, right);
		(haversine((left, lat), (right, lat)), haversine((lon, bottom), (lon, top)))
	} else {
		((right - left).abs(), (top - bottom).abs())
	};

	let resolution = (dx / width as f64, dy / height as f64);
	log::trace!("resolution of {bounds:?} ({crs}, {width}x{height}): {resolution:?} m/px");
	Ok(resolution)
}

/// Great-circle distance in meters between two `(longitude, latitude)` points in degrees.
#[must_use]
pub fn haversine(a: (f64, f64), b: (f64, f64)) -> f64 {
	let (lon1, lat1) = (a.0.to_radians(), a.1.to_radians());
	let (lon2, lat2) = (b.0.to_radians(), b.1.to_radians());
	let h = ((lat2 - lat1) / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
	2.0 * EARTH_RADIUS * h.sqrt().min(1.0).asin()
}

/// Web‑Mercator zoom level whose 256 px tiles have the given ground `resolution` (m/px).
///
/// ```text
/// zoom = rounding( log2( 2π·6378137 / (resolution · 256) ) )
/// ```
pub fn get_zoom(resolution: f64, rounding: ZoomRounding) -> Result<i32> {
	ensure!(
		resolution.is_finite() && resolution > 0.0,
		"resolution must be a positive number, got {resolution}"
	);
	let zoom = rounding.apply((EARTH_CIRCUMFERENCE / (resolution * TILE_SIZE)).log2());
	log::trace!("zoom for {resolution} m/px ({rounding:?}): {zoom}");
	Ok(zoom as i32)
}
