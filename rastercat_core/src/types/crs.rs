//! Coordinate reference systems and bounds reprojection.
//!
//! A [`Crs`] is either an EPSG code, resolved to a PROJ definition through the
//! `crs-definitions` database, or a literal PROJ string. Transformations run
//! through `proj4rs`, so no system PROJ/GDAL installation is needed.

use anyhow::{Context, Result, anyhow, bail, ensure};
use proj4rs::{proj::Proj, transform::transform};
use std::{fmt::Display, str::FromStr};

/// Number of intermediate points inserted along each edge when reprojecting bounds.
const DENSIFY_POINTS: usize = 21;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Crs {
	Epsg(u16),
	Proj(String),
}

impl Crs {
	/// Geographic longitude/latitude on WGS84.
	pub const WGS84: Crs = Crs::Epsg(4326);
	/// Spherical Web Mercator.
	pub const WEB_MERCATOR: Crs = Crs::Epsg(3857);

	/// Returns the PROJ definition of this CRS.
	pub fn proj_string(&self) -> Result<&str> {
		match self {
			Crs::Epsg(code) => crs_definitions::from_code(*code)
				.map(|def| def.proj4)
				.ok_or_else(|| anyhow!("EPSG:{code} is not in the crs-definitions database")),
			Crs::Proj(text) => Ok(text.as_str()),
		}
	}

	/// Whether coordinates in this CRS are longitude/latitude degrees.
	pub fn is_geographic(&self) -> Result<bool> {
		let text = self.proj_string()?;
		Ok(text.contains("+proj=longlat") || text.contains("+proj=latlong"))
	}

	fn to_proj(&self) -> Result<Proj> {
		let text = self.proj_string()?;
		Proj::from_proj_string(text).map_err(|e| anyhow!("invalid projection {self}: {e:?}"))
	}

	/// Reprojects `[left, bottom, right, top]` from `self` into `target`.
	///
	/// Every edge is densified before transforming, so curved edges in the
	/// target CRS are enclosed by the returned envelope. Points that fail to
	/// transform are skipped; if none succeed the call fails.
	pub fn transform_bounds(&self, target: &Crs, bounds: [f64; 4]) -> Result<[f64; 4]> {
		if self == target {
			return Ok(bounds);
		}
		log::trace!("transform_bounds {bounds:?} from {self} to {target}");

		let src = self.to_proj()?;
		let dst = target.to_proj()?;
		let src_geographic = self.is_geographic()?;
		let dst_geographic = target.is_geographic()?;

		let [left, bottom, right, top] = bounds;
		let steps = DENSIFY_POINTS + 1;
		let mut points = Vec::with_capacity(4 * (steps + 1));
		for i in 0..=steps {
			let t = i as f64 / steps as f64;
			let x = left + (right - left) * t;
			let y = bottom + (top - bottom) * t;
			points.push((x, bottom));
			points.push((x, top));
			points.push((left, y));
			points.push((right, y));
		}

		let mut envelope = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
		for (x, y) in points {
			let mut point = if src_geographic {
				(x.to_radians(), y.to_radians(), 0.0)
			} else {
				(x, y, 0.0)
			};
			if transform(&src, &dst, &mut point).is_err() {
				continue;
			}
			let (px, py) = if dst_geographic {
				(point.0.to_degrees(), point.1.to_degrees())
			} else {
				(point.0, point.1)
			};
			if !px.is_finite() || !py.is_finite() {
				continue;
			}
			envelope[0] = envelope[0].min(px);
			envelope[1] = envelope[1].min(py);
			envelope[2] = envelope[2].max(px);
			envelope[3] = envelope[3].max(py);
		}

		ensure!(
			envelope.iter().all(|v| v.is_finite()),
			"no point of {bounds:?} could be transformed from {self} to {target}"
		);
		Ok(envelope)
	}
}

impl FromStr for Crs {
	type Err = anyhow::Error;

	/// Parses `EPSG:<code>` (case-insensitive) or a PROJ string starting with `+proj=`.
	fn from_str(text: &str) -> Result<Self> {
		let text = text.trim();
		if let Some((authority, code)) = text.split_once(':')
			&& authority.eq_ignore_ascii_case("epsg")
		{
			let code = code
				.trim()
				.parse::<u16>()
				.with_context(|| format!("invalid EPSG code in '{text}'"))?;
			return Ok(Crs::Epsg(code));
		}
		if text.starts_with("+proj=") {
			return Ok(Crs::Proj(text.to_string()));
		}
		bail!("unknown CRS definition '{text}', expected 'EPSG:<code>' or a PROJ string")
	}
}

impl Display for Crs {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Crs::Epsg(code) => write!(f, "EPSG:{code}"),
			Crs::Proj(text) => write!(f, "{text}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use rstest::rstest;

	#[rstest]
	#[case("EPSG:4326", Crs::Epsg(4326))]
	#[case("epsg:3857", Crs::Epsg(3857))]
	#[case(" EPSG: 32633 ", Crs::Epsg(32633))]
	#[case("+proj=longlat +datum=WGS84", Crs::Proj("+proj=longlat +datum=WGS84".to_string()))]
	fn parse(#[case] text: &str, #[case] expected: Crs) -> Result<()> {
		assert_eq!(text.parse::<Crs>()?, expected);
		Ok(())
	}

	#[rstest]
	#[case("EPSG:abc")]
	#[case("WGS84")]
	fn parse_errors(#[case] text: &str) {
		assert!(text.parse::<Crs>().is_err());
	}

	#[test]
	fn display() {
		assert_eq!(Crs::WGS84.to_string(), "EPSG:4326");
		assert_eq!(Crs::Proj("+proj=merc".into()).to_string(), "+proj=merc");
	}

	#[test]
	fn geographic_detection() -> Result<()> {
		assert!(Crs::WGS84.is_geographic()?);
		assert!(!Crs::WEB_MERCATOR.is_geographic()?);
		assert!(!Crs::Epsg(32633).is_geographic()?);
		Ok(())
	}

	#[test]
	fn same_crs_is_identity() -> Result<()> {
		let bounds = [1.0, 2.0, 3.0, 4.0];
		assert_eq!(Crs::WGS84.transform_bounds(&Crs::WGS84, bounds)?, bounds);
		Ok(())
	}

	#[test]
	fn mercator_world_to_wgs84() -> Result<()> {
		let half = 20_037_508.342_789_244;
		let bounds = Crs::WEB_MERCATOR.transform_bounds(&Crs::WGS84, [-half, -half, half, half])?;
		assert_abs_diff_eq!(bounds[0], -180.0, epsilon = 1e-6);
		assert_abs_diff_eq!(bounds[1], -85.051_128_779_806_59, epsilon = 1e-6);
		assert_abs_diff_eq!(bounds[2], 180.0, epsilon = 1e-6);
		assert_abs_diff_eq!(bounds[3], 85.051_128_779_806_59, epsilon = 1e-6);
		Ok(())
	}

	#[test]
	fn wgs84_to_mercator() -> Result<()> {
		let bounds = Crs::WGS84.transform_bounds(&Crs::WEB_MERCATOR, [0.0, 0.0, 10.0, 10.0])?;
		assert_abs_diff_eq!(bounds[0], 0.0, epsilon = 1e-6);
		assert_abs_diff_eq!(bounds[1], 0.0, epsilon = 1e-6);
		assert_abs_diff_eq!(bounds[2], 1_113_194.907_932_735_7, epsilon = 1e-3);
		assert_abs_diff_eq!(bounds[3], 1_118_889.974_857_959, epsilon = 1e-3);
		Ok(())
	}

	#[test]
	fn unknown_epsg_code() {
		let err = Crs::Epsg(1).proj_string().unwrap_err();
		assert_eq!(err.to_string(), "EPSG:1 is not in the crs-definitions database");
	}
}
