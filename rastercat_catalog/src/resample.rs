//! Resampling algorithm names understood by the rendering pipeline.
//!
//! [`Resampling`] mirrors the resampling enumeration of GDAL‑based raster
//! libraries. A catalog only accepts a resample option that names one of these
//! members; everything else is dropped so the pipeline falls back to its own
//! default.
//!
//! # Overview
//! - `Nearest`: Picks the closest pixel value (fastest, blocky).
//! - `Bilinear`: Interpolates using a 2×2 neighborhood.
//! - `Cubic`: 4×4 kernel cubic convolution approximation.
//! - `CubicSpline`: 4×4 kernel cubic B‑spline approximation (smoother).
//! - `Lanczos`: 6×6 kernel Lanczos windowed sinc (highest quality).
//! - `Average` … `Rms`: aggregating kernels over all contributing pixels.
//!
//! See [GDALWarpResample](https://gdal.org/api/gdalwarp_cpp.html) for details.

use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Enumeration of resampling algorithms, named like their GDAL counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resampling {
	/// Nearest neighbour; fastest, no smoothing.
	Nearest,
	/// Bilinear interpolation using a 2×2 pixel kernel.
	Bilinear,
	/// Cubic convolution approximation using a 4×4 kernel.
	Cubic,
	/// Cubic B‑Spline interpolation using a 4×4 kernel.
	CubicSpline,
	/// Lanczos windowed sinc interpolation (6×6 kernel).
	Lanczos,
	/// Weighted average of all non‑NoData contributing pixels.
	Average,
	/// Most frequent value of all contributing pixels.
	Mode,
	Gauss,
	Max,
	Min,
	Med,
	/// First quartile.
	Q1,
	/// Third quartile.
	Q3,
	Sum,
	/// Root mean square.
	Rms,
}

impl Resampling {
	pub const ALL: [Resampling; 15] = [
		Resampling::Nearest,
		Resampling::Bilinear,
		Resampling::Cubic,
		Resampling::CubicSpline,
		Resampling::Lanczos,
		Resampling::Average,
		Resampling::Mode,
		Resampling::Gauss,
		Resampling::Max,
		Resampling::Min,
		Resampling::Med,
		Resampling::Q1,
		Resampling::Q3,
		Resampling::Sum,
		Resampling::Rms,
	];

	/// The member's name, e.g. `"cubic_spline"`.
	#[must_use]
	pub fn name(&self) -> &'static str {
		use Resampling::*;
		match self {
			Nearest => "nearest",
			Bilinear => "bilinear",
			Cubic => "cubic",
			CubicSpline => "cubic_spline",
			Lanczos => "lanczos",
			Average => "average",
			Mode => "mode",
			Gauss => "gauss",
			Max => "max",
			Min => "min",
			Med => "med",
			Q1 => "q1",
			Q3 => "q3",
			Sum => "sum",
			Rms => "rms",
		}
	}

	/// Looks up a member by its exact (case-sensitive) name.
	#[must_use]
	pub fn from_name(name: &str) -> Option<Resampling> {
		Self::ALL.into_iter().find(|r| r.name() == name)
	}
}

impl Display for Resampling {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

impl Serialize for Resampling {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.name())
	}
}
