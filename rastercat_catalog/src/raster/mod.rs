//! Access to raster files.
//!
//! A [`RasterSource`] is an opened raster: it knows its CRS, native bounds,
//! size, band count and tag metadata. A [`RasterOpener`] turns a URI into a
//! `RasterSource`. The source is owned by whoever opened it and released
//! when dropped.

mod gdal_metadata;
mod geotiff;
pub use geotiff::*;

#[cfg(feature = "gdal")]
mod gdal;
#[cfg(feature = "gdal")]
pub use gdal::*;

#[cfg(any(test, feature = "test"))]
mod fixture;
#[cfg(any(test, feature = "test"))]
pub use fixture::*;
#[cfg(any(test, feature = "test"))]
mod mock;
#[cfg(any(test, feature = "test"))]
pub use mock::*;

use anyhow::Result;
use rastercat_core::Crs;
use std::{collections::BTreeMap, fmt::Debug};

/// Tag name → tag value, as stored in the raster.
pub type Tags = BTreeMap<String, String>;

pub trait RasterSource: Debug {
	/// Native coordinate reference system.
	fn crs(&self) -> &Crs;

	/// Native bounds `[left, bottom, right, top]`.
	fn bounds(&self) -> [f64; 4];

	/// Width in pixels.
	fn width(&self) -> usize;

	/// Height in pixels.
	fn height(&self) -> usize;

	/// Number of bands.
	fn count(&self) -> usize;

	/// All tags of the dataset (`bidx = None`) or of band `bidx` (1-based).
	fn tags(&self, bidx: Option<usize>) -> Result<Tags>;

	/// A single tag of the dataset or of band `bidx` (1-based); `None` if absent.
	fn get_tag_item(&self, name: &str, bidx: Option<usize>) -> Result<Option<String>> {
		Ok(self.tags(bidx)?.remove(name))
	}
}

pub trait RasterOpener {
	fn open(&self, uri: &str) -> Result<Box<dyn RasterSource>>;
}

/// Opens rasters with GDAL when built with the `gdal` feature,
/// otherwise with the built-in GeoTIFF reader.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultOpener;

impl RasterOpener for DefaultOpener {
	fn open(&self, uri: &str) -> Result<Box<dyn RasterSource>> {
		#[cfg(feature = "gdal")]
		{
			Ok(Box::new(GdalSource::open(uri)?))
		}
		#[cfg(not(feature = "gdal"))]
		{
			Ok(Box::new(GeoTiffSource::open(uri)?))
		}
	}
}
