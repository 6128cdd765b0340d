use super::{RasterSource, Tags};
use anyhow::{Context, Result, ensure};
use gdal::{Dataset, Metadata, spatial_ref::SpatialRef};
use rastercat_core::Crs;
use std::path::{Path, PathBuf};

/// A raster opened through GDAL; supports every format GDAL can read.
#[derive(Debug)]
pub struct GdalSource {
	filename: PathBuf,
	dataset: Dataset,
	crs: Crs,
	bounds: [f64; 4],
}

impl GdalSource {
	pub fn open(filename: impl AsRef<Path>) -> Result<GdalSource> {
		let filename = filename.as_ref();
		log::debug!("Opening GDAL dataset from file: {filename:?}");

		let dataset = Dataset::open(filename).with_context(|| format!("Failed to open raster {filename:?}"))?;
		log::trace!(
			"Opened GDAL dataset {:?} ({}x{}, bands={})",
			filename,
			dataset.raster_size().0,
			dataset.raster_size().1,
			dataset.raster_count()
		);

		let bounds = dataset_bounds(&dataset).with_context(|| format!("Failed to read bounds of {filename:?}"))?;
		let crs = dataset
			.spatial_ref()
			.context("GDAL dataset must have a spatial reference (SRS) defined")
			.and_then(|srs| spatial_ref_to_crs(&srs))
			.with_context(|| format!("Failed to read CRS of {filename:?}"))?;
		log::trace!("crs={crs}, bounds={bounds:?}");

		Ok(GdalSource {
			filename: filename.to_path_buf(),
			dataset,
			crs,
			bounds,
		})
	}
}

fn dataset_bounds(dataset: &Dataset) -> Result<[f64; 4]> {
	let gt = dataset
		.geo_transform()
		.context("Failed to get geo transform from GDAL dataset")?;
	log::trace!("geo transform: {gt:?}");
	ensure!(gt[2] == 0.0 && gt[4] == 0.0, "GDAL dataset must not be rotated");

	let (width, height) = dataset.raster_size();
	let (x0, y0) = (gt[0], gt[3]);
	let (x1, y1) = (gt[0] + gt[1] * width as f64, gt[3] + gt[5] * height as f64);
	Ok([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
}

fn spatial_ref_to_crs(srs: &SpatialRef) -> Result<Crs> {
	if let (Ok(name), Ok(code)) = (srs.auth_name(), srs.auth_code())
		&& name.eq_ignore_ascii_case("EPSG")
		&& let Ok(code) = u16::try_from(code)
	{
		return Ok(Crs::Epsg(code));
	}
	let proj = srs.to_proj4().context("Failed to convert spatial reference to PROJ.4")?;
	Ok(Crs::Proj(proj.trim().to_string()))
}

/// Splits GDAL's `KEY=VALUE` metadata entries.
fn entries_to_tags(entries: Option<Vec<String>>) -> Tags {
	entries
		.unwrap_or_default()
		.into_iter()
		.filter_map(|entry| {
			entry
				.split_once('=')
				.map(|(key, value)| (key.to_string(), value.to_string()))
		})
		.collect()
}

impl RasterSource for GdalSource {
	fn crs(&self) -> &Crs {
		&self.crs
	}

	fn bounds(&self) -> [f64; 4] {
		self.bounds
	}

	fn width(&self) -> usize {
		self.dataset.raster_size().0
	}

	fn height(&self) -> usize {
		self.dataset.raster_size().1
	}

	fn count(&self) -> usize {
		self.dataset.raster_count()
	}

	fn tags(&self, bidx: Option<usize>) -> Result<Tags> {
		Ok(match bidx {
			None => entries_to_tags(self.dataset.metadata_domain("")),
			Some(bidx) => {
				let band = self
					.dataset
					.rasterband(bidx)
					.with_context(|| format!("band index {bidx} out of range in {:?}", self.filename))?;
				entries_to_tags(band.metadata_domain(""))
			}
		})
	}
}
