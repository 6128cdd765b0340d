use super::geotiff::{
	TAG_GDAL_METADATA, TAG_GEO_KEY_DIRECTORY, TAG_MODEL_PIXEL_SCALE, TAG_MODEL_TIEPOINT, TAG_MODEL_TRANSFORMATION,
};
use anyhow::{Context, Result, bail};
use std::{
	fs::File,
	io::{BufWriter, Seek, Write},
	path::Path,
};
use tiff::{
	encoder::{DirectoryEncoder, TiffEncoder, TiffKind, colortype},
	tags::Tag,
};

/// Writes small 8-bit GeoTIFFs for tests.
///
/// Defaults to EPSG:4326 with the top left corner at `(13, 53)` and a pixel
/// size of `0.01`.
#[derive(Clone, Debug)]
pub struct GeoTiffFixture {
	bands: usize,
	width: u32,
	height: u32,
	epsg: u16,
	origin: (f64, f64),
	pixel_size: f64,
	transformation: Option<[f64; 16]>,
	pixel_is_point: bool,
	georeferenced: bool,
	gdal_metadata: Option<String>,
	text_tags: Vec<(u16, String)>,
	sample_range: Option<(u16, u16)>,
}

impl GeoTiffFixture {
	/// `bands` must be 1, 3 or 4.
	#[must_use]
	pub fn new(bands: usize, width: u32, height: u32) -> Self {
		GeoTiffFixture {
			bands,
			width,
			height,
			epsg: 4326,
			origin: (13.0, 53.0),
			pixel_size: 0.01,
			transformation: None,
			pixel_is_point: false,
			georeferenced: true,
			gdal_metadata: None,
			text_tags: Vec::new(),
			sample_range: None,
		}
	}

	#[must_use]
	pub fn epsg(mut self, epsg: u16) -> Self {
		self.epsg = epsg;
		self
	}

	/// Top left corner and square pixel size, in CRS units.
	#[must_use]
	pub fn origin(mut self, left: f64, top: f64, pixel_size: f64) -> Self {
		self.origin = (left, top);
		self.pixel_size = pixel_size;
		self
	}

	/// Georeference with a row-major 4x4 `ModelTransformation` matrix instead
	/// of `origin`.
	#[must_use]
	pub fn model_transformation(mut self, matrix: [f64; 16]) -> Self {
		self.transformation = Some(matrix);
		self
	}

	#[must_use]
	pub fn pixel_is_point(mut self) -> Self {
		self.pixel_is_point = true;
		self
	}

	#[must_use]
	pub fn without_georeferencing(mut self) -> Self {
		self.georeferenced = false;
		self
	}

	/// Raw XML for the `GDAL_METADATA` tag.
	#[must_use]
	pub fn gdal_metadata(mut self, xml: &str) -> Self {
		self.gdal_metadata = Some(xml.to_string());
		self
	}

	#[must_use]
	pub fn text_tag(mut self, code: u16, text: &str) -> Self {
		self.text_tags.push((code, text.to_string()));
		self
	}

	#[must_use]
	pub fn sample_range(mut self, min: u16, max: u16) -> Self {
		self.sample_range = Some((min, max));
		self
	}

	pub fn write(&self, path: &Path) -> Result<()> {
		let file = File::create(path).with_context(|| format!("Failed to create {path:?}"))?;
		let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
		match self.bands {
			1 => self.write_image::<colortype::Gray8, _>(&mut encoder),
			3 => self.write_image::<colortype::RGB8, _>(&mut encoder),
			4 => self.write_image::<colortype::RGBA8, _>(&mut encoder),
			n => bail!("fixtures support 1, 3 or 4 bands, got {n}"),
		}
		.with_context(|| format!("Failed to write GeoTIFF {path:?}"))
	}

	fn write_image<C, W>(&self, encoder: &mut TiffEncoder<W>) -> Result<()>
	where
		C: colortype::ColorType<Inner = u8>,
		W: Write + Seek,
	{
		let mut image = encoder.new_image::<C>(self.width, self.height)?;
		self.write_tags(image.encoder())?;
		let data = vec![0u8; self.width as usize * self.height as usize * self.bands];
		image.write_data(&data)?;
		Ok(())
	}

	fn write_tags<W: Write + Seek, K: TiffKind>(&self, dir: &mut DirectoryEncoder<'_, W, K>) -> Result<()> {
		if self.georeferenced {
			if let Some(matrix) = &self.transformation {
				dir.write_tag(Tag::from_u16_exhaustive(TAG_MODEL_TRANSFORMATION), &matrix[..])?;
			} else {
				let (left, top) = self.origin;
				dir.write_tag(
					Tag::from_u16_exhaustive(TAG_MODEL_PIXEL_SCALE),
					&[self.pixel_size, self.pixel_size, 0.0][..],
				)?;
				dir.write_tag(Tag::from_u16_exhaustive(TAG_MODEL_TIEPOINT), &[0.0, 0.0, 0.0, left, top, 0.0][..])?;
			}

			let geographic = (4000..5000).contains(&self.epsg);
			let (model, crs_key) = if geographic { (2, 2048) } else { (1, 3072) };
			let raster_type = if self.pixel_is_point { 2 } else { 1 };
			let geo_keys: [u16; 16] = [
				1, 1, 0, 3, //
				1024, 0, 1, model, //
				1025, 0, 1, raster_type, //
				crs_key, 0, 1, self.epsg,
			];
			dir.write_tag(Tag::from_u16_exhaustive(TAG_GEO_KEY_DIRECTORY), &geo_keys[..])?;
		}

		if let Some(xml) = &self.gdal_metadata {
			dir.write_tag(Tag::from_u16_exhaustive(TAG_GDAL_METADATA), xml.as_str())?;
		}
		for (code, text) in &self.text_tags {
			dir.write_tag(Tag::from_u16_exhaustive(*code), text.as_str())?;
		}
		if let Some((min, max)) = self.sample_range {
			dir.write_tag(Tag::from_u16_exhaustive(280), min)?;
			dir.write_tag(Tag::from_u16_exhaustive(281), max)?;
		}
		Ok(())
	}
}
