//! Pure-Rust GeoTIFF reader for raster metadata.
//!
//! Only the first image directory is inspected and no pixel data is decoded.
//! Tags are reported under the names GDAL uses, so catalogs behave the same
//! whether a file is opened through this reader or through GDAL.

use super::{RasterSource, Tags, gdal_metadata::GdalMetadata};
use anyhow::{Context, Result, bail, ensure};
use rastercat_core::Crs;
use std::{
	collections::BTreeMap,
	fs::File,
	io::{BufReader, Read, Seek},
	path::{Path, PathBuf},
};
use tiff::{
	decoder::{Decoder, ifd::Value},
	tags::Tag,
};

pub(crate) const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub(crate) const TAG_MODEL_TIEPOINT: u16 = 33922;
pub(crate) const TAG_MODEL_TRANSFORMATION: u16 = 34264;
pub(crate) const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
pub(crate) const TAG_GDAL_METADATA: u16 = 42112;

const GEO_KEY_RASTER_TYPE: u16 = 1025;
const GEO_KEY_GEOGRAPHIC_TYPE: u16 = 2048;
const GEO_KEY_PROJECTED_CRS: u16 = 3072;
const GEO_KEY_USER_DEFINED: u16 = 32767;
const RASTER_PIXEL_IS_POINT: u16 = 2;

/// Baseline TIFF text tags and the metadata names GDAL gives them.
const TEXT_TAGS: [(u16, &str); 7] = [
	(269, "TIFFTAG_DOCUMENTNAME"),
	(270, "TIFFTAG_IMAGEDESCRIPTION"),
	(305, "TIFFTAG_SOFTWARE"),
	(306, "TIFFTAG_DATETIME"),
	(315, "TIFFTAG_ARTIST"),
	(316, "TIFFTAG_HOSTCOMPUTER"),
	(33432, "TIFFTAG_COPYRIGHT"),
];

/// Baseline TIFF numeric tags and the metadata names GDAL gives them.
const NUMBER_TAGS: [(u16, &str); 2] = [(280, "TIFFTAG_MINSAMPLEVALUE"), (281, "TIFFTAG_MAXSAMPLEVALUE")];

#[derive(Debug)]
pub struct GeoTiffSource {
	path: PathBuf,
	crs: Crs,
	bounds: [f64; 4],
	width: usize,
	height: usize,
	count: usize,
	tags: Tags,
	band_tags: BTreeMap<usize, Tags>,
}

impl GeoTiffSource {
	/// Reads size, georeferencing and tags of the GeoTIFF at `path`.
	///
	/// The file is closed before this returns.
	pub fn open(path: impl AsRef<Path>) -> Result<GeoTiffSource> {
		let path = path.as_ref();
		log::debug!("Opening GeoTIFF {path:?}");
		let file = File::open(path).with_context(|| format!("Failed to open raster {path:?}"))?;
		Self::from_reader(BufReader::new(file), path).with_context(|| format!("Failed to read GeoTIFF {path:?}"))
	}

	fn from_reader<R: Read + Seek>(reader: R, path: &Path) -> Result<GeoTiffSource> {
		let mut decoder = Decoder::new(reader)?;

		let (width, height) = decoder.dimensions()?;
		let (width, height) = (width as usize, height as usize);
		let count = find_numbers(&mut decoder, Tag::SamplesPerPixel)?
			.and_then(|v| v.first().copied())
			.map_or(1, |v| v as usize);
		log::trace!("GeoTIFF {path:?}: {width}x{height}, bands={count}");

		let geo_keys = read_geo_keys(&mut decoder)?;
		let crs = crs_from_geo_keys(&geo_keys)?;
		let pixel_is_point = geo_keys.get(&GEO_KEY_RASTER_TYPE) == Some(&RASTER_PIXEL_IS_POINT);
		let bounds = read_bounds(&mut decoder, width, height, pixel_is_point)?;
		log::trace!("GeoTIFF {path:?}: crs={crs}, bounds={bounds:?}");

		let metadata = match find_text(&mut decoder, Tag::from_u16_exhaustive(TAG_GDAL_METADATA))? {
			Some(xml) => GdalMetadata::parse(&xml),
			None => GdalMetadata::default(),
		};
		let mut tags = metadata.dataset;

		for (code, name) in TEXT_TAGS {
			if let Some(text) = find_text(&mut decoder, Tag::from_u16_exhaustive(code))? {
				tags.insert(name.to_string(), text);
			}
		}
		for (code, name) in NUMBER_TAGS {
			if let Some(value) = find_numbers(&mut decoder, Tag::from_u16_exhaustive(code))?.and_then(|v| v.first().copied()) {
				tags.insert(name.to_string(), value.to_string());
			}
		}
		if geo_keys.contains_key(&GEO_KEY_RASTER_TYPE) {
			let area_or_point = if pixel_is_point { "Point" } else { "Area" };
			tags.insert("AREA_OR_POINT".to_string(), area_or_point.to_string());
		}

		Ok(GeoTiffSource {
			path: path.to_path_buf(),
			crs,
			bounds,
			width,
			height,
			count,
			tags,
			band_tags: metadata.bands,
		})
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl RasterSource for GeoTiffSource {
	fn crs(&self) -> &Crs {
		&self.crs
	}

	fn bounds(&self) -> [f64; 4] {
		self.bounds
	}

	fn width(&self) -> usize {
		self.width
	}

	fn height(&self) -> usize {
		self.height
	}

	fn count(&self) -> usize {
		self.count
	}

	fn tags(&self, bidx: Option<usize>) -> Result<Tags> {
		match bidx {
			None => Ok(self.tags.clone()),
			Some(bidx) => {
				ensure!(
					(1..=self.count).contains(&bidx),
					"band index {bidx} out of range (1..={}) in {:?}",
					self.count,
					self.path
				);
				Ok(self.band_tags.get(&bidx).cloned().unwrap_or_default())
			}
		}
	}
}

fn value_to_numbers(value: Value) -> Vec<f64> {
	match value {
		Value::Byte(v) => vec![f64::from(v)],
		Value::Short(v) => vec![f64::from(v)],
		Value::Signed(v) => vec![f64::from(v)],
		Value::Unsigned(v) => vec![f64::from(v)],
		Value::SignedBig(v) => vec![v as f64],
		Value::UnsignedBig(v) => vec![v as f64],
		Value::Float(v) => vec![f64::from(v)],
		Value::Double(v) => vec![v],
		Value::List(values) => values.into_iter().flat_map(value_to_numbers).collect(),
		_ => Vec::new(),
	}
}

fn find_numbers<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<Vec<f64>>> {
	let value = decoder
		.find_tag(tag)
		.with_context(|| format!("Failed to read TIFF tag {tag:?}"))?;
	Ok(value.map(value_to_numbers).filter(|v| !v.is_empty()))
}

fn find_text<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<String>> {
	let value = decoder
		.find_tag(tag)
		.with_context(|| format!("Failed to read TIFF tag {tag:?}"))?;
	Ok(match value {
		Some(Value::Ascii(text)) => Some(text.trim_end_matches('\0').to_string()),
		_ => None,
	})
}

/// Reads the GeoKey directory into `key id → value` for keys stored inline.
fn read_geo_keys<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<BTreeMap<u16, u16>> {
	let Some(directory) = find_numbers(decoder, Tag::from_u16_exhaustive(TAG_GEO_KEY_DIRECTORY))? else {
		bail!("GeoTIFF has no GeoKey directory");
	};
	ensure!(directory.len() >= 4, "GeoKey directory is truncated");

	let key_count = directory[3] as usize;
	let mut keys = BTreeMap::new();
	for entry in directory[4..].chunks_exact(4).take(key_count) {
		// [key id, tag location, count, value]; location 0 means the value is stored inline
		if entry[1] == 0.0 {
			keys.insert(entry[0] as u16, entry[3] as u16);
		}
	}
	log::trace!("GeoKeys: {keys:?}");
	Ok(keys)
}

fn crs_from_geo_keys(keys: &BTreeMap<u16, u16>) -> Result<Crs> {
	for key in [GEO_KEY_PROJECTED_CRS, GEO_KEY_GEOGRAPHIC_TYPE] {
		if let Some(&code) = keys.get(&key)
			&& code != 0
			&& code != GEO_KEY_USER_DEFINED
		{
			return Ok(Crs::Epsg(code));
		}
	}
	bail!("GeoTIFF does not declare an EPSG code for its coordinate reference system")
}

fn read_bounds<R: Read + Seek>(
	decoder: &mut Decoder<R>,
	width: usize,
	height: usize,
	pixel_is_point: bool,
) -> Result<[f64; 4]> {
	let (width, height) = (width as f64, height as f64);

	// origin (top left corner) and pixel size, with y growing downwards
	let (mut left, mut top, sx, sy) = if let Some(m) = find_numbers(decoder, Tag::from_u16_exhaustive(TAG_MODEL_TRANSFORMATION))? {
		ensure!(m.len() >= 8, "ModelTransformation tag must have 16 values");
		ensure!(m[1] == 0.0 && m[4] == 0.0, "rotated GeoTIFFs are not supported");
		(m[3], m[7], m[0], -m[5])
	} else {
		let scale = find_numbers(decoder, Tag::from_u16_exhaustive(TAG_MODEL_PIXEL_SCALE))?;
		let tiepoint = find_numbers(decoder, Tag::from_u16_exhaustive(TAG_MODEL_TIEPOINT))?;
		let (Some(scale), Some(tiepoint)) = (scale, tiepoint) else {
			bail!("GeoTIFF has no georeferencing (neither ModelTransformation nor ModelPixelScale and ModelTiepoint)");
		};
		ensure!(scale.len() >= 2, "ModelPixelScale tag must have 3 values");
		ensure!(tiepoint.len() >= 6, "ModelTiepoint tag must have 6 values");
		(
			tiepoint[3] - tiepoint[0] * scale[0],
			tiepoint[4] + tiepoint[1] * scale[1],
			scale[0],
			scale[1],
		)
	};

	if pixel_is_point {
		left -= sx / 2.0;
		top += sy / 2.0;
	}

	let right = left + width * sx;
	let bottom = top - height * sy;
	Ok([left.min(right), bottom.min(top), left.max(right), bottom.max(top)])
}
