//! A catalog backed by exactly one raster file.

use crate::{
	BandStatistics, Catalog, CatalogOptions, LinearStretch, Meta, Recipe, Resampling, Source,
	metadata::{TagMap, collect_source_metadata},
	parse_rgb_bands,
	raster::{DefaultOpener, RasterOpener, RasterSource},
};
use anyhow::{Context, Result};
use rastercat_core::{Crs, GeoBBox, GeoCenter, ZoomRounding, get_resolution_in_meters, get_zoom};
use std::{collections::BTreeMap, iter};

/// Default 1-based band positions of red, green and blue when `BAND_ORDER` lacks them.
const RGB_NAMES: [(&str, usize); 3] = [("RED", 1), ("GRE", 2), ("BLU", 3)];

/// Exposes one raster as a catalog with a single [`Source`].
///
/// Everything is read from the raster during construction; the raster is
/// closed before [`VirtualCatalog::new`] returns and never reopened.
#[derive(Clone, Debug)]
pub struct VirtualCatalog {
	uri: String,
	name: Option<String>,
	rgb: Option<String>,
	nodata: Option<f64>,
	linear_stretch: Option<LinearStretch>,
	resample: Option<Resampling>,
	dst_min: Option<f64>,
	dst_max: Option<f64>,
	force_cast: Option<String>,
	to_vis: bool,
	bounds: GeoBBox,
	resolution: (f64, f64),
	center: GeoCenter,
	minzoom: i32,
	maxzoom: i32,
	meta: Meta,
	src_meta: TagMap,
}

/// Everything read from the raster while it is open.
struct Extracted {
	rgb: Option<String>,
	bounds: GeoBBox,
	resolution: (f64, f64),
	approximate_zoom: i32,
	meta: Meta,
	src_meta: TagMap,
}

impl VirtualCatalog {
	/// Opens `uri` with the [`DefaultOpener`].
	pub fn new(uri: &str, options: CatalogOptions) -> Result<VirtualCatalog> {
		Self::open_with(&DefaultOpener, uri, options)
	}

	/// Opens `uri` with `opener`, reads its metadata and releases it again.
	pub fn open_with(opener: &dyn RasterOpener, uri: &str, options: CatalogOptions) -> Result<VirtualCatalog> {
		log::debug!("Opening virtual catalog {uri:?}");

		let resample = options.resample.as_deref().and_then(|name| {
			let resample = Resampling::from_name(name);
			if resample.is_none() {
				log::debug!("Unknown resample method {name:?}, using the pipeline default");
			}
			resample
		});
		let linear_stretch = options.linear_stretch.as_deref().map(LinearStretch::normalize);

		let extracted = {
			let src = opener.open(uri).with_context(|| format!("Failed to open raster '{uri}'"))?;
			extract(src.as_ref(), options.rgb.as_deref()).with_context(|| format!("Failed to read raster '{uri}'"))?
		};

		let (lon, lat) = extracted.bounds.midpoint();
		let zoom = extracted.approximate_zoom;
		let catalog = VirtualCatalog {
			uri: uri.to_string(),
			name: options.name,
			rgb: extracted.rgb,
			nodata: options.nodata,
			linear_stretch,
			resample,
			dst_min: options.dst_min,
			dst_max: options.dst_max,
			force_cast: options.force_cast,
			to_vis: options.to_vis.is_some(),
			bounds: extracted.bounds,
			resolution: extracted.resolution,
			center: GeoCenter(lon, lat, zoom - 3),
			minzoom: zoom - 10,
			maxzoom: zoom + 3,
			meta: extracted.meta,
			src_meta: extracted.src_meta,
		};
		log::trace!(
			"Virtual catalog {uri:?}: bounds={:?}, center={:?}, zoom={}..={}",
			catalog.bounds,
			catalog.center,
			catalog.minzoom,
			catalog.maxzoom
		);
		Ok(catalog)
	}

	#[must_use]
	pub fn uri(&self) -> &str {
		&self.uri
	}

	/// Concrete comma-separated RGB band indices, if any were requested.
	#[must_use]
	pub fn rgb(&self) -> Option<&str> {
		self.rgb.as_deref()
	}

	#[must_use]
	pub fn linear_stretch(&self) -> Option<LinearStretch> {
		self.linear_stretch
	}

	#[must_use]
	pub fn resample(&self) -> Option<Resampling> {
		self.resample
	}

	/// Ground resolution in meters per pixel `(x, y)`.
	#[must_use]
	pub fn resolution(&self) -> (f64, f64) {
		self.resolution
	}

	#[must_use]
	pub fn meta(&self) -> &Meta {
		&self.meta
	}

	/// Dataset and band tags with camelCase keys.
	#[must_use]
	pub fn src_meta(&self) -> &TagMap {
		&self.src_meta
	}

	fn recipe(&self) -> Result<Recipe> {
		let mut recipe = Recipe {
			nodata: self.nodata,
			linear_stretch: self.linear_stretch,
			resample: self.resample,
			..Recipe::default()
		};

		if let Some(rgb) = &self.rgb {
			recipe.rgb_bands = Some(parse_rgb_bands(rgb)?);
		}

		if self.to_vis {
			recipe.dst_min = Some(0.0);
			recipe.dst_max = Some(255.0);
			recipe.force_cast = Some("uint8".to_string());
		}
		if self.dst_min.is_some() {
			recipe.dst_min = self.dst_min;
		}
		if self.dst_max.is_some() {
			recipe.dst_max = self.dst_max;
		}
		if self.force_cast.is_some() {
			recipe.force_cast = self.force_cast.clone();
		}

		Ok(recipe)
	}
}

impl Catalog for VirtualCatalog {
	fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	fn bounds(&self) -> &GeoBBox {
		&self.bounds
	}

	fn center(&self) -> &GeoCenter {
		&self.center
	}

	fn minzoom(&self) -> i32 {
		self.minzoom
	}

	fn maxzoom(&self) -> i32 {
		self.maxzoom
	}

	/// Always exactly one source; `bounds` and `resolution` do not matter.
	fn get_sources(&self, _bounds: &GeoBBox, _resolution: f64) -> Result<Box<dyn Iterator<Item = Source> + '_>> {
		let source = Source {
			url: self.uri.clone(),
			name: self.name.clone(),
			resolution: self.resolution,
			band_info: BTreeMap::new(),
			meta: self.meta.clone(),
			recipes: self.recipe().with_context(|| format!("Failed to build recipe for '{}'", self.uri))?,
		};
		Ok(Box::new(iter::once(source)))
	}
}

fn extract(src: &dyn RasterSource, rgb: Option<&str>) -> Result<Extracted> {
	let native = src.bounds();
	let crs = src.crs();
	let [west, south, east, north] = crs
		.transform_bounds(&Crs::WGS84, native)
		.with_context(|| format!("Failed to reproject bounds {native:?} from {crs}"))?;
	let bounds = GeoBBox::new_clamped(west, south, east, north)?;

	let resolution = get_resolution_in_meters(native, crs, (src.height(), src.width()))?;
	let approximate_zoom = get_zoom(resolution.0.max(resolution.1), ZoomRounding::Ceil)?;
	log::trace!("resolution={resolution:?}, approximate zoom={approximate_zoom}");

	let global_min = parse_tag(src, "TIFFTAG_MINSAMPLEVALUE", None)?;
	let global_max = parse_tag(src, "TIFFTAG_MAXSAMPLEVALUE", None)?;

	let band_order = src.get_tag_item("BAND_ORDER", None)?;
	let band_names = band_order.as_deref().map(|order| order.split(',').collect::<Vec<_>>());

	let rgb = rgb.map(|rgb| resolve_rgb(rgb, band_names.as_deref(), src.count()));

	let mut meta = Meta::default();
	for band in 0..src.count() {
		let stats = band_statistics(src, band + 1, global_min, global_max)
			.with_context(|| format!("Failed to read statistics of band {}", band + 1))?;
		meta.values.insert(band, stats);
	}

	let src_meta = collect_source_metadata(src, band_names.as_deref())?;

	Ok(Extracted {
		rgb,
		bounds,
		resolution,
		approximate_zoom,
		meta,
		src_meta,
	})
}

/// Replaces `metadata` (any case) with band indices derived from `BAND_ORDER`.
fn resolve_rgb(rgb: &str, band_order: Option<&[&str]>, count: usize) -> String {
	if !rgb.eq_ignore_ascii_case("metadata") {
		return rgb.to_string();
	}

	let resolved = match band_order {
		Some(order) => RGB_NAMES
			.iter()
			.map(|(name, default)| {
				let index = order.iter().position(|band| band == name).map_or(*default, |i| i + 1);
				index.to_string()
			})
			.collect::<Vec<_>>()
			.join(","),
		None if count >= 3 => "1,2,3".to_string(),
		None => "1,1,1".to_string(),
	};
	log::debug!("Resolved rgb from raster metadata: {resolved}");
	resolved
}

/// Band statistics, falling back to the dataset-wide sample range for min and max.
///
/// | value    | band tag             | fallback                 |
/// |----------|----------------------|--------------------------|
/// | `min`    | `STATISTICS_MINIMUM` | `TIFFTAG_MINSAMPLEVALUE` |
/// | `max`    | `STATISTICS_MAXIMUM` | `TIFFTAG_MAXSAMPLEVALUE` |
/// | `mean`   | `STATISTICS_MEAN`    | absent                   |
/// | `stddev` | `STATISTICS_STDDEV`  | absent                   |
fn band_statistics(
	src: &dyn RasterSource,
	bidx: usize,
	global_min: Option<f64>,
	global_max: Option<f64>,
) -> Result<BandStatistics> {
	Ok(BandStatistics {
		min: parse_tag(src, "STATISTICS_MINIMUM", Some(bidx))?.or(global_min),
		max: parse_tag(src, "STATISTICS_MAXIMUM", Some(bidx))?.or(global_max),
		mean: parse_tag(src, "STATISTICS_MEAN", Some(bidx))?,
		stddev: parse_tag(src, "STATISTICS_STDDEV", Some(bidx))?,
	})
}

fn parse_tag(src: &dyn RasterSource, name: &str, bidx: Option<usize>) -> Result<Option<f64>> {
	src.get_tag_item(name, bidx)?
		.map(|value| {
			value
				.trim()
				.parse::<f64>()
				.with_context(|| format!("tag {name} has a non-numeric value '{value}'"))
		})
		.transpose()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{TagValue, raster::MockRaster};
	use approx::assert_abs_diff_eq;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn catalog(raster: &MockRaster, options: CatalogOptions) -> VirtualCatalog {
		VirtualCatalog::open_with(raster, "mock.tif", options).unwrap()
	}

	fn rgb_options(rgb: &str) -> CatalogOptions {
		CatalogOptions {
			rgb: Some(rgb.to_string()),
			..CatalogOptions::default()
		}
	}

	fn single_source(catalog: &VirtualCatalog) -> Source {
		let bbox = *catalog.bounds();
		let mut sources = catalog.get_sources(&bbox, 10.0).unwrap();
		let source = sources.next().unwrap();
		assert!(sources.next().is_none());
		source
	}

	#[test]
	fn extracts_bounds_zoom_and_center() {
		let raster = MockRaster::new(1);
		let catalog = catalog(&raster, CatalogOptions::default());

		assert_eq!(catalog.uri(), "mock.tif");
		assert_eq!(catalog.bounds().as_array(), [13.0, 52.0, 14.0, 53.0]);
		// about 68 x 111 m/px, which needs zoom 11
		assert_abs_diff_eq!(catalog.resolution().0, 67.77, epsilon = 0.1);
		assert_abs_diff_eq!(catalog.resolution().1, 111.32, epsilon = 0.1);
		assert_eq!(catalog.center(), &GeoCenter(13.5, 52.5, 8));
		assert_eq!((catalog.minzoom(), catalog.maxzoom()), (1, 14));
	}

	#[test]
	fn reprojects_projected_bounds() {
		// 10 km square in UTM zone 33N, 10 m pixels
		let raster = MockRaster::new(3)
			.with_crs(Crs::Epsg(32633), [500_000.0, 5_800_000.0, 510_000.0, 5_810_000.0])
			.with_size(1000, 1000);
		let catalog = catalog(&raster, CatalogOptions::default());

		let [west, south, east, north] = catalog.bounds().as_array();
		assert_abs_diff_eq!(west, 15.0, epsilon = 1e-6);
		assert_abs_diff_eq!(east, 15.147, epsilon = 0.001);
		assert_abs_diff_eq!(south, 52.350, epsilon = 0.001);
		assert_abs_diff_eq!(north, 52.440, epsilon = 0.001);
		assert_eq!(catalog.resolution(), (10.0, 10.0));
		assert_eq!((catalog.minzoom(), catalog.maxzoom()), (4, 17));
	}

	#[rstest]
	#[case(3, None, "metadata", "1,2,3")]
	#[case(4, None, "METADATA", "1,2,3")]
	#[case(1, None, "metadata", "1,1,1")]
	#[case(2, None, "Metadata", "1,1,1")]
	#[case(4, Some("NIR,RED,GRE,BLU"), "metadata", "2,3,4")]
	#[case(4, Some("BLU,GRE,RED,NIR"), "metadata", "3,2,1")]
	#[case(2, Some("PAN,NIR"), "metadata", "1,2,3")]
	#[case(3, Some("RED,GRE,BLU"), "3,2,1", "3,2,1")]
	#[case(3, None, "1,2,3", "1,2,3")]
	fn resolves_rgb(#[case] count: usize, #[case] band_order: Option<&str>, #[case] rgb: &str, #[case] expected: &str) {
		let mut raster = MockRaster::new(count);
		if let Some(band_order) = band_order {
			raster = raster.with_tag("BAND_ORDER", band_order);
		}
		let catalog = catalog(&raster, rgb_options(rgb));
		assert_eq!(catalog.rgb(), Some(expected));
	}

	#[test]
	fn rgb_is_absent_unless_requested() {
		let catalog = catalog(&MockRaster::new(3), CatalogOptions::default());
		assert_eq!(catalog.rgb(), None);
		assert_eq!(single_source(&catalog).recipes.rgb_bands, None);
	}

	#[test]
	fn concrete_rgb_is_passed_through() {
		let catalog = catalog(&MockRaster::new(3), rgb_options("1,2,3"));
		assert_eq!(catalog.rgb(), Some("1,2,3"));
		assert_eq!(single_source(&catalog).recipes.rgb_bands, Some(vec![1, 2, 3]));
	}

	#[test]
	fn statistics_fall_back_to_sample_range() {
		let raster = MockRaster::new(2)
			.with_tag("TIFFTAG_MINSAMPLEVALUE", "1")
			.with_band_tag(1, "STATISTICS_MINIMUM", "12.5")
			.with_band_tag(1, "STATISTICS_MEAN", "80")
			.with_band_tag(1, "STATISTICS_STDDEV", "4.25")
			.with_band_tag(2, "STATISTICS_MAXIMUM", "200");
		let catalog = catalog(&raster, CatalogOptions::default());

		assert_eq!(
			catalog.meta().values,
			BTreeMap::from([
				(
					0,
					BandStatistics {
						min: Some(12.5),
						max: None,
						mean: Some(80.0),
						stddev: Some(4.25),
					}
				),
				(
					1,
					BandStatistics {
						min: Some(1.0),
						max: Some(200.0),
						mean: None,
						stddev: None,
					}
				),
			])
		);
	}

	#[test]
	fn missing_statistics_are_absent() {
		let catalog = catalog(&MockRaster::new(1), CatalogOptions::default());
		assert_eq!(catalog.meta().values, BTreeMap::from([(0, BandStatistics::default())]));
		let json = serde_json::to_value(catalog.meta()).unwrap();
		assert_eq!(json, serde_json::json!({"values": {"0": {}}}));
	}

	#[test]
	fn raster_without_bands_has_empty_meta() {
		let catalog = catalog(&MockRaster::new(0), CatalogOptions::default());
		assert_eq!(serde_json::to_string(catalog.meta()).unwrap(), "{}");
	}

	#[test]
	fn source_metadata_is_camel_cased() {
		let raster = MockRaster::new(2)
			.with_tag("BAND_ORDER", "RED,NIR")
			.with_band_tag(2, "STATISTICS_MEAN", "3");
		let catalog = catalog(&raster, CatalogOptions::default());

		assert_eq!(catalog.src_meta()["bandOrder"], TagValue::from("RED,NIR"));
		let TagValue::Map(bands) = &catalog.src_meta()["bands"] else {
			panic!("bands must be a map");
		};
		assert_eq!(bands.keys().collect::<Vec<_>>(), ["NIR", "RED"]);
		assert_eq!(
			bands["NIR"],
			TagValue::Map(TagMap::from([("statisticsMean".to_string(), TagValue::from("3"))]))
		);
	}

	#[test]
	fn invalid_linear_stretch_becomes_per_band() {
		let options = CatalogOptions {
			linear_stretch: Some("bogus".to_string()),
			..CatalogOptions::default()
		};
		let catalog = catalog(&MockRaster::new(1), options);

		assert_eq!(catalog.linear_stretch(), Some(LinearStretch::PerBand));
		assert_eq!(single_source(&catalog).recipes.linear_stretch, Some(LinearStretch::PerBand));
		assert_eq!(catalog.linear_stretch(), Some(LinearStretch::PerBand));
	}

	#[test]
	fn valid_linear_stretch_is_kept() {
		let options = CatalogOptions {
			linear_stretch: Some("if_needed".to_string()),
			..CatalogOptions::default()
		};
		let catalog = catalog(&MockRaster::new(1), options);
		assert_eq!(single_source(&catalog).recipes.linear_stretch, Some(LinearStretch::IfNeeded));
	}

	#[rstest]
	#[case("bilinear", Some(Resampling::Bilinear))]
	#[case("nearest", Some(Resampling::Nearest))]
	#[case("Bilinear", None)]
	#[case("magic", None)]
	fn validates_resample(#[case] name: &str, #[case] expected: Option<Resampling>) {
		let options = CatalogOptions {
			resample: Some(name.to_string()),
			..CatalogOptions::default()
		};
		let catalog = catalog(&MockRaster::new(1), options);
		assert_eq!(catalog.resample(), expected);
		assert_eq!(single_source(&catalog).recipes.resample, expected);
	}

	#[rstest]
	#[case(None, None, None, None, None, None)]
	#[case(Some(true), None, None, Some(0.0), Some(255.0), Some("uint8"))]
	#[case(Some(true), Some(10.0), None, Some(10.0), Some(255.0), Some("uint8"))]
	#[case(Some(true), None, Some("float32"), Some(0.0), Some(255.0), Some("float32"))]
	#[case(Some(false), None, None, Some(0.0), Some(255.0), Some("uint8"))]
	#[case(None, Some(5.0), None, Some(5.0), None, None)]
	fn to_vis_defaults_are_overridable(
		#[case] to_vis: Option<bool>,
		#[case] dst_min: Option<f64>,
		#[case] force_cast: Option<&str>,
		#[case] expected_min: Option<f64>,
		#[case] expected_max: Option<f64>,
		#[case] expected_cast: Option<&str>,
	) {
		let options = CatalogOptions {
			to_vis,
			dst_min,
			force_cast: force_cast.map(str::to_string),
			..CatalogOptions::default()
		};
		let recipe = single_source(&catalog(&MockRaster::new(1), options)).recipes;
		assert_eq!(recipe.dst_min, expected_min);
		assert_eq!(recipe.dst_max, expected_max);
		assert_eq!(recipe.force_cast.as_deref(), expected_cast);
	}

	#[test]
	fn source_carries_catalog_state() {
		let raster = MockRaster::new(3).with_tag("TIFFTAG_MAXSAMPLEVALUE", "255");
		let options = CatalogOptions {
			rgb: Some("metadata".to_string()),
			nodata: Some(0.0),
			name: Some("berlin".to_string()),
			..CatalogOptions::default()
		};
		let catalog = catalog(&raster, options);
		let source = single_source(&catalog);

		assert_eq!(source.url, "mock.tif");
		assert_eq!(source.name.as_deref(), Some("berlin"));
		assert_eq!(source.resolution, catalog.resolution());
		assert!(source.band_info.is_empty());
		assert_eq!(&source.meta, catalog.meta());
		assert_eq!(
			source.recipes,
			Recipe {
				rgb_bands: Some(vec![1, 2, 3]),
				nodata: Some(0.0),
				..Recipe::default()
			}
		);
	}

	#[test]
	fn get_sources_ignores_its_arguments() -> Result<()> {
		let catalog = catalog(&MockRaster::new(1), CatalogOptions::default());
		let world = GeoBBox::new(-180.0, -90.0, 180.0, 90.0)?;
		let far_away = GeoBBox::new(-60.0, -10.0, -59.0, -9.0)?;
		let a = catalog.get_sources(&world, 100_000.0)?.collect::<Vec<_>>();
		let b = catalog.get_sources(&far_away, 0.1)?.collect::<Vec<_>>();
		assert_eq!(a.len(), 1);
		assert_eq!(a, b);
		Ok(())
	}

	#[test]
	fn malformed_rgb_fails_in_get_sources() {
		let catalog = catalog(&MockRaster::new(3), rgb_options("1,x,3"));
		let bbox = *catalog.bounds();
		let err = catalog.get_sources(&bbox, 1.0).err().unwrap();
		assert_eq!(err.root_cause().to_string(), "invalid digit found in string");
		assert!(format!("{err:#}").contains("invalid band index 'x' in rgb '1,x,3'"));
	}

	#[test]
	fn raster_is_opened_once_and_released() {
		let raster = MockRaster::new(3);
		let catalog = catalog(&raster, rgb_options("metadata"));
		let bbox = *catalog.bounds();
		for _ in 0..3 {
			let _ = catalog.get_sources(&bbox, 1.0).unwrap().count();
		}
		assert_eq!(raster.open_count(), 1);
		assert_eq!(raster.alive_count(), 0);
	}

	#[test]
	fn raster_is_released_when_extraction_fails() {
		let raster = MockRaster::new(2).with_band_tag(2, "STATISTICS_MEAN", "abc");
		let err = VirtualCatalog::open_with(&raster, "broken.tif", CatalogOptions::default()).unwrap_err();
		assert_eq!(
			format!("{err:#}"),
			"Failed to read raster 'broken.tif': Failed to read statistics of band 2: tag STATISTICS_MEAN has a non-numeric value 'abc': invalid float literal"
		);
		assert_eq!(raster.open_count(), 1);
		assert_eq!(raster.alive_count(), 0);
	}

	#[test]
	fn open_errors_are_propagated() {
		let raster = MockRaster::new(1);
		let err = VirtualCatalog::open_with(&raster, "", CatalogOptions::default()).unwrap_err();
		assert!(err.to_string().starts_with("Failed to open raster ''"), "{err}");
		assert_eq!(raster.alive_count(), 0);
	}

	#[test]
	fn tilejson_describes_the_catalog() {
		let options = CatalogOptions {
			name: Some("berlin".to_string()),
			..CatalogOptions::default()
		};
		let named = catalog(&MockRaster::new(1), options);
		assert_eq!(
			named.tilejson(),
			serde_json::json!({
				"tilejson": "2.1.0",
				"name": "berlin",
				"bounds": [13.0, 52.0, 14.0, 53.0],
				"center": [13.5, 52.5, 8],
				"minzoom": 1,
				"maxzoom": 14,
			})
		);

		let unnamed = catalog(&MockRaster::new(1), CatalogOptions::default());
		assert!(unnamed.tilejson().get("name").is_none());
	}

	#[test]
	fn opens_geotiff_files() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("rgbn.tif");
		crate::raster::GeoTiffFixture::new(4, 100, 100)
			.gdal_metadata(
				r#"<GDALMetadata><Item name="BAND_ORDER">NIR,RED,GRE,BLU</Item><Item name="STATISTICS_MAXIMUM" sample="0">4000</Item></GDALMetadata>"#,
			)
			.sample_range(0, 255)
			.write(&path)?;

		let uri = path.to_string_lossy().to_string();
		let catalog = VirtualCatalog::new(&uri, rgb_options("metadata"))?;
		assert_eq!(catalog.rgb(), Some("2,3,4"));
		assert_abs_diff_eq!(catalog.bounds().x_max, 14.0, epsilon = 1e-9);
		assert_abs_diff_eq!(catalog.bounds().y_min, 52.0, epsilon = 1e-9);
		assert_eq!(catalog.meta().values[&0].max, Some(4000.0));
		assert_eq!(catalog.meta().values[&1].max, Some(255.0));
		assert_eq!(catalog.meta().values[&3].min, Some(0.0));
		Ok(())
	}
}
