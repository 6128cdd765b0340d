use super::{RasterOpener, RasterSource, Tags};
use anyhow::{Result, bail, ensure};
use rastercat_core::Crs;
use std::{
	collections::BTreeMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

/// In-memory raster for tests.
///
/// Defaults to a 1000×1000 pixel EPSG:4326 raster covering `[13, 52, 14, 53]`.
/// Used as a [`RasterOpener`] it hands out handles that count how often the
/// raster was opened and how many handles are still alive.
#[derive(Clone, Debug)]
pub struct MockRaster {
	crs: Crs,
	bounds: [f64; 4],
	width: usize,
	height: usize,
	count: usize,
	tags: Tags,
	band_tags: BTreeMap<usize, Tags>,
	opened: Arc<AtomicUsize>,
	alive: Arc<AtomicUsize>,
}

impl MockRaster {
	#[must_use]
	pub fn new(count: usize) -> Self {
		MockRaster {
			crs: Crs::WGS84,
			bounds: [13.0, 52.0, 14.0, 53.0],
			width: 1000,
			height: 1000,
			count,
			tags: Tags::new(),
			band_tags: BTreeMap::new(),
			opened: Arc::new(AtomicUsize::new(0)),
			alive: Arc::new(AtomicUsize::new(0)),
		}
	}

	#[must_use]
	pub fn with_crs(mut self, crs: Crs, bounds: [f64; 4]) -> Self {
		self.crs = crs;
		self.bounds = bounds;
		self
	}

	#[must_use]
	pub fn with_size(mut self, width: usize, height: usize) -> Self {
		self.width = width;
		self.height = height;
		self
	}

	#[must_use]
	pub fn with_tag(mut self, name: &str, value: &str) -> Self {
		self.tags.insert(name.to_string(), value.to_string());
		self
	}

	/// Adds a tag to band `bidx` (1-based).
	#[must_use]
	pub fn with_band_tag(mut self, bidx: usize, name: &str, value: &str) -> Self {
		self.band_tags
			.entry(bidx)
			.or_default()
			.insert(name.to_string(), value.to_string());
		self
	}

	/// How often this raster was opened through [`RasterOpener::open`].
	#[must_use]
	pub fn open_count(&self) -> usize {
		self.opened.load(Ordering::SeqCst)
	}

	/// How many opened handles have not been dropped yet.
	#[must_use]
	pub fn alive_count(&self) -> usize {
		self.alive.load(Ordering::SeqCst)
	}
}

impl RasterSource for MockRaster {
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
					"band index {bidx} out of range (1..={})",
					self.count
				);
				Ok(self.band_tags.get(&bidx).cloned().unwrap_or_default())
			}
		}
	}
}

impl RasterOpener for MockRaster {
	fn open(&self, uri: &str) -> Result<Box<dyn RasterSource>> {
		if uri.is_empty() {
			bail!("No such file or directory: '{uri}'");
		}
		self.opened.fetch_add(1, Ordering::SeqCst);
		self.alive.fetch_add(1, Ordering::SeqCst);
		Ok(Box::new(MockHandle(self.clone())))
	}
}

#[derive(Debug)]
struct MockHandle(MockRaster);

impl Drop for MockHandle {
	fn drop(&mut self) {
		self.0.alive.fetch_sub(1, Ordering::SeqCst);
	}
}

impl RasterSource for MockHandle {
	fn crs(&self) -> &Crs {
		self.0.crs()
	}

	fn bounds(&self) -> [f64; 4] {
		self.0.bounds()
	}

	fn width(&self) -> usize {
		self.0.width()
	}

	fn height(&self) -> usize {
		self.0.height()
	}

	fn count(&self) -> usize {
		self.0.count()
	}

	fn tags(&self, bidx: Option<usize>) -> Result<Tags> {
		self.0.tags(bidx)
	}
}
