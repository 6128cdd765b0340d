pub mod info;
pub mod sources;
pub mod tilejson;

use clap::Args;
use rastercat_catalog::CatalogOptions;

/// Catalog options that can be given as flags.
#[derive(Args, Debug, Default)]
pub struct OptionArgs {
	/// comma-separated 1-based band indices for red, green and blue,
	/// or "metadata" to take them from the BAND_ORDER tag
	#[arg(long, verbatim_doc_comment)]
	rgb: Option<String>,

	/// pixel value that marks "no data"
	#[arg(long, allow_negative_numbers = true)]
	nodata: Option<f64>,

	/// contrast stretch: per_band, global or if_needed
	#[arg(long, value_name = "MODE")]
	linear_stretch: Option<String>,

	/// resampling algorithm, e.g. nearest, bilinear, cubic, lanczos
	#[arg(long, value_name = "METHOD")]
	resample: Option<String>,

	/// lower bound of the output value range
	#[arg(long, allow_negative_numbers = true)]
	dst_min: Option<f64>,

	/// upper bound of the output value range
	#[arg(long, allow_negative_numbers = true)]
	dst_max: Option<f64>,

	/// output data type, e.g. uint8
	#[arg(long, value_name = "TYPE")]
	force_cast: Option<String>,

	/// 8-bit visualization output (0..=255, uint8)
	#[arg(long)]
	to_vis: bool,

	/// catalog name
	#[arg(long)]
	name: Option<String>,
}

impl OptionArgs {
	/// Flags that were not given stay unset.
	pub fn to_options(&self) -> CatalogOptions {
		CatalogOptions {
			rgb: self.rgb.clone(),
			nodata: self.nodata,
			linear_stretch: self.linear_stretch.clone(),
			resample: self.resample.clone(),
			dst_min: self.dst_min,
			dst_max: self.dst_max,
			force_cast: self.force_cast.clone(),
			to_vis: self.to_vis.then_some(true),
			name: self.name.clone(),
		}
	}
}
