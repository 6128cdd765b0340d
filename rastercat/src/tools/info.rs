use anyhow::Result;
use clap::Args;
use rastercat_catalog::{Catalog, CatalogOptions, VirtualCatalog};
use serde_json::{Value, json};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// raster file, e.g. a GeoTIFF
	#[arg(required = true)]
	uri: String,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(&info(arguments)?)?);
	Ok(())
}

fn info(arguments: &Subcommand) -> Result<Value> {
	let catalog = VirtualCatalog::new(&arguments.uri, CatalogOptions::default())?;
	Ok(json!({
		"uri": catalog.uri(),
		"bounds": catalog.bounds(),
		"center": catalog.center(),
		"minzoom": catalog.minzoom(),
		"maxzoom": catalog.maxzoom(),
		"resolution": catalog.resolution(),
		"meta": catalog.meta(),
		"metadata": catalog.src_meta(),
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::write_test_raster;
	use assert_fs::TempDir;
	use pretty_assertions::assert_eq;

	#[test]
	fn describes_the_raster() -> Result<()> {
		let dir = TempDir::new()?;
		let uri = write_test_raster(&dir)?;
		let info = info(&Subcommand { uri: uri.clone() })?;

		assert_eq!(info["uri"], json!(uri));
		assert_eq!(info["bounds"], json!([13.0, 52.0, 14.0, 53.0]));
		assert_eq!(info["center"], json!([13.5, 52.5, 5]));
		assert_eq!(info["minzoom"], json!(-2));
		assert_eq!(info["maxzoom"], json!(11));
		assert_eq!(info["meta"], json!({"values": {"0": {"min": 3.0, "max": 250.0}, "1": {}, "2": {}}}));
		assert_eq!(info["metadata"]["bandOrder"], json!("BLU,GRE,RED"));
		assert_eq!(info["metadata"]["tifftagSoftware"], json!("rastercat"));
		assert_eq!(info["metadata"]["bands"]["BLU"], json!({"statisticsMinimum": "3", "statisticsMaximum": "250"}));
		Ok(())
	}
}
