use anyhow::Result;
use clap::Args;
use rastercat_catalog::{Catalog, CatalogOptions, VirtualCatalog};
use serde_json::Value;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// raster file, e.g. a GeoTIFF
	#[arg(required = true)]
	uri: String,

	/// name to put into the TileJSON
	#[arg(long)]
	name: Option<String>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(&tilejson(arguments)?)?);
	Ok(())
}

fn tilejson(arguments: &Subcommand) -> Result<Value> {
	let options = CatalogOptions {
		name: arguments.name.clone(),
		..CatalogOptions::default()
	};
	Ok(VirtualCatalog::new(&arguments.uri, options)?.tilejson())
}
