use super::OptionArgs;
use anyhow::Result;
use clap::Args;
use rastercat_catalog::{Catalog, CatalogOptions, Source, VirtualCatalog};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// raster file, e.g. a GeoTIFF
	#[arg(required = true)]
	uri: String,

	/// YAML file with catalog options
	/// flags given on the command line take precedence
	#[arg(long, short, value_name = "FILE", verbatim_doc_comment)]
	config: Option<PathBuf>,

	#[command(flatten)]
	options: OptionArgs,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	for source in sources(arguments)? {
		println!("{}", serde_json::to_string_pretty(&source)?);
	}
	Ok(())
}

fn catalog_options(arguments: &Subcommand) -> Result<CatalogOptions> {
	let base = match &arguments.config {
		Some(path) => {
			log::debug!("Reading catalog options from {path:?}");
			CatalogOptions::from_path(path)?
		}
		None => CatalogOptions::default(),
	};
	Ok(base.merged_with(arguments.options.to_options()))
}

fn sources(arguments: &Subcommand) -> Result<Vec<Source>> {
	let catalog = VirtualCatalog::new(&arguments.uri, catalog_options(arguments)?)?;
	let (x, y) = catalog.resolution();
	Ok(catalog.get_sources(catalog.bounds(), x.max(y))?.collect())
}
