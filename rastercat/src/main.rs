mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

// Define the command-line interface using the clap crate
#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Show bounds, zoom range, statistics and tags of a raster
	Info(tools::info::Subcommand),

	/// Print the sources a raster yields as a catalog
	Sources(tools::sources::Subcommand),

	/// Print a TileJSON description of a raster
	#[clap(alias = "tile-json")]
	Tilejson(tools::tilejson::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Info(arguments) => tools::info::run(arguments),
		Commands::Sources(arguments) => tools::sources::run(arguments),
		Commands::Tilejson(arguments) => tools::tilejson::run(arguments),
	}
}
