//! TileIndex CLI - build tile indexes from the command line.
//!
//! This binary wraps the `tileindex` library in a classic batch-tool
//! interface: parse arguments, run one index build, print a summary,
//! exit 0 on success and 1 on any fatal error.

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use tileindex::{
    LayerFilter, TileIndexBuilder, TileIndexOptions, DEFAULT_DRIVER, DEFAULT_LOCATION_FIELD,
};

use crate::error::CliError;

mod error;

/// Build a tile index of bounding rectangles over GDAL vector datasets.
///
/// Each record of the index holds one source layer's bounding rectangle
/// and a "<path>,<layer-index>" reference string. Re-running against an
/// existing index only appends layers that are not indexed yet.
///
/// If no --lnum or --lname arguments are given, every layer of every
/// source dataset is added to the tile index as an independent record.
#[derive(Debug, Parser)]
#[command(name = "tileindex")]
struct Args {
    /// Tile index dataset to create or update
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Source vector datasets to index
    #[arg(value_name = "SRC_DATASET")]
    sources: Vec<PathBuf>,

    /// Add layer number N from each source dataset (repeatable)
    #[arg(long = "lnum", value_name = "N")]
    layer_numbers: Vec<usize>,

    /// Add the layer named NAME from each source dataset (repeatable)
    #[arg(long = "lname", value_name = "NAME")]
    layer_names: Vec<String>,

    /// Output format used when the index does not exist yet
    #[arg(short = 'f', long = "format", value_name = "FORMAT", default_value = DEFAULT_DRIVER)]
    format: String,

    /// Name of the field holding the source reference strings
    #[arg(long = "tileindex", value_name = "FIELD", default_value = DEFAULT_LOCATION_FIELD)]
    tileindex_field: String,

    /// Write source filenames with absolute paths
    #[arg(long)]
    write_absolute_path: bool,

    /// Only index layers using the same projection as the layers
    /// already in the index
    #[arg(long)]
    skip_different_projection: bool,

    /// Index layers even when their attribute schema differs from the
    /// rest of the index
    #[arg(long)]
    accept_different_schemas: bool,

    /// Print the tool and GDAL versions, then exit
    #[arg(long)]
    utility_version: bool,
}

fn main() {
    let args = Args::try_parse().unwrap_or_else(|error| {
        let _ = error.print();
        let code = match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        };
        process::exit(code);
    });

    if args.utility_version {
        println!(
            "tileindex {} running against GDAL {}",
            tileindex::VERSION,
            gdal::version::version_info("RELEASE_NAME")
        );
        return;
    }

    if let Err(error) = run(args) {
        error.exit();
    }
}

/// Run one index build from parsed arguments.
fn run(args: Args) -> Result<(), CliError> {
    let output = match args.output {
        Some(output) if !args.sources.is_empty() => output,
        _ => {
            return Err(CliError::Usage(
                "an output dataset and at least one source dataset are required".to_string(),
            ))
        }
    };

    tileindex::logging::init_logging().map_err(|e| CliError::Logging(e.to_string()))?;

    let mut filters: Vec<LayerFilter> = Vec::new();
    filters.extend(args.layer_numbers.into_iter().map(LayerFilter::Index));
    filters.extend(args.layer_names.into_iter().map(LayerFilter::Name));

    let options = TileIndexOptions::new(output, args.sources)
        .with_driver(args.format)
        .with_location_field(args.tileindex_field)
        .with_filters(filters)
        .with_write_absolute_path(args.write_absolute_path)
        .with_skip_different_projection(args.skip_different_projection)
        .with_accept_different_schemas(args.accept_different_schemas);

    let summary = TileIndexBuilder::new(options)
        .run()
        .map_err(CliError::Index)?;

    println!(
        "Done. {} layers indexed, {} skipped, {} datasets failed to open.",
        summary.layers_indexed, summary.layers_skipped, summary.datasets_failed
    );
    Ok(())
}
