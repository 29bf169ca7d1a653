//! TileIndex - bounding-rectangle indexes over GDAL vector datasets
//!
//! This library builds a "tile index": a vector dataset holding one
//! record per indexed source layer, each record carrying the layer's
//! bounding rectangle and a `"<path>,<layer-index>"` reference string.
//! Tile-serving software reads the index to decide which source files
//! intersect a requested map view without opening every file per query.
//!
//! # High-Level API
//!
//! ```no_run
//! use tileindex::{TileIndexBuilder, TileIndexOptions};
//!
//! let options = TileIndexOptions::new("tiles.shp", vec!["roads.shp".into()]);
//! let summary = TileIndexBuilder::new(options).run()?;
//! println!("{} layers indexed", summary.layers_indexed);
//! # Ok::<(), tileindex::IndexError>(())
//! ```

pub mod builder;
pub mod error;
pub mod location;
pub mod logging;
pub mod options;
pub mod paths;
pub mod schema;

pub use builder::{IndexSummary, TileIndexBuilder};
pub use error::IndexError;
pub use options::{LayerFilter, TileIndexOptions, DEFAULT_DRIVER, DEFAULT_LOCATION_FIELD};

/// Version of the tileindex library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
