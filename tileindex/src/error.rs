//! Error types for tile index construction.
//!
//! The utility has a two-tier error model. Everything in this module is
//! the fatal tier: the run aborts and already-written records are left
//! in place. Recoverable conditions (an unopenable source dataset, a
//! duplicate reference string, a mismatched projection or schema, a
//! failed extent computation) are logged and skipped inside the builder
//! and never surface as an [`IndexError`].

use std::path::PathBuf;

use gdal::errors::GdalError;
use thiserror::Error;

/// Errors that abort a tile index run.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No registered driver matches the requested output format.
    #[error("Unable to find driver `{name}'")]
    DriverNotFound {
        /// The requested driver name.
        name: String,
        /// Short names of the registered vector drivers.
        available: Vec<String>,
    },

    /// The output driver exists but cannot create datasets.
    #[error("{name} driver does not support data source creation")]
    DriverCannotCreate {
        /// The requested driver name.
        name: String,
    },

    /// The output driver failed to create the index dataset.
    #[error("{driver} driver failed to create {}: {source}", path.display())]
    CreateFailed {
        /// The driver asked to create the dataset.
        driver: String,
        /// The output path that could not be created.
        path: PathBuf,
        /// The underlying GDAL failure.
        source: GdalError,
    },

    /// The output dataset contains no layer to write into.
    #[error("Cannot find any layer in the output tile index")]
    OutputLayerMissing,

    /// The index layer has no field with the configured reference name.
    #[error("Cannot find {field} field in the tile index dataset")]
    FieldMissing {
        /// The configured reference field name.
        field: String,
    },

    /// Appending a record to the index failed.
    #[error("Failed to create feature {location} on the tile index: {source}")]
    AppendFeature {
        /// Reference string of the record that could not be written.
        location: String,
        /// The underlying GDAL failure.
        source: GdalError,
    },

    /// Any other GDAL failure while reading or writing datasets.
    #[error(transparent)]
    Gdal(#[from] GdalError),
}
