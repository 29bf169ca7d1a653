//! Configuration for a tile index run.

use std::path::PathBuf;

/// Output driver used when the index dataset does not exist yet.
pub const DEFAULT_DRIVER: &str = "ESRI Shapefile";

/// Default name of the string field holding the source reference.
pub const DEFAULT_LOCATION_FIELD: &str = "LOCATION";

/// Width of the reference field when the index layer is created.
pub const LOCATION_FIELD_WIDTH: i32 = 200;

/// Selects layers of a source dataset for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerFilter {
    /// Match the layer at this zero-based index within its dataset.
    Index(usize),
    /// Match layers with this name (case-insensitive).
    Name(String),
}

impl LayerFilter {
    /// Whether this filter selects the given layer.
    pub fn matches(&self, index: usize, name: &str) -> bool {
        match self {
            LayerFilter::Index(want) => *want == index,
            LayerFilter::Name(want) => want.eq_ignore_ascii_case(name),
        }
    }
}

/// Options controlling a tile index run.
///
/// Built by the CLI from its arguments; every knob of the utility lives
/// here so the builder itself stays free of argument handling.
#[derive(Debug, Clone)]
pub struct TileIndexOptions {
    /// Path of the tile index dataset to create or update.
    pub output: PathBuf,
    /// Source vector datasets to index, in command-line order.
    pub sources: Vec<PathBuf>,
    /// Output driver used when the index does not exist yet.
    pub driver: String,
    /// Name of the string field holding the source reference.
    pub location_field: String,
    /// Layer filters; empty selects every layer of every source.
    pub filters: Vec<LayerFilter>,
    /// Rewrite relative source paths against the working directory.
    pub write_absolute_path: bool,
    /// Skip layers whose projection differs from the established one.
    pub skip_different_projection: bool,
    /// Index layers even when their attribute schema differs.
    pub accept_different_schemas: bool,
}

impl TileIndexOptions {
    /// Create options with the defaults of the command-line tool.
    pub fn new(output: impl Into<PathBuf>, sources: Vec<PathBuf>) -> Self {
        Self {
            output: output.into(),
            sources,
            driver: DEFAULT_DRIVER.to_string(),
            location_field: DEFAULT_LOCATION_FIELD.to_string(),
            filters: Vec::new(),
            write_absolute_path: false,
            skip_different_projection: false,
            accept_different_schemas: false,
        }
    }

    /// Set the output driver used when creating a fresh index.
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    /// Set the name of the reference string field.
    pub fn with_location_field(mut self, field: impl Into<String>) -> Self {
        self.location_field = field.into();
        self
    }

    /// Restrict indexing to layers matching any of the given filters.
    pub fn with_filters(mut self, filters: Vec<LayerFilter>) -> Self {
        self.filters = filters;
        self
    }

    /// Record relative source paths as absolute ones.
    pub fn with_write_absolute_path(mut self, enabled: bool) -> Self {
        self.write_absolute_path = enabled;
        self
    }

    /// Skip layers whose projection differs from the established one.
    pub fn with_skip_different_projection(mut self, enabled: bool) -> Self {
        self.skip_different_projection = enabled;
        self
    }

    /// Accept layers whose attribute schema differs from the snapshot.
    pub fn with_accept_different_schemas(mut self, enabled: bool) -> Self {
        self.accept_different_schemas = enabled;
        self
    }

    /// Whether the given layer is selected by the configured filters.
    ///
    /// With no filters configured every layer is selected.
    pub fn selects_layer(&self, index: usize, name: &str) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|f| f.matches(index, name))
    }
}
