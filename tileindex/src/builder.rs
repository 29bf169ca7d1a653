//! Tile index construction.
//!
//! [`TileIndexBuilder`] drives the whole batch run: open or create the
//! output dataset, recover the established projection and schema from
//! pre-existing records, then walk every selected layer of every source
//! dataset and append one bounding-rectangle record per accepted layer.
//!
//! The run is fully sequential. Each source dataset is opened, scanned,
//! and closed before the next one; the output dataset stays open for
//! the whole run and is the sole writer.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use gdal::errors::GdalError;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{
    Feature, FieldDefn, Geometry, LayerAccess, LayerOptions, OGRFieldType, OGRwkbGeometryType,
};
use gdal::{Dataset, DatasetOptions, Driver, DriverManager, GdalOpenFlags, Metadata};
use tracing::{debug, info, warn};

use crate::error::IndexError;
use crate::location::{format_location, parse_location};
use crate::options::{TileIndexOptions, LOCATION_FIELD_WIDTH};
use crate::paths::effective_source_path;
use crate::schema::{SchemaMismatch, SchemaSnapshot};

/// Name of the layer created in a fresh index dataset.
const INDEX_LAYER_NAME: &str = "tileindex";

/// Outcome counters for one tile index run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Layers appended to the index.
    pub layers_indexed: usize,
    /// Selected layers rejected by a dedupe, projection, schema, or
    /// extent check.
    pub layers_skipped: usize,
    /// Source datasets that failed to open.
    pub datasets_failed: usize,
}

/// Builds or updates a tile index dataset.
pub struct TileIndexBuilder {
    options: TileIndexOptions,
}

impl TileIndexBuilder {
    /// Create a builder for the given options.
    pub fn new(options: TileIndexOptions) -> Self {
        Self { options }
    }

    /// Run the batch index build.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] for the fatal conditions of the error
    /// model: an unusable output driver or dataset, a missing index
    /// layer or reference field, or a failed record append. Recoverable
    /// conditions are logged as warnings and counted in the summary.
    pub fn run(&self) -> Result<IndexSummary, IndexError> {
        DriverManager::register_all();

        let dst_ds = self.open_or_create_output()?;
        let mut dst_layer = dst_ds.layers().next().ok_or(IndexError::OutputLayerMissing)?;

        let field = self.options.location_field.as_str();
        if !dst_layer
            .defn()
            .fields()
            .any(|f| f.name().eq_ignore_ascii_case(field))
        {
            return Err(IndexError::FieldMissing {
                field: field.to_string(),
            });
        }

        // State recovered from pre-existing records, then extended as
        // layers are accepted during the run.
        let mut existing: HashSet<String> = HashSet::new();
        let mut reference_srs: Option<SpatialRef> = None;
        let mut srs_established = false;
        let mut schema: Option<SchemaSnapshot> = None;

        for (row, record) in dst_layer.features().enumerate() {
            let location = record.field_as_string_by_name(field)?.unwrap_or_default();
            if row == 0 {
                if let Some((path, layer_index)) = parse_location(&location) {
                    if let Some((srs, snapshot)) =
                        recover_reference_state(Path::new(path), layer_index)
                    {
                        srs_established = true;
                        reference_srs = srs;
                        schema = Some(snapshot);
                    }
                }
            }
            existing.insert(location);
        }

        let mut absolute_base: Option<PathBuf> = None;
        if self.options.write_absolute_path {
            match env::current_dir() {
                Ok(dir) => absolute_base = Some(dir),
                Err(error) => {
                    warn!(
                        %error,
                        "could not determine the working directory, relative source paths \
                         will be written as given"
                    );
                }
            }
        }

        let mut summary = IndexSummary::default();
        let mut projection_hint_pending = true;
        let mut schema_hint_pending = true;

        for source in &self.options.sources {
            let recorded_path = match &absolute_base {
                Some(base) => effective_source_path(base, source),
                None => source.clone(),
            };

            let src_ds = match Dataset::open(source) {
                Ok(ds) => ds,
                Err(error) => {
                    warn!(source = %source.display(), %error, "failed to open dataset, skipping");
                    summary.datasets_failed += 1;
                    continue;
                }
            };

            for (layer_index, layer) in src_ds.layers().enumerate() {
                let layer_name = layer.name();
                if !self.options.selects_layer(layer_index, &layer_name) {
                    continue;
                }

                let location = format_location(&recorded_path, layer_index);
                if existing.contains(&location) {
                    warn!(
                        layer = layer_index,
                        source = %source.display(),
                        "layer is already in the tile index, skipping"
                    );
                    summary.layers_skipped += 1;
                    continue;
                }

                let layer_srs = layer.spatial_ref();
                if srs_established {
                    if spatial_refs_differ(reference_srs.as_ref(), layer_srs.as_ref()) {
                        warn!(
                            layer = layer_index,
                            source = %source.display(),
                            "layer does not use the same projection system as the rest of \
                             the tile index; tile-serving software may misbehave{}",
                            if self.options.skip_different_projection {
                                ", skipping"
                            } else {
                                ""
                            }
                        );
                        if self.options.skip_different_projection {
                            summary.layers_skipped += 1;
                            continue;
                        }
                        if projection_hint_pending {
                            warn!(
                                "layers with differing projections can be omitted from the \
                                 index with the skip_different_projection option"
                            );
                            projection_hint_pending = false;
                        }
                    }
                } else {
                    srs_established = true;
                    reference_srs = layer_srs;
                }

                match &schema {
                    None => schema = Some(SchemaSnapshot::from_defn(layer.defn())),
                    Some(snapshot) if !self.options.accept_different_schemas => {
                        let candidate = SchemaSnapshot::from_defn(layer.defn());
                        if let Some(mismatch) = snapshot.diff(&candidate) {
                            match mismatch {
                                SchemaMismatch::FieldCount { expected, found } => warn!(
                                    layer = %layer_name,
                                    source = %source.display(),
                                    expected,
                                    found,
                                    "number of attributes does not match the rest of the \
                                     tile index, skipping"
                                ),
                                SchemaMismatch::Field { name } => warn!(
                                    layer = %layer_name,
                                    source = %source.display(),
                                    field = %name,
                                    "attribute schema does not match the rest of the tile \
                                     index, skipping"
                                ),
                            }
                            if schema_hint_pending {
                                warn!(
                                    "differing schemas can be accepted with the \
                                     accept_different_schemas option, but the resulting \
                                     index may be rejected by tile-serving software"
                                );
                                schema_hint_pending = false;
                            }
                            summary.layers_skipped += 1;
                            continue;
                        }
                    }
                    Some(_) => {}
                }

                let extent = match layer.get_extent() {
                    Ok(extent) => extent,
                    Err(error) => {
                        warn!(
                            layer = %layer_name,
                            source = %source.display(),
                            %error,
                            "failed to compute the layer extent, skipping"
                        );
                        summary.layers_skipped += 1;
                        continue;
                    }
                };

                let rectangle = extent_ring(extent.MinX, extent.MinY, extent.MaxX, extent.MaxY)?;

                let mut record = Feature::new(dst_layer.defn())?;
                record.set_geometry(rectangle)?;
                record.set_field_string(field, &location)?;
                record
                    .create(&dst_layer)
                    .map_err(|source| IndexError::AppendFeature {
                        location: location.clone(),
                        source,
                    })?;

                existing.insert(location);
                summary.layers_indexed += 1;
                debug!(
                    layer = layer_index,
                    source = %source.display(),
                    "layer added to the tile index"
                );
            }
        }

        drop(dst_layer);
        dst_ds.close()?;

        info!(
            indexed = summary.layers_indexed,
            skipped = summary.layers_skipped,
            failed = summary.datasets_failed,
            "tile index build finished"
        );
        Ok(summary)
    }

    /// Open the output path for update, or create a fresh index with
    /// the configured driver.
    ///
    /// A fresh index gets one layer named `tileindex` with polygon
    /// geometry, its spatial reference seeded from the first selected
    /// layer of the first source dataset, and one string reference
    /// field.
    fn open_or_create_output(&self) -> Result<Dataset, IndexError> {
        let update = DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_UPDATE,
            ..Default::default()
        };
        if let Ok(ds) = Dataset::open_ex(&self.options.output, update) {
            debug!(output = %self.options.output.display(), "updating existing tile index");
            return Ok(ds);
        }

        let driver = DriverManager::get_driver_by_name(&self.options.driver).map_err(|_| {
            IndexError::DriverNotFound {
                name: self.options.driver.clone(),
                available: available_vector_drivers(),
            }
        })?;

        if !supports_dataset_creation(&driver) {
            return Err(IndexError::DriverCannotCreate {
                name: self.options.driver.clone(),
            });
        }

        let mut ds = driver
            .create_vector_only(&self.options.output)
            .map_err(|source| IndexError::CreateFailed {
                driver: self.options.driver.clone(),
                path: self.options.output.clone(),
                source,
            })?;
        debug!(output = %self.options.output.display(), driver = %self.options.driver, "created tile index dataset");

        if ds.layers().next().is_none() {
            let srs = self.first_selected_spatial_ref();
            let layer = ds.create_layer(LayerOptions {
                name: INDEX_LAYER_NAME,
                ty: OGRwkbGeometryType::wkbPolygon,
                srs: srs.as_ref(),
                options: None,
            })?;

            let field = FieldDefn::new(&self.options.location_field, OGRFieldType::OFTString)?;
            field.set_width(LOCATION_FIELD_WIDTH);
            field.add_to_layer(&layer)?;
        }

        Ok(ds)
    }

    /// Spatial reference used when creating a fresh index layer: the
    /// one of the first selected layer of the first source dataset, if
    /// that dataset opens and such a layer exists.
    fn first_selected_spatial_ref(&self) -> Option<SpatialRef> {
        let first = self.options.sources.first()?;
        let ds = Dataset::open(first).ok()?;
        for (index, layer) in ds.layers().enumerate() {
            if self.options.selects_layer(index, &layer.name()) {
                return layer.spatial_ref();
            }
        }
        None
    }
}

/// Reopen the source named by the first pre-existing record and recover
/// the spatial reference and attribute schema the index was built with.
///
/// Only this one record is consulted; later records never influence the
/// established state.
fn recover_reference_state(
    path: &Path,
    layer_index: usize,
) -> Option<(Option<SpatialRef>, SchemaSnapshot)> {
    let ds = Dataset::open(path).ok()?;
    let layer = ds.layers().nth(layer_index)?;
    Some((layer.spatial_ref(), SchemaSnapshot::from_defn(layer.defn())))
}

/// Whether two layer spatial references disagree.
///
/// Both sides missing counts as agreement; exactly one side missing
/// counts as disagreement.
fn spatial_refs_differ(reference: Option<&SpatialRef>, candidate: Option<&SpatialRef>) -> bool {
    match (reference, candidate) {
        (Some(reference), Some(candidate)) => reference != candidate,
        (None, None) => false,
        _ => true,
    }
}

/// Whether a driver can create new datasets.
fn supports_dataset_creation(driver: &Driver) -> bool {
    driver.metadata_item("DCAP_CREATE", "").as_deref() == Some("YES")
}

/// Short names of all registered vector drivers, for the unknown-driver
/// error message.
fn available_vector_drivers() -> Vec<String> {
    let mut names = Vec::new();
    for index in 0..DriverManager::count() {
        if let Ok(driver) = DriverManager::get_driver(index) {
            if driver.metadata_item("DCAP_VECTOR", "").as_deref() == Some("YES") {
                names.push(driver.short_name());
            }
        }
    }
    names
}

/// Closed rectangle over a layer extent, wound min/min, min/max,
/// max/max, max/min, and back to min/min.
fn extent_ring(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Geometry, GdalError> {
    let mut ring = Geometry::empty(OGRwkbGeometryType::wkbLinearRing)?;
    ring.add_point_2d((min_x, min_y));
    ring.add_point_2d((min_x, max_y));
    ring.add_point_2d((max_x, max_y));
    ring.add_point_2d((max_x, min_y));
    ring.add_point_2d((min_x, min_y));

    let mut rectangle = Geometry::empty(OGRwkbGeometryType::wkbPolygon)?;
    rectangle.add_geometry(ring)?;
    Ok(rectangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_ring_is_a_closed_five_point_rectangle() {
        let rectangle = extent_ring(0.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!(
            rectangle.wkt().unwrap(),
            "POLYGON ((0 0,0 10,10 10,10 0,0 0))"
        );
    }

    #[test]
    fn test_extent_ring_preserves_negative_bounds() {
        let rectangle = extent_ring(-180.0, -90.0, 180.0, 90.0).unwrap();
        assert_eq!(
            rectangle.wkt().unwrap(),
            "POLYGON ((-180 -90,-180 90,180 90,180 -90,-180 -90))"
        );
    }

    #[test]
    fn test_spatial_refs_differ_between_projections() {
        let wgs84 = SpatialRef::from_epsg(4326).unwrap();
        let mercator = SpatialRef::from_epsg(3857).unwrap();
        assert!(spatial_refs_differ(Some(&wgs84), Some(&mercator)));
    }

    #[test]
    fn test_spatial_refs_agree_on_same_projection() {
        let a = SpatialRef::from_epsg(4326).unwrap();
        let b = SpatialRef::from_epsg(4326).unwrap();
        assert!(!spatial_refs_differ(Some(&a), Some(&b)));
    }

    #[test]
    fn test_missing_spatial_ref_only_differs_from_a_present_one() {
        let wgs84 = SpatialRef::from_epsg(4326).unwrap();
        assert!(spatial_refs_differ(Some(&wgs84), None));
        assert!(spatial_refs_differ(None, Some(&wgs84)));
        assert!(!spatial_refs_differ(None, None));
    }
}
