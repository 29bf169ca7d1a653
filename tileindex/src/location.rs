//! Reference strings tying index records back to their source layer.
//!
//! Every record carries a `"<path>,<layer-index>"` string in its
//! reference field. The path part may itself contain commas, so parsing
//! always splits on the last comma of the string.

use std::path::Path;

/// Format the reference string for a source layer.
pub fn format_location(path: &Path, layer_index: usize) -> String {
    format!("{},{}", path.display(), layer_index)
}

/// Split a reference string into its source path and layer index.
///
/// Returns `None` when the string has no comma or the part after the
/// last comma is not a layer index.
pub fn parse_location(location: &str) -> Option<(&str, usize)> {
    let (path, index) = location.rsplit_once(',')?;
    Some((path, index.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_location_appends_layer_index() {
        let path = PathBuf::from("data/roads.shp");
        assert_eq!(format_location(&path, 0), "data/roads.shp,0");
        assert_eq!(format_location(&path, 12), "data/roads.shp,12");
    }

    #[test]
    fn test_parse_location_splits_on_last_comma() {
        assert_eq!(parse_location("data/roads.shp,3"), Some(("data/roads.shp", 3)));
        assert_eq!(
            parse_location("data/a,b/rivers.shp,0"),
            Some(("data/a,b/rivers.shp", 0))
        );
    }

    #[test]
    fn test_parse_location_rejects_malformed_strings() {
        assert_eq!(parse_location("no-comma-here"), None);
        assert_eq!(parse_location("path,notanumber"), None);
        assert_eq!(parse_location(""), None);
    }

    #[test]
    fn test_format_then_parse_round_trips() {
        let path = PathBuf::from("/abs/with,comma/layer.gpkg");
        let location = format_location(&path, 5);
        assert_eq!(parse_location(&location), Some(("/abs/with,comma/layer.gpkg", 5)));
    }
}
