//! Tract boundary `GeoJSON` loader.

use std::collections::BTreeMap;
use std::io::Read;

use geo::MultiPolygon;
use geojson::GeoJson;

use crate::DatasetError;

/// Reads a `FeatureCollection` and returns each feature's shape keyed by
/// the `id_property` feature property.
///
/// `Polygon` geometries are promoted to single-member `MultiPolygon`s.
/// Features without the id property, without geometry, or with non-areal
/// geometry are skipped.
///
/// # Errors
///
/// Returns [`DatasetError`] if the input cannot be read or is not a
/// `GeoJSON` `FeatureCollection`.
pub fn load_boundaries(
    mut reader: impl Read,
    id_property: &str,
) -> Result<BTreeMap<String, MultiPolygon<f64>>, DatasetError> {
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|e| DatasetError::Io {
            path: "boundaries".to_string(),
            source: e,
        })?;

    let GeoJson::FeatureCollection(collection) = contents.parse::<GeoJson>()? else {
        return Err(DatasetError::Conversion {
            message: "boundary file is not a GeoJSON FeatureCollection".to_string(),
        });
    };

    let mut shapes = BTreeMap::new();
    let mut skipped = 0usize;

    for feature in collection.features {
        let id = match feature.property(id_property) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let Some(shape) = feature.geometry.and_then(to_multipolygon) else {
            log::warn!("Skipping boundary {id}: missing or non-polygon geometry");
            skipped += 1;
            continue;
        };

        shapes.insert(id, shape);
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} boundary features");
    }
    log::info!("Loaded {} tract boundaries", shapes.len());

    Ok(shapes)
}

fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
