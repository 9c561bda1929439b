//! In-memory spatial index over tract boundaries.
//!
//! Resolves map clicks (a point) and lasso selections (a polygon) to tract
//! GEOIDs without going through the charting layer.

use geo::{BoundingRect, Contains, Intersects, MultiPolygon, Polygon};
use rstar::{AABB, RTree, RTreeObject};
use ticket_explorer_tickets_models::AreaRecord;

/// A tract boundary stored in the R-tree.
struct BoundaryEntry {
    area_id: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree of tract boundaries.
///
/// Built once from the loaded tracts; tracts without a boundary are left
/// out.
pub struct BoundaryIndex {
    tree: RTree<BoundaryEntry>,
}

impl BoundaryIndex {
    /// Builds the index from every tract that has a boundary.
    #[must_use]
    pub fn from_areas(areas: &[AreaRecord]) -> Self {
        let entries: Vec<BoundaryEntry> = areas
            .iter()
            .filter_map(|area| {
                let polygon = area.boundary.clone()?;
                Some(BoundaryEntry {
                    area_id: area.area_id.clone(),
                    envelope: envelope_of(polygon.bounding_rect()),
                    polygon,
                })
            })
            .collect();

        log::info!("Indexed {} tract boundaries", entries.len());

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed boundaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if no tract has a boundary.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Returns the tract containing a point.
    ///
    /// Tracts tile the city without overlap, so first match wins.
    #[must_use]
    pub fn area_at(&self, lng: f64, lat: f64) -> Option<&str> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .find(|entry| entry.polygon.contains(&point))
            .map(|entry| entry.area_id.as_str())
    }

    /// Returns every tract whose boundary intersects a lasso polygon,
    /// sorted by GEOID.
    #[must_use]
    pub fn areas_within(&self, lasso: &Polygon<f64>) -> Vec<&str> {
        let Some(rect) = lasso.bounding_rect() else {
            return Vec::new();
        };
        let query_env = envelope_of(Some(rect));

        let mut ids: Vec<&str> = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.intersects(lasso))
            .map(|entry| entry.area_id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}

fn envelope_of(rect: Option<geo::Rect<f64>>) -> AABB<[f64; 2]> {
    rect.map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
