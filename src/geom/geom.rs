use geo::{Area, BoundingRect, MultiPolygon};
use rstar::{RTree, AABB};

use crate::geom::BoundingBox;

/// Geometries represents a collection of planar MultiPolygons indexed by an R-tree.
#[derive(Debug, Clone)]
pub struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty shapes are kept (so indices stay aligned) but never returned by queries.
    pub fn new(polygons: Vec<MultiPolygon<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                polygons.iter().enumerate()
                    .filter_map(|(i, polygon)| polygon.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            shapes: polygons,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Query the R-tree for bounding boxes intersecting the given envelope.
    #[inline]
    pub(super) fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &BoundingBox> {
        self.rtree.locate_in_envelope_intersecting(envelope)
    }

    /// Planar area of every MultiPolygon, in squared CRS units.
    pub fn areas(&self) -> Vec<f64> {
        self.shapes.iter().map(|shape| shape.unsigned_area()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]])
    }

    #[test]
    fn planar_areas() {
        let geoms = Geometries::new(vec![square(0.0, 0.0, 10.0), square(20.0, 5.0, 2.0)]);
        assert_eq!(geoms.len(), 2);
        assert_eq!(geoms.areas(), vec![100.0, 4.0]);
    }

    #[test]
    fn empty_shapes_keep_their_slot() {
        let geoms = Geometries::new(vec![MultiPolygon(vec![]), square(0.0, 0.0, 1.0)]);
        assert_eq!(geoms.len(), 2);
        let everything = AABB::from_corners([-1e9, -1e9], [1e9, 1e9]);
        assert_eq!(geoms.query(&everything).map(|bb| bb.idx()).collect::<Vec<_>>(), vec![1]);
        assert_eq!(geoms.areas()[0], 0.0);
    }
}
