use geo::{Area, BooleanOps, BoundingRect, Relate};
use rayon::prelude::*;

use crate::geom::Geometries;

/// Overlap between shape `source` of one layer and shape `target` of another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub source: usize,
    pub target: usize,
    pub area: f64,
}

impl Geometries {
    /// Every pair (i in `self`, j in `other`) whose interiors overlap, with the
    /// planar area of their intersection. Pairs that merely touch along an
    /// edge or whose overlap area is not above `min_area` are dropped.
    ///
    /// Shapes of `self` are processed in parallel; output is ordered by
    /// (source, target).
    pub fn intersections(&self, other: &Geometries, min_area: f64) -> Vec<Overlap> {
        (0..self.len()).into_par_iter()
            .flat_map_iter(|i| {
                let shape = &self.shapes()[i];
                let mut overlaps = Vec::new();
                let Some(rect) = shape.bounding_rect() else { return overlaps };

                let envelope = rstar::AABB::from_corners(rect.min().into(), rect.max().into());
                let mut candidates = other.query(&envelope).map(|bb| bb.idx()).collect::<Vec<_>>();
                candidates.sort_unstable();

                for j in candidates {
                    let im = shape.relate(&other.shapes()[j]);
                    if !im.is_intersects() || im.is_touches() { continue }

                    let area = shape.intersection(&other.shapes()[j]).unsigned_area();
                    if area > min_area {
                        overlaps.push(Overlap { source: i, target: j, area });
                    }
                }
                overlaps
            })
            .collect()
    }
}
