use anyhow::{anyhow, Context, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// NAD83 longitude/latitude, the CRS of TIGER and city open-data shapefiles.
pub const NAD83_LONLAT: &str = "+proj=longlat +datum=NAD83 +no_defs +type=crs";

/// NAD83 / UTM zone 10N (EPSG:26910), metres. Shared planar CRS for area math.
pub const NAD83_UTM10N: &str = "+proj=utm +zone=10 +datum=NAD83 +units=m +no_defs +type=crs";

/// Whether a PROJ.4 string describes a geographic (degree-based) CRS.
fn is_geographic(proj_string: &str) -> bool {
    ["+proj=longlat", "+proj=latlong", "+proj=lonlat", "+proj=latlon"]
        .iter()
        .any(|p| proj_string.contains(p))
}

/// A source → target coordinate transformation.
pub struct Reprojection {
    from: Proj4,
    to: Proj4,
    from_degrees: bool,
    to_degrees: bool,
}

impl Reprojection {
    pub fn new(from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            from: Proj4::from_proj_string(from)
                .with_context(|| anyhow!("failed to build source PROJ.4: {from}"))?,
            to: Proj4::from_proj_string(to)
                .with_context(|| anyhow!("failed to build target PROJ.4: {to}"))?,
            from_degrees: is_geographic(from),
            to_degrees: is_geographic(to),
        })
    }

    /// Transform a single coordinate.
    pub fn coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        // proj4rs works in radians for geographic systems.
        let mut point = if self.from_degrees {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(&self.from, &self.to, &mut point)
            .map_err(|e| anyhow!("CRS transform failed at ({}, {}): {e}", coord.x, coord.y))?;

        Ok(if self.to_degrees {
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        } else {
            Coord { x: point.0, y: point.1 }
        })
    }

    pub fn shape(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        shape.try_map_coords(|coord| self.coord(coord))
    }
}
