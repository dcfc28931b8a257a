mod bbox;
mod geom;
mod overlay;
mod proj;

use bbox::BoundingBox;
pub use geom::Geometries;
pub use overlay::Overlap;
pub use proj::{Reprojection, NAD83_LONLAT, NAD83_UTM10N};
