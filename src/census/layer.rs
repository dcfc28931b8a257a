use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use geo::MultiPolygon;

use crate::{
    common::{Error, QualityReport, Warning},
    config::LayerSource,
    geom::{Geometries, Reprojection},
    io::shp::{field_as_text, read_shapefile},
};

/// Planar polygons with an identifier per feature, e.g. precincts of one
/// boundary vintage or block groups of one census vintage.
#[derive(Debug, Clone)]
pub struct PolygonLayer {
    name: String,
    ids: Vec<String>,
    geoms: Geometries,
    areas: Vec<f64>,
}

impl PolygonLayer {
    /// Build a layer from already-projected shapes. Features sharing an id are
    /// merged into one multipolygon.
    pub fn new(name: &str, features: impl IntoIterator<Item = (String, MultiPolygon<f64>)>) -> Result<Self, Error> {
        let mut index: AHashMap<String, usize> = AHashMap::new();
        let mut ids = Vec::new();
        let mut shapes: Vec<MultiPolygon<f64>> = Vec::new();
        for (id, shape) in features {
            match index.get(&id) {
                Some(&i) => shapes[i].0.extend(shape.0),
                None => {
                    index.insert(id.clone(), ids.len());
                    ids.push(id);
                    shapes.push(shape);
                }
            }
        }
        if ids.is_empty() {
            return Err(Error::EmptyLayer(name.to_string()));
        }

        let geoms = Geometries::new(shapes);
        let areas = geoms.areas();
        Ok(Self { name: name.to_string(), ids, geoms, areas })
    }

    /// Load a shapefile, drop features without geometry, and reproject into
    /// `target_crs`.
    pub fn from_shapefile(name: &str, path: &Path, source: &LayerSource, target_crs: &str, report: &mut QualityReport) -> Result<Self> {
        let items = read_shapefile(path)?;
        let total = items.len();

        let mut missing = 0;
        let mut features = Vec::with_capacity(total);
        for (shape, record) in items {
            let Some(shape) = shape else { missing += 1; continue };
            let id = source.id_fields.iter()
                .map(|field| field_as_text(&record, field).ok_or_else(|| Error::MissingColumn(field.clone())))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("[census::layer] feature without id in {}", path.display()))?
                .concat();
            features.push((id, shape));
        }
        if missing > 0 {
            report.warn(Warning::MissingGeometry { layer: name.to_string(), count: missing });
        }

        if source.crs.trim() != target_crs.trim() {
            let reprojection = Reprojection::new(&source.crs, target_crs)?;
            features = features.into_iter()
                .map(|(id, shape)| Ok((id, reprojection.shape(&shape)?)))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("[census::layer] Failed to reproject {}", path.display()))?;
        }

        let layer = Self::new(name, features)?;
        tracing::info!("[census::layer] {name}: {} features ({total} records)", layer.len());
        Ok(layer)
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn len(&self) -> usize { self.ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    #[inline] pub fn ids(&self) -> &[String] { &self.ids }

    #[inline] pub fn geometries(&self) -> &Geometries { &self.geoms }

    /// Feature areas in squared metres.
    #[inline] pub fn areas(&self) -> &[f64] { &self.areas }
}
