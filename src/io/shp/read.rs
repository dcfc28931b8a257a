//! Shapefile reading operations.

use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};

/// Reads all shapes and attribute records from a `.shp` file. Null shapes
/// (records without geometry) are returned as `None`.
pub(crate) fn read_shapefile(path: &Path) -> Result<Vec<(Option<MultiPolygon<f64>>, Record)>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp::read] Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result
            .with_context(|| format!("[io::shp::read] Error reading shape+record in {}", path.display()))?;
        let geometry = match shape {
            Shape::NullShape => None,
            Shape::Polygon(polygon) => Some(polygon_to_geo(polygon.rings())),
            other => bail!("[io::shp::read] found non-Polygon shape in {}: {:?}", path.display(), other.shapetype()),
        };
        items.push((geometry, record));
    }
    Ok(items)
}

/// Group shapefile rings into polygons: each outer ring owns the inner rings
/// that follow it.
pub(crate) fn polygon_to_geo(rings: &[PolygonRing<shapefile::Point>]) -> MultiPolygon<f64> {
    fn closed(points: &[shapefile::Point]) -> LineString<f64> {
        let mut coords = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect::<Vec<_>>();
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
        LineString(coords)
    }

    let mut polygons = Vec::new();
    let mut current: Option<(LineString<f64>, Vec<LineString<f64>>)> = None;

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => {
                if let Some((exterior, holes)) = current.take() {
                    polygons.push(Polygon::new(exterior, holes));
                }
                current = Some((closed(points), Vec::new()));
            }
            PolygonRing::Inner(points) => match current.as_mut() {
                Some((_, holes)) => holes.push(closed(points)),
                // A hole with no preceding outer ring; treat it as its own polygon.
                None => polygons.push(Polygon::new(closed(points), Vec::new())),
            },
        }
    }
    if let Some((exterior, holes)) = current {
        polygons.push(Polygon::new(exterior, holes));
    }

    MultiPolygon(polygons)
}

/// Value of an attribute as text. Integral numbers are printed without a
/// fractional part so that numeric id fields match their text form.
pub(crate) fn field_as_text(record: &Record, field: &str) -> Option<String> {
    fn number(n: f64) -> String {
        if n.fract() == 0.0 { format!("{n:.0}") } else { n.to_string() }
    }

    match record.get(field)? {
        FieldValue::Character(Some(s)) => Some(s.trim().to_string()),
        FieldValue::Numeric(Some(n)) => Some(number(*n)),
        FieldValue::Float(Some(n)) => Some(number(*n as f64)),
        FieldValue::Double(n) => Some(number(*n)),
        FieldValue::Integer(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use shapefile::Point;

    fn ring(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point { x, y }).collect()
    }

    #[test]
    fn outer_ring_with_hole() {
        let rings = vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(ring(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 4.0), (2.0, 2.0)])),
            PolygonRing::Outer(ring(&[(20.0, 0.0), (20.0, 1.0), (21.0, 1.0), (21.0, 0.0)])),
        ];
        let mp = polygon_to_geo(&rings);

        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!((mp.unsigned_area() - (100.0 - 4.0 + 1.0)).abs() < 1e-9);
        // Unclosed ring is closed on conversion
        assert_eq!(mp.0[1].exterior().0.first(), mp.0[1].exterior().0.last());
    }

    #[test]
    fn numeric_fields_print_as_integers() {
        let mut record = Record::default();
        record.insert("precname".to_string(), FieldValue::Numeric(Some(1101.0)));
        record.insert("name".to_string(), FieldValue::Character(Some(" 1102 ".to_string())));
        record.insert("empty".to_string(), FieldValue::Character(None));

        assert_eq!(field_as_text(&record, "precname").as_deref(), Some("1101"));
        assert_eq!(field_as_text(&record, "name").as_deref(), Some("1102"));
        assert_eq!(field_as_text(&record, "empty"), None);
        assert_eq!(field_as_text(&record, "missing"), None);
    }
}
