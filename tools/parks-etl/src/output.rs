use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use std::path::Path;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Output layer a feature is written to. The tile source layer names match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum GeometryKind {
    Points,
    Lines,
    Polygons,
}

impl GeometryKind {
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Point(_) | Value::MultiPoint(_) => Some(Self::Points),
            Value::LineString(_) | Value::MultiLineString(_) => Some(Self::Lines),
            Value::Polygon(_) | Value::MultiPolygon(_) => Some(Self::Polygons),
            Value::GeometryCollection(_) => None,
        }
    }

    pub fn file_name(self) -> String {
        format!("{self}.geojson")
    }
}

/// Single geometries become their multi form so each layer has one type.
pub fn promote_to_multi(value: Value) -> Value {
    match value {
        Value::Point(point) => Value::MultiPoint(vec![point]),
        Value::LineString(line) => Value::MultiLineString(vec![line]),
        Value::Polygon(polygon) => Value::MultiPolygon(vec![polygon]),
        other => other,
    }
}

#[derive(Debug, Default)]
pub struct LayerSplit {
    pub points: Vec<Feature>,
    pub lines: Vec<Feature>,
    pub polygons: Vec<Feature>,
    pub skipped: usize,
}

impl LayerSplit {
    pub fn layer(&self, kind: GeometryKind) -> &[Feature] {
        match kind {
            GeometryKind::Points => &self.points,
            GeometryKind::Lines => &self.lines,
            GeometryKind::Polygons => &self.polygons,
        }
    }

    fn layer_mut(&mut self, kind: GeometryKind) -> &mut Vec<Feature> {
        match kind {
            GeometryKind::Points => &mut self.points,
            GeometryKind::Lines => &mut self.lines,
            GeometryKind::Polygons => &mut self.polygons,
        }
    }
}

/// Sorts features into point, line and polygon layers, promoting each
/// geometry to its multi form. Geometry collections are skipped.
pub fn split_by_geometry(features: impl IntoIterator<Item = Feature>) -> LayerSplit {
    let mut split = LayerSplit::default();

    for mut feature in features {
        let Some(geometry) = feature.geometry.take() else {
            split.skipped += 1;
            continue;
        };
        let Some(kind) = GeometryKind::of(&geometry.value) else {
            log::debug!("Skipping geometry collection {:?}", feature.id);
            split.skipped += 1;
            continue;
        };

        feature.geometry = Some(Geometry {
            value: promote_to_multi(geometry.value),
            ..geometry
        });
        split.layer_mut(kind).push(feature);
    }

    split
}

/// Write one GeoJSON file per geometry kind into `output_dir`.
pub fn write_layers(split: &LayerSplit, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    for kind in GeometryKind::iter() {
        let path = output_dir.join(kind.file_name());
        write_features(split.layer(kind), &path)
            .with_context(|| format!("Failed to write {kind} layer"))?;
    }

    Ok(())
}

fn write_features(features: &[Feature], output_path: &Path) -> Result<()> {
    log::info!("Writing {} features to {}", features.len(), output_path.display());

    let feature_collection = FeatureCollection {
        bbox: None,
        features: features.to_vec(),
        foreign_members: None,
    };

    let geojson = GeoJson::from(feature_collection);
    let json_string = serde_json::to_string(&geojson).context("Failed to serialize GeoJSON")?;

    std::fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write GeoJSON to {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(value: Value) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(value)),
            id: None,
            properties: None,
            foreign_members: None,
        }
    }

    fn square() -> Vec<Vec<Vec<f64>>> {
        vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ]]
    }

    #[test]
    fn test_promote_to_multi() {
        match promote_to_multi(Value::Polygon(square())) {
            Value::MultiPolygon(polygons) => {
                assert_eq!(polygons.len(), 1);
                assert_eq!(polygons[0], square());
            }
            other => panic!("Expected MultiPolygon, got {other:?}"),
        }

        // already multi
        let multi = Value::MultiPoint(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(promote_to_multi(multi.clone()), multi);
    }

    #[test]
    fn test_split_by_geometry() {
        let split = split_by_geometry(vec![
            feature(Value::Point(vec![1.0, 2.0])),
            feature(Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])),
            feature(Value::Polygon(square())),
            feature(Value::MultiPolygon(vec![square(), square()])),
            feature(Value::GeometryCollection(vec![])),
        ]);

        assert_eq!(split.points.len(), 1);
        assert_eq!(split.lines.len(), 1);
        assert_eq!(split.polygons.len(), 2);
        assert_eq!(split.skipped, 1);

        for feature in &split.polygons {
            let value = &feature.geometry.as_ref().unwrap().value;
            assert!(matches!(value, Value::MultiPolygon(_)));
        }
    }

    #[test]
    fn test_file_names() {
        let names: Vec<_> = GeometryKind::iter().map(GeometryKind::file_name).collect();
        assert_eq!(names, ["points.geojson", "lines.geojson", "polygons.geojson"]);
    }

    #[test]
    fn test_write_layers() {
        let dir = std::env::temp_dir().join(format!("parks-etl-test-{}", std::process::id()));
        let split = split_by_geometry(vec![feature(Value::Polygon(square()))]);

        write_layers(&split, &dir).unwrap();

        let polygons: GeoJson = std::fs::read_to_string(dir.join("polygons.geojson"))
            .unwrap()
            .parse()
            .unwrap();
        match polygons {
            GeoJson::FeatureCollection(collection) => assert_eq!(collection.features.len(), 1),
            other => panic!("Expected FeatureCollection, got {other:?}"),
        }
        assert!(dir.join("points.geojson").exists());
        assert!(dir.join("lines.geojson").exists());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
