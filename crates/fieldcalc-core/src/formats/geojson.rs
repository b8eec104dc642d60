//! GeoJSON adapter.
//!
//! Exports a FeatureCollection in geographic (WGS84) coordinates: one Point
//! feature per survey point plus one Polygon feature carrying the survey
//! metrics. The reader accepts any FeatureCollection and pulls out named
//! Point features.

use crate::error::{FieldcalcError, Result};
use crate::formats::{CoordSpace, FormatWriter, ImportedPoint, PointReader, SurveyExport};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};

pub struct GeoJsonWriter;

impl FormatWriter for GeoJsonWriter {
    fn write(&self, export: &SurveyExport) -> Result<String> {
        let mut features = Vec::with_capacity(export.points.len() + 1);

        for point in &export.points {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), serde_json::json!(point.role.to_string()));
            properties.insert("easting".to_string(), serde_json::json!(point.projected[0]));
            properties.insert("northing".to_string(), serde_json::json!(point.projected[1]));

            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(point.geographic.to_vec()))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
        }

        // Exterior ring in geographic coordinates, explicitly closed.
        let mut exterior: Vec<Vec<f64>> =
            export.ring_points().map(|p| p.geographic.to_vec()).collect();
        if let Some(first) = exterior.first().cloned() {
            exterior.push(first);
        }

        let mut properties = JsonObject::new();
        properties.insert("site".to_string(), serde_json::json!(export.site_name));
        properties.insert("utm_zone".to_string(), serde_json::json!(export.zone));
        properties.insert(
            "declination_deg".to_string(),
            serde_json::json!(export.declination_deg),
        );
        properties.insert(
            "area_sq_m".to_string(),
            serde_json::json!(export.metrics.area_sq_m),
        );
        properties.insert(
            "perimeter_m".to_string(),
            serde_json::json!(export.metrics.perimeter_m),
        );
        properties.insert(
            "closure_error_percent".to_string(),
            serde_json::json!(export.metrics.closure_error_percent),
        );

        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![exterior]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });

        let collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };
        Ok(GeoJson::FeatureCollection(collection).to_string())
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    fn file_extension(&self) -> &str {
        "geojson"
    }
}

pub struct GeoJsonReader;

impl PointReader for GeoJsonReader {
    fn parse(&self, content: &str) -> Result<Vec<ImportedPoint>> {
        let geojson: GeoJson =
            content
                .parse()
                .map_err(|e: geojson::Error| FieldcalcError::Serialization(format!(
                    "invalid GeoJSON: {}",
                    e
                )))?;

        let features = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                return Err(FieldcalcError::Serialization(
                    "bare geometry has no point names".to_string(),
                ))
            }
        };

        let mut points = Vec::new();
        for feature in &features {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            let Value::Point(position) = &geometry.value else {
                continue;
            };
            if position.len() < 2 {
                continue;
            }
            let Some(name) = feature_name(feature) else {
                tracing::debug!("unnamed point feature skipped");
                continue;
            };
            points.push(ImportedPoint {
                name,
                coords: [position[0], position[1]],
                space: CoordSpace::Geographic,
            });
        }
        Ok(points)
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["geojson", "json"]
    }
}

fn feature_name(feature: &Feature) -> Option<String> {
    let properties = feature.properties.as_ref()?;
    properties
        .get("name")
        .or_else(|| properties.get("Name"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tests::square_export;

    #[test]
    fn test_writer_produces_points_and_polygon() {
        let text = GeoJsonWriter.write(&square_export()).unwrap();
        let parsed: GeoJson = text.parse().unwrap();
        let GeoJson::FeatureCollection(fc) = parsed else {
            panic!("expected a feature collection");
        };
        // 5 points + 1 polygon.
        assert_eq!(fc.features.len(), 6);

        let polygon = fc
            .features
            .iter()
            .find(|f| {
                matches!(
                    f.geometry.as_ref().map(|g| &g.value),
                    Some(Value::Polygon(_))
                )
            })
            .unwrap();
        let props = polygon.properties.as_ref().unwrap();
        assert_eq!(props["area_sq_m"], serde_json::json!(10_000.0));
        assert_eq!(props["utm_zone"], serde_json::json!(36));

        let Some(Value::Polygon(rings)) = polygon.geometry.as_ref().map(|g| g.value.clone()) else {
            panic!("expected polygon geometry");
        };
        // 4 ring vertices + closing vertex.
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn test_round_trip_point_names() {
        let text = GeoJsonWriter.write(&square_export()).unwrap();
        let points = GeoJsonReader.parse(&text).unwrap();
        let names: Vec<_> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["LM", "SP", "TP1", "TP2", "TP3"]);
        assert!(points.iter().all(|p| p.space == CoordSpace::Geographic));
    }

    #[test]
    fn test_reader_skips_unnamed_and_non_point_features() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [31.0, 50.5]}, "properties": {}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [31.1, 50.6]}, "properties": {"name": "SP"}},
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}, "properties": {"name": "TP1"}}
            ]
        }"#;
        let points = GeoJsonReader.parse(content).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "SP");
        assert_eq!(points[0].coords, [31.1, 50.6]);
    }

    #[test]
    fn test_reader_rejects_invalid_json() {
        assert!(GeoJsonReader.parse("not json").is_err());
    }
}
