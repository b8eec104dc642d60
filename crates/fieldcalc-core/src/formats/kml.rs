//! KML adapter.
//!
//! The writer emits a KML 2.2 document by hand: per-role placemark styles, a
//! placemark per point with a CDATA description (UTM and geographic
//! coordinates), and the survey polygon as a styled LinearRing. The reader
//! walks a parsed KML tree and collects named Point placemarks, recursing
//! through Documents and Folders.

use crate::error::{FieldcalcError, Result};
use crate::formats::{CoordSpace, FormatWriter, ImportedPoint, PointReader, SurveyExport};
use crate::models::PointRole;
use kml::Kml;
use std::fmt::Write as _;

pub struct KmlWriter;

impl FormatWriter for KmlWriter {
    fn write(&self, export: &SurveyExport) -> Result<String> {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
        out.push_str("<Document>\n");
        let _ = writeln!(out, "<name>{}</name>", xml_escape(&export.site_name));

        push_icon_style(&mut out, "LMStyle", "triangle.png", 1.0);
        push_icon_style(&mut out, "BMStyle", "placemark_square.png", 1.0);
        push_icon_style(&mut out, "SPStyle", "placemark_circle.png", 1.0);
        push_icon_style(&mut out, "TPStyle", "placemark_circle.png", 0.6);

        out.push_str("<Style id=\"polygonStyle\">\n");
        out.push_str("<LineStyle>\n<color>ff0000dc</color>\n<width>2.0</width>\n</LineStyle>\n");
        out.push_str(
            "<PolyStyle>\n<color>660000dc</color>\n<fill>1</fill>\n<outline>1</outline>\n</PolyStyle>\n",
        );
        out.push_str("</Style>\n");

        for point in &export.points {
            out.push_str("<Placemark>\n");
            let _ = writeln!(out, "<name>{}</name>", point.role);
            let _ = writeln!(
                out,
                "<description><![CDATA[<b>Type:</b> {}<br><b>Description:</b> {}<br>\
                 <b>UTM Coordinates:</b> {:.0}, {:.0}<br><b>Lat/Lng:</b> {:.6}, {:.6}]]></description>",
                point.role,
                role_description(point.role),
                point.projected[0],
                point.projected[1],
                point.geographic[1],
                point.geographic[0]
            );
            let _ = writeln!(out, "<styleUrl>#{}</styleUrl>", style_id(point.role));
            out.push_str("<Point>\n");
            let _ = writeln!(
                out,
                "<coordinates>{},{},0</coordinates>",
                point.geographic[0], point.geographic[1]
            );
            out.push_str("</Point>\n</Placemark>\n");
        }

        let ring: Vec<_> = export.ring_points().collect();
        if ring.len() >= 3 {
            out.push_str("<Placemark>\n<name>Survey Polygon</name>\n");
            out.push_str("<styleUrl>#polygonStyle</styleUrl>\n");
            out.push_str("<Polygon>\n<outerBoundaryIs>\n<LinearRing>\n<coordinates>\n");
            for point in &ring {
                let _ = write!(out, "{},{},0 ", point.geographic[0], point.geographic[1]);
            }
            // Close back to the first vertex.
            let _ = write!(out, "{},{},0", ring[0].geographic[0], ring[0].geographic[1]);
            out.push_str("\n</coordinates>\n</LinearRing>\n</outerBoundaryIs>\n</Polygon>\n");
            out.push_str("</Placemark>\n");
        }

        out.push_str("</Document>\n</kml>");
        Ok(out)
    }

    fn format_name(&self) -> &str {
        "KML"
    }

    fn file_extension(&self) -> &str {
        "kml"
    }
}

fn push_icon_style(out: &mut String, id: &str, icon: &str, scale: f64) {
    let _ = writeln!(
        out,
        "<Style id=\"{}\">\n<IconStyle>\n<Icon>\n<href>http://maps.google.com/mapfiles/kml/shapes/{}</href>\n</Icon>\n<color>ffffffff</color>\n<scale>{}</scale>\n</IconStyle>\n</Style>",
        id, icon, scale
    );
}

fn style_id(role: PointRole) -> &'static str {
    match role {
        PointRole::Landmark => "LMStyle",
        PointRole::Benchmark => "BMStyle",
        PointRole::Start => "SPStyle",
        PointRole::Turning(_) => "TPStyle",
    }
}

fn role_description(role: PointRole) -> &'static str {
    match role {
        PointRole::Landmark => "Landmark",
        PointRole::Benchmark => "Benchmark",
        PointRole::Start => "Start Point",
        PointRole::Turning(_) => "Turning Point",
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

pub struct KmlReader;

impl PointReader for KmlReader {
    fn parse(&self, content: &str) -> Result<Vec<ImportedPoint>> {
        let kml: Kml = content.parse().map_err(|e| {
            FieldcalcError::Serialization(format!("invalid KML: {}", e))
        })?;

        let mut points = Vec::new();
        collect_points(&kml, &mut points);
        Ok(points)
    }

    fn format_name(&self) -> &str {
        "KML"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["kml"]
    }
}

fn collect_points(kml: &Kml, points: &mut Vec<ImportedPoint>) {
    match kml {
        Kml::KmlDocument(doc) => {
            for element in &doc.elements {
                collect_points(element, points);
            }
        }
        Kml::Document { elements, .. } | Kml::Folder { elements, .. } => {
            for element in elements {
                collect_points(element, points);
            }
        }
        Kml::Placemark(placemark) => {
            let Some(kml::types::Geometry::Point(point)) = &placemark.geometry else {
                return;
            };
            let Some(name) = &placemark.name else {
                tracing::debug!("unnamed placemark skipped");
                return;
            };
            points.push(ImportedPoint {
                name: name.clone(),
                coords: [point.coord.x, point.coord.y],
                space: CoordSpace::Geographic,
            });
        }
        // NetworkLink, GroundOverlay and friends carry no survey points.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tests::square_export;

    #[test]
    fn test_writer_emits_styles_and_placemarks() {
        let text = KmlWriter.write(&square_export()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<Style id=\"SPStyle\">"));
        assert!(text.contains("<Style id=\"polygonStyle\">"));
        assert!(text.contains("<color>ff0000dc</color>"));
        assert!(text.contains("<color>660000dc</color>"));
        assert!(text.contains("<name>SP</name>"));
        assert!(text.contains("<styleUrl>#TPStyle</styleUrl>"));
        assert!(text.contains("<name>Survey Polygon</name>"));
    }

    #[test]
    fn test_writer_closes_the_ring() {
        let text = KmlWriter.write(&square_export()).unwrap();
        // SP coordinates appear in its placemark, at the ring start, and
        // again closing the LinearRing.
        assert_eq!(text.matches("31,50.5,0").count(), 3);
    }

    #[test]
    fn test_writer_escapes_site_name() {
        let mut export = square_export();
        export.site_name = "Plot <7> & \"Annex\"".to_string();
        let text = KmlWriter.write(&export).unwrap();
        assert!(text.contains("<name>Plot &lt;7&gt; &amp; &quot;Annex&quot;</name>"));
    }

    #[test]
    fn test_round_trip_point_names() {
        let text = KmlWriter.write(&square_export()).unwrap();
        let points = KmlReader.parse(&text).unwrap();
        let names: Vec<_> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["LM", "SP", "TP1", "TP2", "TP3"]);
        assert!(points.iter().all(|p| p.space == CoordSpace::Geographic));
    }

    #[test]
    fn test_reader_walks_folders() {
        let content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
<Document>
  <Folder>
    <name>site</name>
    <Placemark><name>SP</name><Point><coordinates>31.0,50.5,0</coordinates></Point></Placemark>
    <Placemark><name>no geometry</name></Placemark>
  </Folder>
  <Placemark><name>TP1</name><Point><coordinates>31.01,50.51,0</coordinates></Point></Placemark>
</Document>
</kml>"#;
        let points = KmlReader.parse(content).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "SP");
        assert_eq!(points[0].coords, [31.0, 50.5]);
        assert_eq!(points[1].name, "TP1");
    }

    #[test]
    fn test_reader_rejects_invalid_xml() {
        assert!(KmlReader.parse("<kml><unclosed").is_err());
    }
}
