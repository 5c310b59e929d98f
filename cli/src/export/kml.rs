//! KML output: one styled polygon and one labelled point per overlap.

use std::fmt::Write;

use anyhow::Result;
use nfer_core::{GeoPoint, ResolvedOverlap};

/// Most references that may be claimed in a single activation.
pub const MAX_CLAIMABLE: usize = 5;

const OVER_LIMIT_NOTE: &str = "<b>Please note that no more than 5 references may be claimed in one activation. Pick your favourite 5 if activating here!</b>";

/// Fill and outline colors (aabbggrr) for an N-fer.
pub fn style_colors(count: usize) -> (&'static str, &'static str) {
    match count {
        3 => ("9900ff00", "ff00ff00"),
        4 => ("99ff0000", "ffff0000"),
        5 => ("9900ffff", "ff00ffff"),
        _ => ("990000ff", "ff0000ff"),
    }
}

/// HTML description listing the contributors.
pub fn description(result: &ResolvedOverlap) -> String {
    let mut lines: Vec<String> = result.contributors.iter().map(|c| c.label()).collect();
    if result.count() > MAX_CLAIMABLE {
        lines.push(OVER_LIMIT_NOTE.to_string());
    }
    lines.join("<br/>")
}

pub fn render(results: &[ResolvedOverlap]) -> Result<String> {
    let mut kml = String::new();
    writeln!(kml, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(kml, r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#)?;
    writeln!(kml, "<Document>")?;

    for result in results {
        let (fill, line) = style_colors(result.count());

        writeln!(kml, "  <Placemark>")?;
        writeln!(kml, "    <Style>")?;
        writeln!(kml, "      <LineStyle><color>{}</color></LineStyle>", line)?;
        writeln!(kml, "      <PolyStyle><color>{}</color></PolyStyle>", fill)?;
        writeln!(kml, "    </Style>")?;
        writeln!(kml, "    <Polygon>")?;
        writeln!(kml, "      <outerBoundaryIs><LinearRing><coordinates>")?;
        writeln!(kml, "        {}", coordinates(&result.boundary))?;
        writeln!(kml, "      </coordinates></LinearRing></outerBoundaryIs>")?;
        writeln!(kml, "    </Polygon>")?;
        writeln!(kml, "  </Placemark>")?;

        writeln!(kml, "  <Placemark>")?;
        writeln!(kml, "    <name>{}</name>", xml_escape(&result.label()))?;
        writeln!(kml, "    <description>{}</description>", xml_escape(&description(result)))?;
        writeln!(kml, "    <Point><coordinates>{}</coordinates></Point>", coordinates(&[result.point]))?;
        writeln!(kml, "  </Placemark>")?;
    }

    writeln!(kml, "</Document>")?;
    writeln!(kml, "</kml>")?;
    Ok(kml)
}

/// KML `lon,lat,alt` tuples separated by spaces.
fn coordinates(points: &[GeoPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{},{},0", p.lon, p.lat))
        .collect::<Vec<_>>()
        .join(" ")
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
