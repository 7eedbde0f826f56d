use crate::config::RenderConfig;
use crate::projection::Albers;
use crate::state::{AppState, View};
use crate::types::County;
use anyhow::{Context, Result};
use geo::{CoordsIter, LineString, MultiPolygon};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const DEFAULT_FILL: &str = "#e5e7eb";

/// Writes the current view of `state` to an SVG file.
pub fn render_to_file(state: &AppState, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write_state(&mut writer, state)?;
    writer.flush()?;
    info!(path = ?path, "Wrote SVG");
    Ok(())
}

pub fn render_svg(state: &AppState) -> Result<String> {
    let mut buf = Vec::new();
    write_state(&mut buf, state)?;
    String::from_utf8(buf).context("SVG output is not UTF-8")
}

fn write_state(writer: &mut impl Write, state: &AppState) -> Result<()> {
    write_svg(writer, &state.view(), state.counties(), state.projection(), state.render_config())
}

pub fn write_svg(
    writer: &mut impl Write,
    view: &View,
    counties: &[County],
    projection: &Albers,
    config: &RenderConfig,
) -> Result<()> {
    write_header(writer, config)?;
    write_styles(writer, config.transition_ms)?;

    writeln!(writer, r#"<text id="header" x="20" y="40" style="fill:{}">{}</text>"#,
        escape(&view.header.color), escape(&view.header.text))?;

    writeln!(writer, r#"<g class="counties">"#)?;
    for (county, county_view) in counties.iter().zip(&view.counties) {
        let name = escape(&county.name);
        let style = county_view.fill.as_ref()
            .map(|fill| format!(r#" style="fill:{}""#, escape(fill)))
            .unwrap_or_default();
        writeln!(writer, r#"<path class="county" id="{name}" data-county="{name}" d="{}"{style}><title>{}</title></path>"#,
            multipolygon_to_path(&county.geometry, projection),
            escape(&county_view.tooltip))?;
    }
    writeln!(writer, "</g>")?;

    write_legend(writer, view, config)?;
    writeln!(writer, "</svg>")?;
    Ok(())
}

fn write_header(writer: &mut impl Write, config: &RenderConfig) -> Result<()> {
    let (width, height) = (config.width, config.height);
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg" id="map" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"##)?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

fn write_styles(writer: &mut impl Write, transition_ms: u64) -> Result<()> {
    writeln!(writer, r##"<defs>
<style>
    #header {{ font: bold 20px sans-serif; transition: fill {transition_ms}ms; }}
    .county {{ fill: {DEFAULT_FILL}; stroke: grey; stroke-width: 0.5; transition: fill {transition_ms}ms; }}
    .swatch {{ transition: fill {transition_ms}ms; }}
    .legend text {{ font-size: 10px; fill: grey; font-family: sans-serif; }}
</style>
</defs>"##)?;
    Ok(())
}

fn write_legend(writer: &mut impl Write, view: &View, config: &RenderConfig) -> Result<()> {
    let [x, y] = config.legend_origin;
    writeln!(writer, r#"<g class="legend" transform="translate({x}, {y})">"#)?;
    for (i, color) in view.legend.swatches.iter().enumerate() {
        writeln!(writer, r#"<rect class="swatch" id="legend-swatch-{i}" x="5" y="{}" width="10" height="10" style="fill:{}"/>"#,
            20 * i + 5, escape(color))?;
    }
    for (i, label) in view.legend.labels.iter().enumerate() {
        writeln!(writer, r#"<text id="legend-label-{i}" x="20" y="{}" text-anchor="start">{}</text>"#,
            20 * i + 14, escape(label))?;
    }
    writeln!(writer, r#"<text id="legend-title" x="37.5" y="-5" text-anchor="middle">{}</text>"#,
        escape(&view.legend.title))?;
    writeln!(writer, r#"<rect width="75" height="100" x="0" y="0" fill="none" stroke="grey"/>"#)?;
    writeln!(writer, "</g>")?;
    Ok(())
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
fn multipolygon_to_path(shape: &MultiPolygon<f64>, projection: &Albers) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        ring_to_path(polygon.exterior(), projection, &mut out);
        for interior in polygon.interiors() {
            ring_to_path(interior, projection, &mut out);
        }
    }

    out
}

/// Append a ring as an SVG subpath: "M x,y L x,y ... Z"
fn ring_to_path(ring: &LineString<f64>, projection: &Albers, out: &mut String) {
    let mut coords = ring.coords_iter().map(|coord| projection.project_coord(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!("M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }
}

/// Escapes text for SVG/HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
