use crate::config::InputConfig;
use crate::geometry::reverse_winding;
use crate::types::{County, CountyValues, LoadState};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use shapefile::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

/// The three independently loaded inputs.
#[derive(Debug, Default)]
pub struct Sources {
    pub population: LoadState<CountyValues>,
    pub students: LoadState<CountyValues>,
    pub counties: LoadState<Vec<County>>,
}

/// Runs the three loads side by side. A failed load is logged and reported as
/// `LoadState::Failed`; it never aborts the other two.
pub async fn load_sources(input: &InputConfig) -> Sources {
    let (population, students, counties) = tokio::join!(
        load_population(input),
        load_students(input),
        load_geometry(input),
    );
    Sources { population, students, counties }
}

pub async fn load_population(input: &InputConfig) -> LoadState<CountyValues> {
    let path = input.population_csv.clone();
    let key = input.population_key.clone();
    let value = input.population_value.clone();
    spawn_load("population", move || load_county_values(&path, &key, &value)).await
}

pub async fn load_students(input: &InputConfig) -> LoadState<CountyValues> {
    let path = input.students_csv.clone();
    let key = input.students_key.clone();
    let value = input.students_value.clone();
    spawn_load("students", move || load_county_values(&path, &key, &value)).await
}

pub async fn load_geometry(input: &InputConfig) -> LoadState<Vec<County>> {
    let path = input.geometry.clone();
    let name_property = input.name_property.clone();
    spawn_load("geometry", move || load_counties(&path, &name_property)).await
}

async fn spawn_load<T, F>(source: &'static str, load: F) -> LoadState<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(load).await {
        Ok(Ok(value)) => {
            info!(source, "Source loaded");
            LoadState::Loaded(value)
        }
        Ok(Err(e)) => {
            let reason = format!("{e:#}");
            warn!(source, error = %reason, "Source failed to load");
            LoadState::Failed(reason)
        }
        Err(e) => {
            warn!(source, error = %e, "Source loader panicked");
            LoadState::Failed(e.to_string())
        }
    }
}

/// Reads one numeric column of a CSV file keyed by another column.
pub fn load_county_values(path: &Path, key_column: &str, value_column: &str) -> Result<CountyValues> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    // Keys are joined to geometry names exactly, so only the value is trimmed
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(file);
    let headers = rdr.headers()?.clone();

    let key_idx = headers.iter().position(|h| h == key_column)
        .ok_or_else(|| anyhow!("Key column '{}' not found in {:?}", key_column, path))?;
    let value_idx = headers.iter().position(|h| h == value_column)
        .ok_or_else(|| anyhow!("Value column '{}' not found in {:?}", value_column, path))?;

    let mut values = HashMap::new();

    for result in rdr.records() {
        let record = result.with_context(|| format!("Malformed row in {:?}", path))?;
        let county = record.get(key_idx).unwrap_or("");
        if county.is_empty() { continue; }

        let raw = record.get(value_idx).unwrap_or("");
        match parse_number(raw) {
            Some(value) => { values.insert(county.to_string(), value); }
            None => warn!(county, value = raw, column = value_column, "Skipping unparseable value"),
        }
    }

    debug!(path = ?path, rows = values.len(), "Parsed county values");
    Ok(values)
}

/// Parses a float after stripping thousands separators.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Loads county boundaries (GeoJSON or Shapefile) with every ring reversed.
pub fn load_counties(path: &Path, name_property: &str) -> Result<Vec<County>> {
    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Input geometry file has no extension"))?;

    let mut counties = match extension.as_str() {
        "shp" => load_shapefile(path, name_property)?,
        "json" | "geojson" => load_geojson(path, name_property)?,
        _ => return Err(anyhow!("Unsupported geometry format: {}", extension)),
    };

    for county in &mut counties {
        reverse_winding(&mut county.geometry);
    }

    info!(counties = counties.len(), "Loaded county geometry");
    Ok(counties)
}

fn load_geojson(path: &Path, name_property: &str) -> Result<Vec<County>> {
    use geojson::GeoJson;
    use std::io::BufReader;

    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let geojson = GeoJson::from_reader(BufReader::new(file)).context("Failed to parse GeoJSON")?;
    counties_from_geojson(geojson, name_property)
}

pub fn counties_from_geojson(geojson: geojson::GeoJson, name_property: &str) -> Result<Vec<County>> {
    use geojson::GeoJson;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let mut counties = Vec::new();

    for feature in collection.features {
        let name = match feature.property(name_property) {
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => {
                warn!(property = name_property, "Skipping feature without a county name");
                continue;
            }
        };

        let Some(geometry) = feature.geometry else { continue };
        let geometry: geo::Geometry<f64> = geometry.value.try_into()
            .map_err(|e| anyhow!("Failed to convert geometry for {}: {:?}", name, e))?;

        let geometry = match geometry {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            _ => {
                debug!(county = %name, "Skipping non-polygon feature");
                continue;
            }
        };

        counties.push(County { name, geometry });
    }

    Ok(counties)
}

fn load_shapefile(path: &Path, name_property: &str) -> Result<Vec<County>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let mut counties = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let name = match record.get(name_property) {
            // dbf character fields are fixed width and space padded
            Some(shapefile::dbase::FieldValue::Character(Some(s))) => s.trim().to_string(),
            Some(shapefile::dbase::FieldValue::Character(None)) => continue,
            Some(_) => return Err(anyhow!("Shapefile name field '{}' must be a string", name_property)),
            None => return Err(anyhow!("Name field '{}' not found in Shapefile", name_property)),
        };

        let geometry: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygon for {}: {:?}", name, e))?,
            shapefile::Shape::PolygonM(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM for {}: {:?}", name, e))?,
            shapefile::Shape::PolygonZ(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ for {}: {:?}", name, e))?,
            _ => continue,
        };

        counties.push(County { name, geometry });
    }

    Ok(counties)
}
