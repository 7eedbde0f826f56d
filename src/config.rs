use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub population_csv: PathBuf,
    #[serde(default = "default_population_key")]
    pub population_key: String,
    #[serde(default = "default_population_value")]
    pub population_value: String,
    pub students_csv: PathBuf,
    #[serde(default = "default_students_key")]
    pub students_key: String,
    #[serde(default = "default_students_value")]
    pub students_value: String,
    pub geometry: PathBuf, // GeoJSON or Shapefile
    #[serde(default = "default_name_property")]
    pub name_property: String,
}

fn default_population_key() -> String { "Region".to_string() }
fn default_population_value() -> String { "Pop_2016".to_string() }
fn default_students_key() -> String { "County".to_string() }
fn default_students_value() -> String { "Total".to_string() }
fn default_name_property() -> String { "NAME_1".to_string() }

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    /// Duration of the repaint transition after a selection change.
    pub transition_ms: u64,
    /// Upper bound appended to the quantile thresholds for the last legend bucket.
    pub legend_cap: f64,
    pub legend_origin: [f64; 2],
    pub projection: ProjectionConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 1000.0,
            transition_ms: 1000,
            legend_cap: 1_000_000.0,
            legend_origin: [400.0, 100.0],
            projection: ProjectionConfig::default(),
        }
    }
}

/// Conic equal-area settings, in degrees except for `scale` and `offset`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProjectionConfig {
    pub center: [f64; 2],
    pub rotate: f64,
    pub parallels: [f64; 2],
    pub scale: f64,
    /// Pixel offset of the projected center from the middle of the canvas.
    pub offset: [f64; 2],
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 55.4],
            rotate: 4.4,
            parallels: [50.0, 60.0],
            scale: 6000.0,
            offset: [0.0, -250.0],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub svg: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { svg: PathBuf::from("ireland.svg") }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AppConfig::from_toml(r#"
[input]
population_csv = "pop.csv"
students_csv = "students.csv"
geometry = "Ireland.json"
"#).unwrap();

        assert_eq!(config.input.population_key, "Region");
        assert_eq!(config.input.students_value, "Total");
        assert_eq!(config.input.name_property, "NAME_1");
        assert_eq!(config.render.transition_ms, 1000);
        assert_eq!(config.render.legend_cap, 1_000_000.0);
        assert_eq!(config.render.projection.parallels, [50.0, 60.0]);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn integer_render_values_parse_as_floats() {
        let config = AppConfig::from_toml(r#"
[input]
population_csv = "pop.csv"
students_csv = "students.csv"
geometry = "Ireland.json"

[render]
width = 800
height = 600
legend_origin = [10, 20]

[render.projection]
scale = 5000
"#).unwrap();

        assert_eq!(config.render.width, 800.0);
        assert_eq!(config.render.legend_origin, [10.0, 20.0]);
        assert_eq!(config.render.projection.scale, 5000.0);
        assert_eq!(config.render.projection.rotate, 4.4);
    }

    #[test]
    fn missing_input_section_is_an_error() {
        assert!(AppConfig::from_toml("[server]\nport = 8080\n").is_err());
    }
}
