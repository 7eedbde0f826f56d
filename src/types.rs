use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// County name -> value for one statistic.
pub type CountyValues = HashMap<String, f64>;

#[derive(Debug, Clone)]
pub struct County {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// The three selectable statistics. Option values match the page's `<select>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Statistic {
    #[serde(rename = "o1")]
    Population,
    #[serde(rename = "o2")]
    #[value(name = "students")]
    ThirdLevelStudents,
    #[serde(rename = "o3")]
    #[value(name = "percent")]
    PercentThirdLevel,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [
        Statistic::Population,
        Statistic::ThirdLevelStudents,
        Statistic::PercentThirdLevel,
    ];

    pub fn option_value(self) -> &'static str {
        match self {
            Statistic::Population => "o1",
            Statistic::ThirdLevelStudents => "o2",
            Statistic::PercentThirdLevel => "o3",
        }
    }

    /// Anything not `o1`/`o3` selects student counts, as the page always has.
    pub fn from_option_value(value: &str) -> Self {
        match value {
            "o1" => Statistic::Population,
            "o3" => Statistic::PercentThirdLevel,
            _ => Statistic::ThirdLevelStudents,
        }
    }

    pub fn option_label(self) -> &'static str {
        match self {
            Statistic::Population => "2016 Population",
            Statistic::ThirdLevelStudents => "Third Level Students",
            Statistic::PercentThirdLevel => "Percent in Third Level",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Statistic::Population => "Ireland's 2016 Population by County",
            Statistic::ThirdLevelStudents => {
                "Ireland's 2016/2017 Third Level (Higher Education) Students by County of Origin"
            }
            Statistic::PercentThirdLevel => {
                "Ireland's 2016/2017 Percent of County Population in Third Level"
            }
        }
    }

    pub fn legend_title(self) -> &'static str {
        match self {
            Statistic::Population => "Population in '000s",
            Statistic::ThirdLevelStudents => "Third Level Students",
            Statistic::PercentThirdLevel => "% Population in Third Level",
        }
    }
}

/// Readiness of one asynchronously loaded source.
#[derive(Debug, Clone, Default)]
pub enum LoadState<T> {
    #[default]
    Pending,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            LoadState::Pending => "pending",
            LoadState::Loaded(_) => "loaded",
            LoadState::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_values_round_trip() {
        for statistic in Statistic::ALL {
            assert_eq!(Statistic::from_option_value(statistic.option_value()), statistic);
        }
        assert_eq!(Statistic::from_option_value("o2"), Statistic::ThirdLevelStudents);
        assert_eq!(Statistic::from_option_value("anything"), Statistic::ThirdLevelStudents);
    }

    #[test]
    fn statistic_serializes_as_option_value() {
        let json = serde_json::to_string(&Statistic::PercentThirdLevel).unwrap();
        assert_eq!(json, "\"o3\"");
        let parsed: Statistic = serde_json::from_str("\"o1\"").unwrap();
        assert_eq!(parsed, Statistic::Population);
    }

    #[test]
    fn load_state_readiness() {
        let pending: LoadState<u32> = LoadState::default();
        assert!(!pending.is_ready());
        assert_eq!(pending.loaded(), None);
        assert_eq!(LoadState::Loaded(3).loaded(), Some(&3));
        assert_eq!(LoadState::<u32>::Failed("gone".into()).status(), "failed");
    }
}
