use crate::config::RenderConfig;
use crate::data::Sources;
use crate::format::tooltip;
use crate::index::CountyIndex;
use crate::legend::Legend;
use crate::metrics::{percent_in_third_level, percent_of_population};
use crate::projection::Albers;
use crate::scale::ColorScales;
use crate::types::{County, CountyValues, LoadState, Statistic};
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountyView {
    pub name: String,
    /// `None` paints the default fill.
    pub fill: Option<String>,
    pub tooltip: String,
}

/// Everything a repaint needs after a selection change.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub statistic: Statistic,
    pub header: Header,
    pub counties: Vec<CountyView>,
    pub legend: Legend,
    pub transition_ms: u64,
}

/// All three statistics for one county, for the hover lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyStats {
    pub name: String,
    pub population: Option<f64>,
    pub students: Option<f64>,
    pub percent: Option<f64>,
}

/// Loaded data, color scales and the current selection.
pub struct AppState {
    population: LoadState<CountyValues>,
    students: LoadState<CountyValues>,
    counties: LoadState<Vec<County>>,
    percent: CountyValues,
    scales: ColorScales,
    index: CountyIndex,
    active: Statistic,
    render: RenderConfig,
    projection: Albers,
}

impl AppState {
    /// A state with every source still pending.
    pub fn new(render: RenderConfig) -> Result<Self> {
        let projection = Albers::from_render(&render)?;
        Ok(Self {
            population: LoadState::Pending,
            students: LoadState::Pending,
            counties: LoadState::Pending,
            percent: CountyValues::new(),
            scales: ColorScales::default(),
            index: CountyIndex::default(),
            active: Statistic::Population,
            render,
            projection,
        })
    }

    pub fn from_sources(sources: Sources, render: RenderConfig) -> Result<Self> {
        let mut state = Self::new(render)?;
        state.set_population(sources.population);
        state.set_students(sources.students);
        state.set_counties(sources.counties);
        Ok(state)
    }

    pub fn set_population(&mut self, population: LoadState<CountyValues>) {
        if let Some(values) = population.loaded() {
            self.scales.population.set_domain(values.values().copied());
            let scale = &self.scales.population;
            debug!(observed = scale.domain().len(), thresholds = ?scale.quantiles(), "Population scale domain set");
        }
        self.population = population;
        self.refresh_percent_if_active();
    }

    pub fn set_students(&mut self, students: LoadState<CountyValues>) {
        if let Some(values) = students.loaded() {
            self.scales.students.set_domain(values.values().copied());
            let scale = &self.scales.students;
            debug!(observed = scale.domain().len(), thresholds = ?scale.quantiles(), "Student scale domain set");
        }
        self.students = students;
        self.refresh_percent_if_active();
    }

    pub fn set_counties(&mut self, counties: LoadState<Vec<County>>) {
        if let Some(counties) = counties.loaded() {
            self.index = CountyIndex::build(counties);
            debug!(indexed = self.index.len(), "County index built");
        }
        self.counties = counties;
    }

    pub fn active(&self) -> Statistic {
        self.active
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    pub fn projection(&self) -> &Albers {
        &self.projection
    }

    pub fn counties(&self) -> &[County] {
        self.counties.loaded().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn percent_values(&self) -> &CountyValues {
        &self.percent
    }

    pub fn scales(&self) -> &ColorScales {
        &self.scales
    }

    /// One-word readiness per source, in load order.
    pub fn source_status(&self) -> [(&'static str, &'static str); 3] {
        [
            ("population", self.population.status()),
            ("students", self.students.status()),
            ("geometry", self.counties.status()),
        ]
    }

    /// Switches the active statistic and returns the repaint for it.
    ///
    /// Selecting the percent statistic recomputes it from whatever population
    /// and student data is loaded and reassigns the percent scale's domain.
    pub fn select(&mut self, statistic: Statistic) -> View {
        info!(statistic = statistic.option_value(), "Selection changed");
        self.active = statistic;
        if statistic == Statistic::PercentThirdLevel {
            self.refresh_percent();
        }
        self.view()
    }

    fn refresh_percent_if_active(&mut self) {
        if self.active == Statistic::PercentThirdLevel {
            self.refresh_percent();
        }
    }

    fn refresh_percent(&mut self) {
        if !(self.students.is_ready() && self.population.is_ready()) {
            debug!(
                students = self.students.status(),
                population = self.population.status(),
                "Percent computed before both sources loaded",
            );
        }
        let empty = CountyValues::new();
        let students = self.students.loaded().unwrap_or(&empty);
        let population = self.population.loaded().unwrap_or(&empty);
        self.percent = percent_in_third_level(students, population);
        self.scales
            .get_mut(Statistic::PercentThirdLevel)
            .set_domain(self.percent.values().copied());
        debug!(counties = self.percent.len(), "Percent in third level recomputed");
    }

    /// Values behind a statistic, if its sources are ready.
    fn values(&self, statistic: Statistic) -> Option<&CountyValues> {
        match statistic {
            Statistic::Population => self.population.loaded(),
            Statistic::ThirdLevelStudents => self.students.loaded(),
            Statistic::PercentThirdLevel => Some(&self.percent),
        }
    }

    pub fn view(&self) -> View {
        let statistic = self.active;
        let scale = self.scales.get(statistic);
        let values = self.values(statistic);

        let counties = self.counties().iter()
            .map(|county| {
                let value = values.and_then(|v| v.get(&county.name)).copied();
                CountyView {
                    name: county.name.clone(),
                    fill: scale.color(value).map(str::to_string),
                    tooltip: tooltip(statistic, &county.name, value),
                }
            })
            .collect();

        View {
            statistic,
            header: Header {
                text: statistic.header().to_string(),
                color: scale.range().get(3).cloned().unwrap_or_default(),
            },
            counties,
            legend: Legend::from_scale(statistic, scale, self.render.legend_cap),
            transition_ms: self.render.transition_ms,
        }
    }

    /// Statistics for the county under (lon, lat), if any.
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<CountyStats> {
        let counties = self.counties();
        let county = &counties[self.index.locate(counties, lon, lat)?];
        let population = self.population.loaded().and_then(|v| v.get(&county.name)).copied();
        let students = self.students.loaded().and_then(|v| v.get(&county.name)).copied();
        let percent = match (students, population) {
            (Some(s), Some(p)) => Some(percent_of_population(s, p)).filter(|v| v.is_finite()),
            _ => None,
        };
        Some(CountyStats { name: county.name.clone(), population, students, percent })
    }
}
