use crate::types::Statistic;

/// ColorBrewer YlGn, 5 classes.
pub const YL_GN: [&str; 5] = ["#ffffcc", "#c2e699", "#78c679", "#31a354", "#006837"];
/// ColorBrewer RdPu, 5 classes.
pub const RD_PU: [&str; 5] = ["#feebe2", "#fbb4b9", "#f768a1", "#c51b8a", "#7a0177"];
/// ColorBrewer PuBuGn, 5 classes.
pub const PU_BU_GN: [&str; 5] = ["#f6eff7", "#bdc9e1", "#67a9cf", "#1c9099", "#016c59"];

/// Maps values to a fixed palette so each color covers about the same number
/// of observations. Outliers stay in the domain.
#[derive(Debug, Clone)]
pub struct QuantileScale {
    domain: Vec<f64>,
    range: Vec<String>,
    thresholds: Vec<f64>,
}

impl QuantileScale {
    pub fn new(range: &[&str]) -> Self {
        Self {
            domain: Vec::new(),
            range: range.iter().map(|c| c.to_string()).collect(),
            thresholds: Vec::new(),
        }
    }

    /// Replaces the domain with every observed value, outliers included.
    /// Non-finite values are dropped.
    pub fn set_domain<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = f64>,
    {
        let mut domain: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        domain.sort_by(f64::total_cmp);
        self.domain = domain;
        self.rescale();
    }

    fn rescale(&mut self) {
        let n = self.range.len().max(1);
        self.thresholds = if self.domain.is_empty() {
            Vec::new()
        } else {
            (1..n).map(|i| quantile_sorted(&self.domain, i as f64 / n as f64)).collect()
        };
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    pub fn range(&self) -> &[String] {
        &self.range
    }

    /// The `range.len() - 1` bucket boundaries; empty until a domain is set.
    pub fn quantiles(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn has_domain(&self) -> bool {
        !self.domain.is_empty()
    }

    /// Color for a value; `None` for a missing value or an unset domain.
    pub fn color(&self, value: Option<f64>) -> Option<&str> {
        let value = value.filter(|v| !v.is_nan())?;
        if !self.has_domain() {
            return None;
        }
        let bucket = self.thresholds.partition_point(|t| *t <= value);
        self.range.get(bucket).map(String::as_str)
    }
}

/// Linear-interpolated quantile of sorted values (R-7, as d3 computes it).
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            if p <= 0.0 { return sorted[0]; }
            if p >= 1.0 { return sorted[len - 1]; }
            let h = (len - 1) as f64 * p;
            let i = h.floor() as usize;
            let lo = sorted[i];
            let hi = sorted[i + 1];
            lo + (hi - lo) * (h - i as f64)
        }
    }
}

/// One scale per statistic.
#[derive(Debug, Clone)]
pub struct ColorScales {
    pub population: QuantileScale,
    pub students: QuantileScale,
    pub percent: QuantileScale,
}

impl Default for ColorScales {
    fn default() -> Self {
        Self {
            population: QuantileScale::new(&YL_GN),
            students: QuantileScale::new(&RD_PU),
            percent: QuantileScale::new(&PU_BU_GN),
        }
    }
}

impl ColorScales {
    pub fn get(&self, statistic: Statistic) -> &QuantileScale {
        match statistic {
            Statistic::Population => &self.population,
            Statistic::ThirdLevelStudents => &self.students,
            Statistic::PercentThirdLevel => &self.percent,
        }
    }

    pub fn get_mut(&mut self, statistic: Statistic) -> &mut QuantileScale {
        match statistic {
            Statistic::Population => &mut self.population,
            Statistic::ThirdLevelStudents => &mut self.students,
            Statistic::PercentThirdLevel => &mut self.percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn five_colors_give_four_monotone_thresholds() {
        let mut scale = QuantileScale::new(&YL_GN);
        scale.set_domain([32.0, 1347.0, 542.0, 80.0, 61.0, 145.0, 118.0, 94.0, 39.0, 1347.0]);

        let thresholds = scale.quantiles();
        assert_eq!(thresholds.len(), 4);
        assert!(thresholds.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn thresholds_interpolate_like_d3() {
        let mut scale = QuantileScale::new(&YL_GN);
        scale.set_domain((1..=10).map(f64::from));

        let expected = [2.8, 4.6, 6.4, 8.2];
        for (got, want) in scale.quantiles().iter().zip(expected) {
            assert!(close(*got, want), "{got} != {want}");
        }
    }

    #[test]
    fn colors_bucket_by_threshold() {
        let mut scale = QuantileScale::new(&YL_GN);
        scale.set_domain((1..=10).map(f64::from));

        assert_eq!(scale.color(Some(1.0)), Some("#ffffcc"));
        assert_eq!(scale.color(Some(3.0)), Some("#c2e699"));
        assert_eq!(scale.color(Some(5.0)), Some("#78c679"));
        assert_eq!(scale.color(Some(10.0)), Some("#006837"));
        // Outliers land in the last bucket
        assert_eq!(scale.color(Some(1e9)), Some("#006837"));
    }

    #[test]
    fn unset_domain_or_missing_value_has_no_color() {
        let scale = QuantileScale::new(&RD_PU);
        assert!(scale.quantiles().is_empty());
        assert_eq!(scale.color(Some(10.0)), None);

        let mut scale = scale;
        scale.set_domain([1.0, 2.0, f64::NAN]);
        assert_eq!(scale.domain(), &[1.0, 2.0]);
        assert_eq!(scale.color(None), None);
        assert_eq!(scale.color(Some(f64::NAN)), None);
    }

    #[test]
    fn reassigning_domain_rescales() {
        let mut scale = QuantileScale::new(&PU_BU_GN);
        scale.set_domain([1.0, 2.0, 3.0, 4.0, 5.0]);
        let before = scale.quantiles().to_vec();
        scale.set_domain([10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_ne!(before, scale.quantiles());
        assert!(close(scale.quantiles()[0], 18.0));
    }

    #[test]
    fn quantile_edges() {
        assert!(quantile_sorted(&[], 0.5).is_nan());
        assert_eq!(quantile_sorted(&[7.0], 0.2), 7.0);
        assert_eq!(quantile_sorted(&[1.0, 3.0], 0.0), 1.0);
        assert_eq!(quantile_sorted(&[1.0, 3.0], 1.0), 3.0);
        assert_eq!(quantile_sorted(&[1.0, 3.0], 0.5), 2.0);
    }

    #[test]
    fn each_statistic_has_its_own_palette() {
        let scales = ColorScales::default();
        assert_eq!(scales.get(Statistic::Population).range()[3], "#31a354");
        assert_eq!(scales.get(Statistic::ThirdLevelStudents).range()[3], "#c51b8a");
        assert_eq!(scales.get(Statistic::PercentThirdLevel).range()[3], "#1c9099");
    }
}
