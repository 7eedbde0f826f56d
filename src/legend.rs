use crate::format::add_commas;
use crate::scale::QuantileScale;
use crate::types::Statistic;
use serde::Serialize;

/// What the legend panel shows for one statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub swatches: Vec<String>,
    pub labels: Vec<String>,
}

impl Legend {
    /// `cap` is appended to the scale's thresholds to bound the last bucket.
    pub fn from_scale(statistic: Statistic, scale: &QuantileScale, cap: f64) -> Self {
        let labels = if scale.quantiles().is_empty() {
            vec!["no data".to_string(); scale.range().len()]
        } else {
            let mut thresholds = scale.quantiles().to_vec();
            thresholds.push(cap);
            bucket_labels(&thresholds, statistic == Statistic::PercentThirdLevel)
        };

        Self {
            title: statistic.legend_title().to_string(),
            swatches: scale.range().to_vec(),
            labels,
        }
    }
}

/// One label per threshold. The last threshold only closes the final bucket,
/// which reads as "and above".
pub fn bucket_labels(thresholds: &[f64], percent: bool) -> Vec<String> {
    let last = thresholds.len().saturating_sub(1);
    (0..thresholds.len())
        .map(|i| {
            if percent {
                percent_label(thresholds, i, last)
            } else {
                count_label(thresholds, i, last)
            }
        })
        .collect()
}

fn count_label(thresholds: &[f64], i: usize, last: usize) -> String {
    if i == 0 {
        format!("0 - {}", round(thresholds[0]))
    } else if i < last {
        format!("{} - {}", round(thresholds[i - 1] + 1.0), round(thresholds[i]))
    } else {
        format!(">= {}", add_commas(&round(thresholds[i - 1] + 1.0).to_string()))
    }
}

fn percent_label(thresholds: &[f64], i: usize, last: usize) -> String {
    if i == 0 {
        format!("0 - {:.2}", thresholds[0])
    } else if i < last {
        format!("{:.2} - {:.2}", thresholds[i - 1] + 0.01, thresholds[i])
    } else {
        format!(">= {:.2}", thresholds[i - 1] + 0.01)
    }
}

fn round(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{PU_BU_GN, YL_GN};

    #[test]
    fn count_labels_close_with_and_above() {
        let labels = bucket_labels(&[10.0, 20.0, 30.0, 40.0, 1_000_000.0], false);
        assert_eq!(labels, vec!["0 - 10", "11 - 20", "21 - 30", "31 - 40", ">= 41"]);
    }

    #[test]
    fn count_labels_round_fractional_thresholds() {
        let labels = bucket_labels(&[61.4, 94.5, 145.2, 3120.7, 1_000_000.0], false);
        assert_eq!(labels, vec!["0 - 61", "62 - 95", "96 - 145", "146 - 3121", ">= 3,122"]);
    }

    #[test]
    fn percent_labels_use_two_decimals() {
        let labels = bucket_labels(&[2.5, 2.9, 3.21, 3.6, 1_000_000.0], true);
        assert_eq!(labels, vec!["0 - 2.50", "2.51 - 2.90", "2.91 - 3.21", "3.22 - 3.60", ">= 3.61"]);
    }

    #[test]
    fn legend_follows_scale() {
        let mut scale = QuantileScale::new(&YL_GN);
        scale.set_domain((1..=10).map(|v| f64::from(v) * 10.0));

        let legend = Legend::from_scale(Statistic::Population, &scale, 1_000_000.0);
        assert_eq!(legend.title, "Population in '000s");
        assert_eq!(legend.swatches.len(), 5);
        assert_eq!(legend.labels.len(), 5);
        assert_eq!(legend.labels[0], "0 - 28");
        assert_eq!(legend.labels[4], ">= 83");
    }

    #[test]
    fn legend_without_domain_reads_no_data() {
        let scale = QuantileScale::new(&PU_BU_GN);
        let legend = Legend::from_scale(Statistic::PercentThirdLevel, &scale, 1_000_000.0);
        assert_eq!(legend.title, "% Population in Third Level");
        assert!(legend.labels.iter().all(|l| l == "no data"));
        assert_eq!(legend.swatches[0], "#f6eff7");
    }
}
