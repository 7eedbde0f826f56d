use crate::types::Statistic;

/// Turns `"1000"` into `"1,000"`. Expects a plain non-negative digit string.
pub fn add_commas(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole number with thousands separators.
pub fn format_count(value: f64) -> String {
    add_commas(&(value.round() as i64).to_string())
}

pub fn tooltip(statistic: Statistic, county: &str, value: Option<f64>) -> String {
    let Some(value) = value else {
        return format!("{county}: no data");
    };
    match statistic {
        // Population is stored in thousands
        Statistic::Population => format!("{county}'s population: {}", format_count(value * 1000.0)),
        Statistic::ThirdLevelStudents => {
            format!("{county}'s third level students: {}", format_count(value))
        }
        Statistic::PercentThirdLevel => format!("{county}'s percent in third level: {value:.2}%"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas_every_three_digits() {
        assert_eq!(add_commas("1000"), "1,000");
        assert_eq!(add_commas("999"), "999");
        assert_eq!(add_commas("1000000"), "1,000,000");
        assert_eq!(add_commas("12345"), "12,345");
        assert_eq!(add_commas("7"), "7");
        assert_eq!(add_commas(""), "");
    }

    #[test]
    fn round2_matches_fixed_two_decimals() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.0), 2.0);
        assert_eq!(round2(0.126), 0.13);
    }

    #[test]
    fn tooltips_per_statistic() {
        assert_eq!(
            tooltip(Statistic::Population, "Dublin", Some(1347.359)),
            "Dublin's population: 1,347,359"
        );
        assert_eq!(
            tooltip(Statistic::ThirdLevelStudents, "Cork", Some(23456.4)),
            "Cork's third level students: 23,456"
        );
        assert_eq!(
            tooltip(Statistic::PercentThirdLevel, "Sligo", Some(3.5)),
            "Sligo's percent in third level: 3.50%"
        );
        assert_eq!(tooltip(Statistic::Population, "Laois", None), "Laois: no data");
    }
}
