use crate::format::round2;
use crate::types::CountyValues;
use tracing::debug;

/// Percent of a county's population (given in thousands) in third level, to two decimals.
pub fn percent_of_population(students: f64, population_thousands: f64) -> f64 {
    round2(students / (population_thousands * 1000.0) * 100.0)
}

/// Derives the percent statistic for every county in `students`.
///
/// Counties with no population entry, or whose result is not finite, are left
/// out so a later lookup sees them as missing.
pub fn percent_in_third_level(students: &CountyValues, population: &CountyValues) -> CountyValues {
    let mut percent = CountyValues::with_capacity(students.len());
    for (county, &count) in students {
        let Some(&pop) = population.get(county) else {
            debug!(county = %county, "No population for county, percent left undefined");
            continue;
        };
        let value = percent_of_population(count, pop);
        if value.is_finite() {
            percent.insert(county.clone(), value);
        }
    }
    percent
}
