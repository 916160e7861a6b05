//! French Republican calendar
//!
//! The astronomical form: each year begins on the day of the autumnal
//! equinox as observed at the Paris Observatory. Twelve months of
//! thirty days are followed by five or six complementary days, treated
//! here as a thirteenth month.

use crate::field::Field;
use crate::hics::astro::{
    day_from_jdn, estimate_prior_solar_longitude, jdn_from_moment, solar_longitude,
    MEAN_TROPICAL_YEAR,
};
use crate::hics::math::min_search;

/// Day count of 1 Vendemiaire I, 22 September 1792.
const FRENCH_EPOCH: Field = 2375840;

/// Longitude of the Paris Observatory, as a fraction of a circle.
const PARIS_ZONE: f64 = 2.3375 / 360.0;

const AUTUMN: f64 = 180.0;

/// Universal moment of true midnight in Paris ending the given day.
fn midnight_end_of_day(jdn: Field) -> f64 {
    day_from_jdn(jdn) + 1.0 - PARIS_ZONE
}

/// Day of the equinox new year on or before the given day.
fn new_year_on_or_before(jdn: Field) -> Field {
    let approx = estimate_prior_solar_longitude(AUTUMN, midnight_end_of_day(jdn));
    min_search(jdn_from_moment(approx) - 1, |day| {
        let s = solar_longitude(midnight_end_of_day(day));
        (AUTUMN..AUTUMN + 90.0).contains(&s)
    })
    .expect("equinox estimate off by more than the scan cap")
}

pub fn french_to_jdn(year: Field, month: Field, day: Field) -> Field {
    let estimate =
        FRENCH_EPOCH + 180 + (MEAN_TROPICAL_YEAR * (year - 1) as f64).floor() as Field;
    let new_year = new_year_on_or_before(estimate);
    new_year - 1 + 30 * (month - 1) + day
}

pub fn french_from_jdn(jdn: Field) -> (Field, Field, Field) {
    let new_year = new_year_on_or_before(jdn);
    let year = ((new_year - FRENCH_EPOCH) as f64 / MEAN_TROPICAL_YEAR).round() as Field + 1;
    let month = (jdn - new_year).div_euclid(30) + 1;
    let day = (jdn - new_year).rem_euclid(30) + 1;
    (year, month, day)
}

/// Length of a month: 30 for the regular twelve, 5 or 6 for the
/// complementary days depending on the year.
pub fn french_month_length(year: Field, month: Field) -> Field {
    if month < 13 {
        30
    } else {
        french_to_jdn(year + 1, 1, 1) - french_to_jdn(year, 13, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hics::julian::{gregorian_from_jdn, gregorian_to_jdn};

    #[test]
    fn test_epoch() {
        assert_eq!(french_to_jdn(1, 1, 1), FRENCH_EPOCH);
        assert_eq!(gregorian_from_jdn(FRENCH_EPOCH), (1792, 9, 22));
        assert_eq!(french_from_jdn(FRENCH_EPOCH), (1, 1, 1));
    }

    #[test]
    fn test_revolutionary_dates() {
        // 9 Thermidor II, the fall of Robespierre, was 27 July 1794.
        assert_eq!(french_to_jdn(2, 11, 9), gregorian_to_jdn(1794, 7, 27));
        // 18 Brumaire VIII was 9 November 1799.
        assert_eq!(french_to_jdn(8, 2, 18), gregorian_to_jdn(1799, 11, 9));
    }

    #[test]
    fn test_round_trip() {
        for jdn in [FRENCH_EPOCH, 2376900, 2378530, 2460176] {
            let (y, m, d) = french_from_jdn(jdn);
            assert_eq!(french_to_jdn(y, m, d), jdn, "at jdn {}", jdn);
        }
    }

    #[test]
    fn test_complementary_days() {
        for y in 1..=10 {
            let len = french_month_length(y, 13);
            assert!(len == 5 || len == 6, "year {} has {} jours", y, len);
        }
        assert_eq!(french_month_length(3, 1), 30);
    }
}
