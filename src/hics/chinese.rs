//! Chinese lunisolar calendar
//!
//! Months begin at new moons observed in Chinese standard time and a
//! leap month repeats the first month of its sui that contains no major
//! solar term. Dates carry five fields: cycle, year (1..=60 within the
//! sexagesimal cycle), month, leap flag and day.

use crate::field::Field;
use crate::hics::astro::{
    day_from_jdn, estimate_prior_solar_longitude, jdn_from_moment, new_moon_at_or_after,
    new_moon_before, solar_longitude, MEAN_SYNODIC_MONTH, MEAN_TROPICAL_YEAR,
};
use crate::hics::julian::gregorian_from_jdn;
use crate::hics::math::min_search;

/// Day count of the calendar epoch, 15 February -2636 Gregorian.
const CHINESE_EPOCH: Field = 758326;

const WINTER: f64 = 270.0;

/// Chinese civil time zone as a fraction of a day. Before 1929 the
/// Beijing mean longitude was used, afterwards UTC+8.
fn chinese_zone(t: f64) -> f64 {
    let (year, _, _) = gregorian_from_jdn(jdn_from_moment(t));
    if year < 1929 {
        (1397.0 / 180.0) / 24.0
    } else {
        8.0 / 24.0
    }
}

/// Universal moment of civil midnight beginning the given day.
fn midnight_in_china(jdn: Field) -> f64 {
    let t = day_from_jdn(jdn);
    t - chinese_zone(t)
}

/// Day of the first new moon on or after the given day, in civil time.
fn new_moon_day_at_or_after(jdn: Field) -> Field {
    let t = new_moon_at_or_after(midnight_in_china(jdn));
    jdn_from_moment(t + chinese_zone(t))
}

/// Day of the last new moon before the given day, in civil time.
fn new_moon_day_before(jdn: Field) -> Field {
    let t = new_moon_before(midnight_in_china(jdn));
    jdn_from_moment(t + chinese_zone(t))
}

/// Index of the last major solar term (zhongqi) on or before the day.
fn current_major_solar_term(jdn: Field) -> Field {
    let s = solar_longitude(midnight_in_china(jdn));
    let index = 2 + (s / 30.0).floor() as Field;
    (index - 1).rem_euclid(12) + 1
}

/// Day of the winter solstice on or before the given day.
fn winter_solstice_on_or_before(jdn: Field) -> Field {
    let approx = estimate_prior_solar_longitude(WINTER, midnight_in_china(jdn + 1));
    min_search(jdn_from_moment(approx) - 1, |day| {
        solar_longitude(midnight_in_china(day + 1)) >= WINTER
    })
    .expect("solstice estimate off by more than the scan cap")
}

/// True when no major solar term falls in the month starting this day.
fn no_major_solar_term(jdn: Field) -> bool {
    current_major_solar_term(jdn) == current_major_solar_term(new_moon_day_at_or_after(jdn + 1))
}

/// True when a leap month starts on or after day `start` and before or
/// on the month starting at `month_start`.
fn prior_leap_month(start: Field, mut month_start: Field) -> bool {
    while month_start >= start {
        if no_major_solar_term(month_start) {
            return true;
        }
        month_start = new_moon_day_before(month_start);
    }
    false
}

/// New year of the sui (solstice-to-solstice year) containing the day.
fn new_year_in_sui(jdn: Field) -> Field {
    let s1 = winter_solstice_on_or_before(jdn);
    let s2 = winter_solstice_on_or_before(s1 + 370);
    let m12 = new_moon_day_at_or_after(s1 + 1);
    let m13 = new_moon_day_at_or_after(m12 + 1);
    let next_m11 = new_moon_day_before(s2 + 1);
    let months = ((next_m11 - m12) as f64 / MEAN_SYNODIC_MONTH).round() as Field;
    if months == 12 && (no_major_solar_term(m12) || no_major_solar_term(m13)) {
        new_moon_day_at_or_after(m13 + 1)
    } else {
        m13
    }
}

fn new_year_on_or_before(jdn: Field) -> Field {
    let new_year = new_year_in_sui(jdn);
    if jdn >= new_year {
        new_year
    } else {
        new_year_in_sui(jdn - 180)
    }
}

fn amod(x: Field, n: Field) -> Field {
    (x - 1).rem_euclid(n) + 1
}

pub fn chinese_from_jdn(jdn: Field) -> (Field, Field, Field, bool, Field) {
    let s1 = winter_solstice_on_or_before(jdn);
    let s2 = winter_solstice_on_or_before(s1 + 370);
    let m12 = new_moon_day_at_or_after(s1 + 1);
    let next_m11 = new_moon_day_before(s2 + 1);
    let m = new_moon_day_before(jdn + 1);
    let leap_year = ((next_m11 - m12) as f64 / MEAN_SYNODIC_MONTH).round() as Field == 12;
    let mut month = ((m - m12) as f64 / MEAN_SYNODIC_MONTH).round() as Field;
    if leap_year && prior_leap_month(m12, m) {
        month -= 1;
    }
    let month = amod(month, 12);
    let leap_month =
        leap_year && no_major_solar_term(m) && !prior_leap_month(m12, new_moon_day_before(m));
    let elapsed_years = (1.5 - month as f64 / 12.0
        + (jdn - CHINESE_EPOCH) as f64 / MEAN_TROPICAL_YEAR)
        .floor() as Field;
    let cycle = (elapsed_years - 1).div_euclid(60) + 1;
    let year = amod(elapsed_years, 60);
    let day = jdn - m + 1;
    (cycle, year, month, leap_month, day)
}

pub fn chinese_to_jdn(cycle: Field, year: Field, month: Field, leap: bool, day: Field) -> Field {
    let elapsed = (cycle - 1) * 60 + year - 1;
    let mid_year =
        CHINESE_EPOCH + ((elapsed as f64 + 0.5) * MEAN_TROPICAL_YEAR).floor() as Field;
    let new_year = new_year_on_or_before(mid_year);
    let p = new_moon_day_at_or_after(new_year + (month - 1) * 29);
    let (_, _, p_month, p_leap, _) = chinese_from_jdn(p);
    let month_start = if p_month == month && p_leap == leap {
        p
    } else {
        new_moon_day_at_or_after(p + 1)
    };
    month_start + day - 1
}

/// Length in days of the month containing the day.
pub fn chinese_month_length(jdn: Field) -> Field {
    let start = new_moon_day_before(jdn + 1);
    new_moon_day_at_or_after(start + 1) - start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hics::julian::gregorian_to_jdn;

    #[test]
    fn test_new_year_2023() {
        // Chinese New Year 2023 fell on 22 January.
        let jdn = new_year_on_or_before(gregorian_to_jdn(2023, 6, 1));
        assert_eq!(gregorian_from_jdn(jdn), (2023, 1, 22));
    }

    #[test]
    fn test_known_date() {
        // 22 January 2023 began cycle 78, year 40 (guimao), month 1.
        let jdn = gregorian_to_jdn(2023, 1, 22);
        assert_eq!(chinese_from_jdn(jdn), (78, 40, 1, false, 1));
        assert_eq!(chinese_to_jdn(78, 40, 1, false, 1), jdn);
    }

    #[test]
    fn test_leap_month_2023() {
        // 2023 had a leap second month, beginning 22 March.
        let jdn = gregorian_to_jdn(2023, 3, 22);
        let (cycle, year, month, leap, day) = chinese_from_jdn(jdn);
        assert_eq!((cycle, year, month, leap, day), (78, 40, 2, true, 1));
        assert_eq!(chinese_to_jdn(78, 40, 2, true, 1), jdn);
    }

    #[test]
    fn test_round_trip() {
        for g in [(2000, 1, 1), (2023, 8, 19), (1900, 6, 15)] {
            let jdn = gregorian_to_jdn(g.0, g.1, g.2);
            let (c, y, m, l, d) = chinese_from_jdn(jdn);
            assert_eq!(chinese_to_jdn(c, y, m, l, d), jdn, "at {:?}", g);
        }
    }

    #[test]
    fn test_month_lengths() {
        // Lunar months are 29 or 30 days.
        let jdn = gregorian_to_jdn(2023, 2, 1);
        let len = chinese_month_length(jdn);
        assert!(len == 29 || len == 30);
    }
}
