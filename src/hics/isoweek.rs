//! ISO 8601 week and ordinal calendars, and the Julian Week Number
//!
//! Weeks run Monday to Sunday. Week 1 of an ISO year is the week
//! containing 4 January, so a day count near the year boundary can
//! belong to the previous or following ISO year. The day count is
//! aligned so that `jdn mod 7 == 0` falls on a Monday.

use crate::field::Field;
use crate::hics::julian::{gregorian_from_jdn, gregorian_is_leap, gregorian_to_jdn};

/// Day count of the Monday beginning week 1 of `year`.
fn week1_monday(year: Field) -> Field {
    let jan4 = gregorian_to_jdn(year, 1, 4);
    jan4 - jan4.rem_euclid(7)
}

pub fn isoweek_to_jdn(year: Field, week: Field, day: Field) -> Field {
    week1_monday(year) + 7 * (week - 1) + day - 1
}

pub fn isoweek_from_jdn(jdn: Field) -> (Field, Field, Field) {
    let (gyear, _, _) = gregorian_from_jdn(jdn);
    let year = if jdn >= week1_monday(gyear + 1) {
        gyear + 1
    } else if jdn < week1_monday(gyear) {
        gyear - 1
    } else {
        gyear
    };
    let week = (jdn - week1_monday(year)).div_euclid(7) + 1;
    let day = jdn.rem_euclid(7) + 1;
    (year, week, day)
}

/// Number of ISO weeks in `year`, 52 or 53.
pub fn isoweek_year_length(year: Field) -> Field {
    (week1_monday(year + 1) - week1_monday(year)).div_euclid(7)
}

pub fn ordinal_to_jdn(year: Field, day: Field) -> Field {
    gregorian_to_jdn(year, 1, 1) + day - 1
}

pub fn ordinal_from_jdn(jdn: Field) -> (Field, Field) {
    let (year, _, _) = gregorian_from_jdn(jdn);
    (year, jdn - gregorian_to_jdn(year, 1, 1) + 1)
}

pub fn ordinal_year_length(year: Field) -> Field {
    if gregorian_is_leap(year) {
        366
    } else {
        365
    }
}

pub fn jwn_to_jdn(week: Field, day: Field) -> Field {
    week * 7 + day - 1
}

pub fn jwn_from_jdn(jdn: Field) -> (Field, Field) {
    (jdn.div_euclid(7), jdn.rem_euclid(7) + 1)
}
