//! Julian and Gregorian calendars
//!
//! Arithmetic conversions between year/month/day fields and the day
//! count, shared leap-year and month-length rules, and the begin/end
//! field values used to complete partial dates.

use crate::field::{Field, F_INVALID};

/// Latin month lengths for a common year.
const MONTH_LENGTHS: [Field; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub fn julian_is_leap(year: Field) -> bool {
    year.rem_euclid(4) == 0
}

pub fn gregorian_is_leap(year: Field) -> bool {
    year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
}

/// Length of a month, given the leap status of its year.
fn month_length(month: Field, leap: bool) -> Field {
    if month == 2 && leap {
        29
    } else if (1..=12).contains(&month) {
        MONTH_LENGTHS[(month - 1) as usize]
    } else {
        F_INVALID
    }
}

pub fn julian_month_length(year: Field, month: Field) -> Field {
    month_length(month, julian_is_leap(year))
}

pub fn gregorian_month_length(year: Field, month: Field) -> Field {
    month_length(month, gregorian_is_leap(year))
}

pub fn julian_to_jdn(year: Field, month: Field, day: Field) -> Field {
    let (year, month) = if month < 3 { (year - 1, month + 12) } else { (year, month) };
    day + (153 * (month - 3) + 2) / 5 + 365 * year + year.div_euclid(4) + 1721117
}

pub fn julian_from_jdn(jdn: Field) -> (Field, Field, Field) {
    let c = jdn + 32082;
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2).div_euclid(153);
    let day = e - (153 * m + 2).div_euclid(5) + 1;
    let month = m + 3 - 12 * m.div_euclid(10);
    let year = d - 4800 + m.div_euclid(10);
    (year, month, day)
}

pub fn gregorian_to_jdn(year: Field, month: Field, day: Field) -> Field {
    let (year, month) = if month < 3 { (year - 1, month + 12) } else { (year, month) };
    day + (153 * (month - 3) + 2) / 5 + 365 * year + year.div_euclid(4)
        - year.div_euclid(100)
        + year.div_euclid(400)
        + 1721119
}

pub fn gregorian_from_jdn(jdn: Field) -> (Field, Field, Field) {
    let a = jdn + 32044;
    let b = (4 * a + 3).div_euclid(146097);
    let c = a - (146097 * b).div_euclid(4);
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2).div_euclid(153);
    let day = e - (153 * m + 2).div_euclid(5) + 1;
    let month = m + 3 - 12 * m.div_euclid(10);
    let year = 100 * b + d - 4800 + m.div_euclid(10);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gregorian_round_trip() {
        assert_eq!(gregorian_to_jdn(2000, 1, 1), 2451545);
        assert_eq!(gregorian_from_jdn(2451545), (2000, 1, 1));
        assert_eq!(gregorian_to_jdn(2023, 8, 19), 2460176);
        assert_eq!(gregorian_from_jdn(2460176), (2023, 8, 19));
        assert_eq!(gregorian_to_jdn(1948, 1, 1), 2432552);
        assert_eq!(gregorian_to_jdn(1948, 12, 31), 2432917);
    }

    #[test]
    fn test_julian_gregorian_offset() {
        // The calendars agreed during the third century.
        assert_eq!(julian_to_jdn(200, 3, 1), gregorian_to_jdn(200, 3, 1));
        // Thirteen days apart in the twentieth.
        assert_eq!(julian_to_jdn(1900, 3, 1) - 13, gregorian_to_jdn(1900, 3, 1));
        assert_eq!(julian_from_jdn(julian_to_jdn(1066, 10, 14)), (1066, 10, 14));
    }

    #[test]
    fn test_leap_rules() {
        assert!(julian_is_leap(1900));
        assert!(!gregorian_is_leap(1900));
        assert!(gregorian_is_leap(2000));
        assert!(gregorian_is_leap(-4));
        assert!(!gregorian_is_leap(2023));
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!(gregorian_month_length(2024, 2), 29);
        assert_eq!(gregorian_month_length(2023, 2), 28);
        assert_eq!(julian_month_length(1900, 2), 29);
        assert_eq!(gregorian_month_length(2023, 9), 30);
        assert_eq!(gregorian_month_length(2023, 13), F_INVALID);
    }

    #[test]
    fn test_negative_years() {
        // Day before 1 Jan 1 is 31 Dec 0 in the proleptic calendar.
        let jdn = gregorian_to_jdn(1, 1, 1);
        assert_eq!(gregorian_from_jdn(jdn - 1), (0, 12, 31));
    }
}
