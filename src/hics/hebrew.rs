//! Hebrew calendar
//!
//! The traditional arithmetic lunisolar calendar: a 19-year leap cycle,
//! molad computation in parts (1/25920 day), and the postponement rules
//! that keep new year off forbidden weekdays. Months are numbered from
//! Nisan; the year changes at month 7 (Tishri).

use crate::field::Field;
use crate::hics::math::min_search;

const HEBREW_EPOCH: Field = 347998;

pub fn hebrew_is_leap(year: Field) -> bool {
    (7 * year + 1).rem_euclid(19) < 7
}

pub fn hebrew_last_month(year: Field) -> Field {
    if hebrew_is_leap(year) {
        13
    } else {
        12
    }
}

/// Days from the epoch to the molad of Tishri of `year`, before the
/// postponement rules.
fn elapsed_days(year: Field) -> Field {
    let months = (235 * year - 234).div_euclid(19);
    let parts = 12084 + 13753 * months;
    let day = 29 * months + parts.div_euclid(25920);
    if (3 * (day + 1)).rem_euclid(7) < 3 {
        day + 1
    } else {
        day
    }
}

/// Postponement needed to avoid an over-length adjacent year.
fn new_year_delay(year: Field) -> Field {
    let ny0 = elapsed_days(year - 1);
    let ny1 = elapsed_days(year);
    let ny2 = elapsed_days(year + 1);
    if ny2 - ny1 == 356 {
        2
    } else if ny1 - ny0 == 382 {
        1
    } else {
        0
    }
}

/// Day count of 1 Tishri of `year`.
fn new_year(year: Field) -> Field {
    HEBREW_EPOCH + elapsed_days(year) + new_year_delay(year)
}

pub fn hebrew_year_length(year: Field) -> Field {
    new_year(year + 1) - new_year(year)
}

fn long_marheshvan(year: Field) -> bool {
    matches!(hebrew_year_length(year), 355 | 385)
}

fn short_kislev(year: Field) -> bool {
    matches!(hebrew_year_length(year), 353 | 383)
}

pub fn hebrew_month_length(year: Field, month: Field) -> Field {
    let short = matches!(month, 2 | 4 | 6 | 10 | 13)
        || (month == 12 && !hebrew_is_leap(year))
        || (month == 8 && !long_marheshvan(year))
        || (month == 9 && short_kislev(year));
    if short {
        29
    } else {
        30
    }
}

pub fn hebrew_to_jdn(year: Field, month: Field, day: Field) -> Field {
    let mut jdn = new_year(year) + day - 1;
    if month < 7 {
        // Months of the spring half follow the whole autumn half.
        for m in 7..=hebrew_last_month(year) {
            jdn += hebrew_month_length(year, m);
        }
        for m in 1..month {
            jdn += hebrew_month_length(year, m);
        }
    } else {
        for m in 7..month {
            jdn += hebrew_month_length(year, m);
        }
    }
    jdn
}

pub fn hebrew_from_jdn(jdn: Field) -> (Field, Field, Field) {
    let approx = (jdn - HEBREW_EPOCH) * 98496 / 35975351 + 1;
    let year = min_search(approx - 1, |y| new_year(y + 1) > jdn)
        .expect("hebrew year estimate off by more than the scan cap");
    let start = if jdn < hebrew_to_jdn(year, 1, 1) { 7 } else { 1 };
    let month = min_search(start, |m| {
        jdn <= hebrew_to_jdn(year, m, hebrew_month_length(year, m))
    })
    .expect("day count outside the hebrew year located for it");
    let day = jdn - hebrew_to_jdn(year, month, 1) + 1;
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_dates() {
        // 1 Tishri 5784 was 16 September 2023.
        assert_eq!(hebrew_to_jdn(5784, 7, 1), 2460204);
        // 15 Nisan 5784 (Passover) was 23 April 2024.
        assert_eq!(hebrew_to_jdn(5784, 1, 15), 2460424);
    }

    #[test]
    fn test_round_trip() {
        for jdn in [347998, 2000000, 2451545, 2460204, 2460424] {
            let (y, m, d) = hebrew_from_jdn(jdn);
            assert_eq!(hebrew_to_jdn(y, m, d), jdn, "at jdn {}", jdn);
        }
    }

    #[test]
    fn test_leap_cycle() {
        // Leap years of the cycle are 3, 6, 8, 11, 14, 17, 19.
        let leaps: Vec<Field> = (5774..5793).filter(|&y| hebrew_is_leap(y)).collect();
        assert_eq!(leaps, vec![5774, 5776, 5779, 5782, 5784, 5787, 5790]);
    }

    #[test]
    fn test_year_lengths_valid() {
        for y in 5700..5800 {
            let len = hebrew_year_length(y);
            assert!(
                matches!(len, 353 | 354 | 355 | 383 | 384 | 385),
                "year {} has length {}",
                y,
                len
            );
        }
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!(hebrew_month_length(5784, 2), 29);
        assert_eq!(hebrew_month_length(5784, 7), 30);
        // Adar I exists only in leap years and is long.
        assert!(hebrew_is_leap(5784));
        assert_eq!(hebrew_month_length(5784, 12), 30);
        assert_eq!(hebrew_month_length(5784, 13), 29);
        assert_eq!(hebrew_month_length(5783, 12), 29);
    }
}
