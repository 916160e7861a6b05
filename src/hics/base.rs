//! Calendar base dispatch
//!
//! A `Base` converts between the canonical day count and an ordered
//! field tuple, and reports per-field begin/end bounds so that a
//! partial date (leading fields set, trailing fields unset) can be
//! completed to its earliest or latest concrete day.

use crate::field::{Field, F_INVALID};
use crate::range::Range;
use crate::hics::chinese;
use crate::hics::french;
use crate::hics::hebrew;
use crate::hics::hybrid::HybridBase;
use crate::hics::islamic::IslamicVariant;
use crate::hics::isoweek;
use crate::hics::julian;

/// The closed set of calendar systems.
#[derive(Debug, Clone)]
pub enum Base {
    Jdn,
    Julian,
    Gregorian,
    Hebrew,
    Islamic(IslamicVariant),
    Chinese,
    French,
    IsoWeek,
    IsoOrdinal,
    Jwn,
    Hybrid(HybridBase),
}

impl Base {
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Base::Jdn => vec!["day"],
            Base::Julian | Base::Gregorian | Base::Hebrew | Base::Islamic(_) | Base::French => {
                vec!["year", "month", "day"]
            }
            Base::Chinese => vec!["cycle", "cyear", "month", "lmonth", "day"],
            Base::IsoWeek => vec!["year", "week", "wday"],
            Base::IsoOrdinal => vec!["year", "day"],
            Base::Jwn => vec!["week", "day"],
            Base::Hybrid(h) => h.field_names(),
        }
    }

    /// Number of fields a full date carries.
    pub fn required(&self) -> usize {
        self.field_names().len()
    }

    /// Day count for a complete field tuple. Any unset or invalid
    /// required field makes the result invalid.
    pub fn get_jdn(&self, fields: &[Field]) -> Field {
        if let Base::Hybrid(h) = self {
            // The era selector alone may be unset.
            if fields.len() < h.field_names().len()
                || fields[1..].iter().any(|&f| f == F_INVALID)
            {
                return F_INVALID;
            }
            return h.get_jdn(fields);
        }
        if fields.len() < self.required() || fields.iter().any(|&f| f == F_INVALID) {
            return F_INVALID;
        }
        match self {
            Base::Jdn => fields[0],
            Base::Julian => julian::julian_to_jdn(fields[0], fields[1], fields[2]),
            Base::Gregorian => julian::gregorian_to_jdn(fields[0], fields[1], fields[2]),
            Base::Hebrew => hebrew::hebrew_to_jdn(fields[0], fields[1], fields[2]),
            Base::Islamic(v) => v.to_jdn(fields[0], fields[1], fields[2]),
            Base::Chinese => {
                chinese::chinese_to_jdn(fields[0], fields[1], fields[2], fields[3] != 0, fields[4])
            }
            Base::French => french::french_to_jdn(fields[0], fields[1], fields[2]),
            Base::IsoWeek => isoweek::isoweek_to_jdn(fields[0], fields[1], fields[2]),
            Base::IsoOrdinal => isoweek::ordinal_to_jdn(fields[0], fields[1]),
            Base::Jwn => isoweek::jwn_to_jdn(fields[0], fields[1]),
            Base::Hybrid(_) => unreachable!(),
        }
    }

    pub fn get_fields(&self, jdn: Field) -> Vec<Field> {
        if jdn == F_INVALID {
            return vec![F_INVALID; self.required()];
        }
        match self {
            Base::Jdn => vec![jdn],
            Base::Julian => {
                let (y, m, d) = julian::julian_from_jdn(jdn);
                vec![y, m, d]
            }
            Base::Gregorian => {
                let (y, m, d) = julian::gregorian_from_jdn(jdn);
                vec![y, m, d]
            }
            Base::Hebrew => {
                let (y, m, d) = hebrew::hebrew_from_jdn(jdn);
                vec![y, m, d]
            }
            Base::Islamic(v) => {
                let (y, m, d) = v.from_jdn(jdn);
                vec![y, m, d]
            }
            Base::Chinese => {
                let (c, y, m, l, d) = chinese::chinese_from_jdn(jdn);
                vec![c, y, m, if l { 1 } else { 0 }, d]
            }
            Base::French => {
                let (y, m, d) = french::french_from_jdn(jdn);
                vec![y, m, d]
            }
            Base::IsoWeek => {
                let (y, w, d) = isoweek::isoweek_from_jdn(jdn);
                vec![y, w, d]
            }
            Base::IsoOrdinal => {
                let (y, d) = isoweek::ordinal_from_jdn(jdn);
                vec![y, d]
            }
            Base::Jwn => {
                let (w, d) = isoweek::jwn_from_jdn(jdn);
                vec![w, d]
            }
            Base::Hybrid(h) => h.get_fields(jdn),
        }
    }

    /// Minimum legal value for the field at `index`, given the earlier
    /// fields already set.
    pub fn get_beg_field_value(&self, fields: &[Field], index: usize) -> Field {
        match self {
            Base::Jdn => F_INVALID,
            Base::Julian | Base::Gregorian | Base::Islamic(_) | Base::French => match index {
                1 | 2 => 1,
                _ => F_INVALID,
            },
            Base::Hebrew => match index {
                // The hebrew year begins with Tishri, month 7.
                1 => 7,
                2 => 1,
                _ => F_INVALID,
            },
            Base::Chinese => match index {
                1 | 2 | 4 => 1,
                3 => 0,
                _ => F_INVALID,
            },
            Base::IsoWeek => match index {
                1 | 2 => 1,
                _ => F_INVALID,
            },
            Base::IsoOrdinal | Base::Jwn => match index {
                1 => 1,
                _ => F_INVALID,
            },
            Base::Hybrid(h) => h.get_beg_field_value(fields, index),
        }
    }

    /// Maximum legal value for the field at `index`, given the earlier
    /// fields already set.
    pub fn get_end_field_value(&self, fields: &[Field], index: usize) -> Field {
        match self {
            Base::Jdn => F_INVALID,
            Base::Julian => match index {
                1 => 12,
                2 => julian::julian_month_length(fields[0], fields[1]),
                _ => F_INVALID,
            },
            Base::Gregorian => match index {
                1 => 12,
                2 => julian::gregorian_month_length(fields[0], fields[1]),
                _ => F_INVALID,
            },
            Base::Hebrew => match index {
                // Elul, month 6, closes the year.
                1 => 6,
                2 => hebrew::hebrew_month_length(fields[0], fields[1]),
                _ => F_INVALID,
            },
            Base::Islamic(v) => match index {
                1 => 12,
                2 => v.month_length(fields[0], fields[1]),
                _ => F_INVALID,
            },
            Base::Chinese => match index {
                1 => 60,
                2 => 12,
                3 => self.chinese_leap_exists(fields),
                4 => {
                    let start = chinese::chinese_to_jdn(
                        fields[0],
                        fields[1],
                        fields[2],
                        fields[3] != 0,
                        1,
                    );
                    chinese::chinese_month_length(start)
                }
                _ => F_INVALID,
            },
            Base::French => match index {
                1 => 13,
                2 => french::french_month_length(fields[0], fields[1]),
                _ => F_INVALID,
            },
            Base::IsoWeek => match index {
                1 => isoweek::isoweek_year_length(fields[0]),
                2 => 7,
                _ => F_INVALID,
            },
            Base::IsoOrdinal => match index {
                1 => isoweek::ordinal_year_length(fields[0]),
                _ => F_INVALID,
            },
            Base::Jwn => match index {
                1 => 7,
                _ => F_INVALID,
            },
            Base::Hybrid(h) => h.get_end_field_value(fields, index),
        }
    }

    /// 1 when the cycle/year/month in `fields` has a leap counterpart.
    fn chinese_leap_exists(&self, fields: &[Field]) -> Field {
        let start = chinese::chinese_to_jdn(fields[0], fields[1], fields[2], true, 1);
        let (c, y, m, leap, _) = chinese::chinese_from_jdn(start);
        if (c, y, m) == (fields[0], fields[1], fields[2]) && leap {
            1
        } else {
            0
        }
    }

    /// Complete a partial date (leading fields set) to the range of
    /// days it covers. Returns an invalid range when no completion
    /// exists.
    pub fn complete_range(&self, fields: &[Field]) -> Range {
        let required = self.required();
        // A full hybrid date with the era selector unset resolves to
        // one era rather than completing the selector to both extremes.
        if let Base::Hybrid(h) = self {
            let selector = fields.first().copied().unwrap_or(F_INVALID);
            let rest_full = (1..required)
                .all(|i| fields.get(i).copied().unwrap_or(F_INVALID) != F_INVALID);
            if selector == F_INVALID && rest_full {
                let jdn = h.get_jdn(fields);
                if jdn == F_INVALID {
                    return Range { beg: F_INVALID, end: F_INVALID };
                }
                return Range::new(jdn, jdn);
            }
        }
        let mut beg = vec![F_INVALID; required];
        let mut end = vec![F_INVALID; required];
        for i in 0..required {
            let set = fields.get(i).copied().unwrap_or(F_INVALID);
            if set != F_INVALID {
                beg[i] = set;
                end[i] = set;
            } else {
                beg[i] = self.get_beg_field_value(&beg, i);
                end[i] = self.get_end_field_value(&end, i);
            }
        }
        let beg_jdn = self.get_jdn(&beg);
        let end_jdn = self.get_jdn(&end);
        if beg_jdn == F_INVALID || end_jdn == F_INVALID {
            Range { beg: F_INVALID, end: F_INVALID }
        } else {
            Range::new(beg_jdn, end_jdn)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_every_base() {
        let bases = [
            Base::Jdn,
            Base::Julian,
            Base::Gregorian,
            Base::Hebrew,
            Base::Islamic(IslamicVariant::IIA),
            Base::French,
            Base::IsoWeek,
            Base::IsoOrdinal,
            Base::Jwn,
        ];
        for base in &bases {
            for jdn in [2400000, 2451545, 2460176] {
                let fields = base.get_fields(jdn);
                assert_eq!(base.get_jdn(&fields), jdn, "{:?} at {}", base, jdn);
            }
        }
    }

    #[test]
    fn test_invalid_field_gives_invalid_jdn() {
        let base = Base::Gregorian;
        assert_eq!(base.get_jdn(&[2023, F_INVALID, 19]), F_INVALID);
        assert_eq!(base.get_jdn(&[2023]), F_INVALID);
    }

    #[test]
    fn test_complete_year_to_range() {
        let base = Base::Gregorian;
        let range = base.complete_range(&[1948]);
        assert_eq!(range.beg, 2432552);
        assert_eq!(range.end, 2432917);
    }

    #[test]
    fn test_complete_month_to_range() {
        let base = Base::Gregorian;
        let range = base.complete_range(&[2030, 5]);
        assert_eq!(range.beg, julian::gregorian_to_jdn(2030, 5, 1));
        assert_eq!(range.end, julian::gregorian_to_jdn(2030, 5, 31));
    }

    #[test]
    fn test_complete_hebrew_year() {
        // A hebrew year runs Tishri through Elul.
        let base = Base::Hebrew;
        let range = base.complete_range(&[5784]);
        assert_eq!(range.beg, hebrew::hebrew_to_jdn(5784, 7, 1));
        assert_eq!(range.end, hebrew::hebrew_to_jdn(5784, 6, 29));
        assert_eq!(range.end - range.beg + 1, hebrew::hebrew_year_length(5784));
    }

    #[test]
    fn test_jdn_base_is_identity() {
        assert_eq!(Base::Jdn.get_jdn(&[2460176]), 2460176);
        assert_eq!(Base::Jdn.get_fields(2460176), vec![2460176]);
    }
}
