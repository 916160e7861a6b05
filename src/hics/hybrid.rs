//! Hybrid composite calendar
//!
//! A hybrid base switches between underlying bases at fixed transition
//! days, modelling historical calendar changes such as the Julian to
//! Gregorian switchover. Field 0 is the era selector ("scheme", 0 for
//! the earliest era); it may be left unset on input, in which case the
//! era table is scanned in order for the first era whose day range
//! contains the converted date. The remaining fields are the union of
//! the underlying bases' fields, cross-referenced by name.

use crate::field::{Field, F_INVALID};
use crate::hics::base::Base;

/// One era of a hybrid calendar.
#[derive(Debug, Clone)]
pub struct HybridEra {
    /// First day this era applies; the first era's start is unbounded.
    pub start: Field,
    pub base: Box<Base>,
    /// Underlying field index to hybrid field index.
    mapping: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct HybridBase {
    field_names: Vec<String>,
    eras: Vec<HybridEra>,
}

impl HybridBase {
    pub fn new(eras: Vec<(Field, Base)>) -> Self {
        let mut field_names = vec!["scheme".to_string()];
        for (_, base) in &eras {
            for name in base.field_names() {
                if !field_names.iter().any(|n| n == name) {
                    field_names.push(name.to_string());
                }
            }
        }
        let eras = eras
            .into_iter()
            .map(|(start, base)| {
                let mapping = base
                    .field_names()
                    .iter()
                    .map(|name| field_names.iter().position(|n| n == name).unwrap())
                    .collect();
                HybridEra { start, base: Box::new(base), mapping }
            })
            .collect();
        Self { field_names, eras }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.field_names.iter().map(String::as_str).collect()
    }

    pub fn era_count(&self) -> usize {
        self.eras.len()
    }

    /// Index of the era whose day range contains the day count.
    fn era_of_jdn(&self, jdn: Field) -> usize {
        let mut index = 0;
        for (i, era) in self.eras.iter().enumerate().skip(1) {
            if jdn >= era.start {
                index = i;
            }
        }
        index
    }

    fn era_contains(&self, index: usize, jdn: Field) -> bool {
        (index == 0 || jdn >= self.eras[index].start)
            && self.eras.get(index + 1).map_or(true, |next| jdn < next.start)
    }

    /// Convert through one era, pulling its fields out of the hybrid
    /// field vector by the name mapping.
    fn era_jdn(&self, index: usize, fields: &[Field]) -> Field {
        let era = &self.eras[index];
        let sub: Vec<Field> = era
            .mapping
            .iter()
            .map(|&hi| fields.get(hi).copied().unwrap_or(F_INVALID))
            .collect();
        era.base.get_jdn(&sub)
    }

    pub fn get_jdn(&self, fields: &[Field]) -> Field {
        let selector = fields.first().copied().unwrap_or(F_INVALID);
        if selector != F_INVALID {
            if selector < 0 || selector as usize >= self.eras.len() {
                return F_INVALID;
            }
            return self.era_jdn(selector as usize, fields);
        }
        for index in 0..self.eras.len() {
            let jdn = self.era_jdn(index, fields);
            if jdn != F_INVALID && self.era_contains(index, jdn) {
                return jdn;
            }
        }
        F_INVALID
    }

    pub fn get_fields(&self, jdn: Field) -> Vec<Field> {
        let index = self.era_of_jdn(jdn);
        let era = &self.eras[index];
        let sub = era.base.get_fields(jdn);
        let mut out = vec![F_INVALID; self.field_names.len()];
        out[0] = index as Field;
        for (si, &hi) in era.mapping.iter().enumerate() {
            if let Some(&value) = sub.get(si) {
                out[hi] = value;
            }
        }
        out
    }

    pub fn get_beg_field_value(&self, fields: &[Field], index: usize) -> Field {
        if index == 0 {
            return 0;
        }
        self.delegate_bound(fields, index, true)
    }

    pub fn get_end_field_value(&self, fields: &[Field], index: usize) -> Field {
        if index == 0 {
            return (self.eras.len() - 1) as Field;
        }
        self.delegate_bound(fields, index, false)
    }

    fn delegate_bound(&self, fields: &[Field], index: usize, beg: bool) -> Field {
        let selector = fields.first().copied().unwrap_or(F_INVALID);
        let era_index = if selector != F_INVALID && (selector as usize) < self.eras.len() {
            selector as usize
        } else {
            0
        };
        let era = &self.eras[era_index];
        let sub_index = match era.mapping.iter().position(|&hi| hi == index) {
            Some(si) => si,
            None => return F_INVALID,
        };
        let sub: Vec<Field> = era
            .mapping
            .iter()
            .map(|&hi| fields.get(hi).copied().unwrap_or(F_INVALID))
            .collect();
        if beg {
            era.base.get_beg_field_value(&sub, sub_index)
        } else {
            era.base.get_end_field_value(&sub, sub_index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hics::julian::gregorian_to_jdn;

    /// English-style hybrid: Julian until 14 September 1752 Gregorian.
    fn english() -> HybridBase {
        let change = gregorian_to_jdn(1752, 9, 14);
        HybridBase::new(vec![(0, Base::Julian), (change, Base::Gregorian)])
    }

    #[test]
    fn test_field_union() {
        let h = english();
        assert_eq!(h.field_names(), vec!["scheme", "year", "month", "day"]);
    }

    #[test]
    fn test_dispatch_by_date() {
        let h = english();
        // The day before the changeover is 2 September 1752 Julian.
        let change = gregorian_to_jdn(1752, 9, 14);
        assert_eq!(h.get_fields(change - 1), vec![0, 1752, 9, 2]);
        assert_eq!(h.get_fields(change), vec![1, 1752, 9, 14]);
    }

    #[test]
    fn test_auto_era_resolution() {
        let h = english();
        use crate::field::F_INVALID;
        // 1 June 1700 parses as Julian; 1 June 1800 as Gregorian.
        let early = h.get_jdn(&[F_INVALID, 1700, 6, 1]);
        assert_eq!(h.get_fields(early)[0], 0);
        let late = h.get_jdn(&[F_INVALID, 1800, 6, 1]);
        assert_eq!(h.get_fields(late)[0], 1);
    }

    #[test]
    fn test_explicit_selector() {
        let h = english();
        let j = h.get_jdn(&[0, 1800, 6, 1]);
        let g = h.get_jdn(&[1, 1800, 6, 1]);
        assert_eq!(g - j, -12);
    }

    #[test]
    fn test_round_trip_across_change() {
        let h = english();
        let change = gregorian_to_jdn(1752, 9, 14);
        for jdn in [change - 400, change - 1, change, change + 400] {
            let fields = h.get_fields(jdn);
            assert_eq!(h.get_jdn(&fields), jdn);
        }
    }
}
