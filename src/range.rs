//! Ranges and range lists
//!
//! A range is an inclusive pair of day counts; a range list is an
//! ascending, non-overlapping sequence of ranges ("well ordered").
//! Set algebra is defined over well-ordered lists: union and complement
//! are primitive, the rest follow by De Morgan.

use crate::field::{fld_negate, Field, F_INVALID, F_MAXIMUM, F_MINIMUM};

/// An inclusive range of field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub beg: Field,
    pub end: Field,
}

impl Range {
    /// Create a range, swapping the operands if given out of order.
    pub fn new(a: Field, b: Field) -> Self {
        if a <= b {
            Self { beg: a, end: b }
        } else {
            Self { beg: b, end: a }
        }
    }

    /// A single-day range.
    pub fn point(f: Field) -> Self {
        Self { beg: f, end: f }
    }

    /// True if either end is the invalid sentinel.
    pub fn is_invalid(&self) -> bool {
        self.beg == F_INVALID || self.end == F_INVALID
    }

    pub fn contains(&self, f: Field) -> bool {
        f >= self.beg && f <= self.end
    }

    /// Shift both ends by a field amount, saturating.
    pub fn shifted(&self, by: Field) -> Self {
        Range {
            beg: crate::field::fld_add(self.beg, by),
            end: crate::field::fld_add(self.end, by),
        }
    }
}

/// An ordered sequence of ranges. Only well-ordered lists are stored in
/// values; intermediate results may be unordered until normalized.
pub type RangeList = Vec<Range>;

/// Normalize a list of ranges: drop invalid ranges, sort ascending and
/// merge overlapping or adjacent neighbors.
pub fn well_order(mut list: RangeList) -> RangeList {
    list.retain(|r| !r.is_invalid());
    list.sort_by(|a, b| a.beg.cmp(&b.beg).then(a.end.cmp(&b.end)));
    let mut out: RangeList = Vec::with_capacity(list.len());
    for r in list {
        match out.last_mut() {
            // Adjacent ranges merge: end + 1 touching beg leaves no gap.
            Some(last) if r.beg <= last.end.saturating_add(1) => {
                if r.end > last.end {
                    last.end = r.end;
                }
            }
            _ => out.push(r),
        }
    }
    out
}

/// Union of two well-ordered lists.
pub fn rlist_union(a: &RangeList, b: &RangeList) -> RangeList {
    let mut all = a.clone();
    all.extend_from_slice(b);
    well_order(all)
}

/// Complement of a well-ordered list within the full timeline.
pub fn rlist_complement(a: &RangeList) -> RangeList {
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut next_beg = F_MINIMUM;
    for r in a {
        if r.beg > next_beg {
            out.push(Range { beg: next_beg, end: r.beg - 1 });
        }
        if r.end == F_MAXIMUM {
            return out;
        }
        next_beg = r.end + 1;
    }
    out.push(Range { beg: next_beg, end: F_MAXIMUM });
    out
}

/// Intersection, via De Morgan over union and complement.
pub fn rlist_intersection(a: &RangeList, b: &RangeList) -> RangeList {
    rlist_complement(&rlist_union(&rlist_complement(a), &rlist_complement(b)))
}

/// Relative complement: members of `a` not in `b`.
pub fn rlist_rel_complement(a: &RangeList, b: &RangeList) -> RangeList {
    rlist_intersection(a, &rlist_complement(b))
}

/// Symmetric difference: members of exactly one of `a`, `b`.
pub fn rlist_symmetric(a: &RangeList, b: &RangeList) -> RangeList {
    rlist_union(&rlist_rel_complement(a, b), &rlist_rel_complement(b, a))
}

/// Shift every range in the list, saturating, then re-normalize.
pub fn rlist_shifted(a: &RangeList, by: Field) -> RangeList {
    well_order(a.iter().map(|r| r.shifted(by)).collect())
}

/// Reflect every range through zero, reversing the list order.
pub fn rlist_negated(a: &RangeList) -> RangeList {
    well_order(
        a.iter()
            .map(|r| Range::new(fld_negate(r.end), fld_negate(r.beg)))
            .collect(),
    )
}
