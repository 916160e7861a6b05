//! Field arithmetic for Glich
//!
//! A Field is the integer domain shared by day counts and calendar
//! components. Three values are reserved as sentinels: invalid, and the
//! two open ends of the timeline ("past" and "future"). All arithmetic
//! saturates toward the sentinels instead of overflowing.

/// A day count or calendar component value.
pub type Field = i64;

/// The reserved "no value / failed conversion" sentinel.
pub const F_INVALID: Field = i64::MIN;

/// The open past end of the timeline.
pub const F_MINIMUM: Field = i64::MIN + 1;

/// The open future end of the timeline.
pub const F_MAXIMUM: Field = i64::MAX;

/// True for any of the three reserved sentinel values.
pub fn is_sentinel(f: Field) -> bool {
    f == F_INVALID || f == F_MINIMUM || f == F_MAXIMUM
}

/// True for an ordinary (finite, valid) field value.
pub fn is_finite(f: Field) -> bool {
    !is_sentinel(f)
}

/// Saturating field addition. Invalid propagates; opposing infinities
/// cancel to invalid; an infinity absorbs any finite operand.
pub fn fld_add(a: Field, b: Field) -> Field {
    if a == F_INVALID || b == F_INVALID {
        return F_INVALID;
    }
    match (is_finite(a), is_finite(b)) {
        (true, true) => match a.checked_add(b) {
            Some(s) if is_finite(s) => s,
            Some(s) if s > 0 => F_MAXIMUM,
            Some(_) => F_MINIMUM,
            None if a > 0 => F_MAXIMUM,
            None => F_MINIMUM,
        },
        (false, true) => a,
        (true, false) => b,
        (false, false) => {
            if a == b {
                a
            } else {
                F_INVALID
            }
        }
    }
}

/// Saturating field subtraction.
pub fn fld_sub(a: Field, b: Field) -> Field {
    fld_add(a, fld_negate(b))
}

/// Negate a field, swapping the two infinities.
pub fn fld_negate(f: Field) -> Field {
    match f {
        F_INVALID => F_INVALID,
        F_MINIMUM => F_MAXIMUM,
        F_MAXIMUM => F_MINIMUM,
        _ => -f,
    }
}

/// Saturating field multiplication. Zero times an infinity has no
/// meaningful value and yields invalid.
pub fn fld_mul(a: Field, b: Field) -> Field {
    if a == F_INVALID || b == F_INVALID {
        return F_INVALID;
    }
    if is_finite(a) && is_finite(b) {
        return match a.checked_mul(b) {
            Some(p) if is_finite(p) => p,
            Some(p) if p > 0 => F_MAXIMUM,
            Some(_) => F_MINIMUM,
            None if (a > 0) == (b > 0) => F_MAXIMUM,
            None => F_MINIMUM,
        };
    }
    if a == 0 || b == 0 {
        return F_INVALID;
    }
    if (a > 0) == (b > 0) {
        F_MAXIMUM
    } else {
        F_MINIMUM
    }
}

/// Euclidean field division (remainder is never negative).
/// Division by zero or by an infinity yields invalid.
pub fn fld_div(a: Field, b: Field) -> Field {
    if a == F_INVALID || b == F_INVALID || b == 0 || !is_finite(b) {
        return F_INVALID;
    }
    if !is_finite(a) {
        return if (a > 0) == (b > 0) { F_MAXIMUM } else { F_MINIMUM };
    }
    a.div_euclid(b)
}

/// Euclidean field remainder, paired with [`fld_div`].
pub fn fld_mod(a: Field, b: Field) -> Field {
    if a == F_INVALID || b == F_INVALID || b == 0 || !is_finite(a) || !is_finite(b) {
        return F_INVALID;
    }
    a.rem_euclid(b)
}
