//! Runtime value types for Glich
//!
//! Values form a closed tagged union. Every binary operator is an
//! in-place mutating method on the left operand that consumes the right,
//! and every operator begins by propagating errors: error-in, error-out,
//! with the left error winning when both operands are errors.

use std::cmp::Ordering;
use std::fmt;

use crate::field::{
    fld_add, fld_div, fld_mod, fld_mul, fld_negate, fld_sub, is_finite, Field, F_INVALID,
    F_MAXIMUM, F_MINIMUM,
};
use crate::range::{
    rlist_complement, rlist_intersection, rlist_negated, rlist_rel_complement, rlist_shifted,
    rlist_symmetric, rlist_union, well_order, Range, RangeList,
};

/// Runtime values in Glich
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value
    Null,

    /// A first-class error carrying its message
    Error(String),

    /// Boolean value
    Bool(bool),

    /// Plain integer
    Number(i64),

    /// Day count or calendar component, with sentinels
    Field(Field),

    /// Floating point value
    Float(f64),

    /// Text value
    String(String),

    /// Inclusive day-count range
    Range(Range),

    /// Well-ordered list of ranges
    RangeList(RangeList),

    /// Script object: slot 0 is always the type code string
    Object(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Error(_) => "error",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Field(_) => "field",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Range(_) => "range",
            Value::RangeList(_) => "rlist",
            Value::Object(_) => "object",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// An error value with a plain message.
    pub fn error(msg: impl Into<String>) -> Value {
        Value::Error(msg.into())
    }

    /// Reduce a range-like value to its minimal form: an empty list
    /// becomes the invalid field, a single range becomes that range, and
    /// a degenerate range becomes a field.
    pub fn demote(self) -> Value {
        match self {
            Value::RangeList(list) => match list.len() {
                0 => Value::Field(F_INVALID),
                1 => Value::Range(list[0]).demote(),
                _ => Value::RangeList(list),
            },
            Value::Range(r) if r.beg == r.end => Value::Field(r.beg),
            v => v,
        }
    }

    /// Strict boolean accessor: anything but a bool is an error.
    pub fn get_bool(&self) -> Result<bool, String> {
        match self {
            Value::Bool(b) => Ok(*b),
            v => Err(format!("expected boolean, got {}", v.type_name())),
        }
    }

    /// Convert to a plain integer; fields must be finite.
    pub fn get_number(&self) -> Result<i64, String> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Field(f) if is_finite(*f) => Ok(*f),
            Value::Field(_) => Err("field sentinel has no number value".to_string()),
            v => Err(format!("expected number, got {}", v.type_name())),
        }
    }

    /// Convert to a field; numbers convert freely.
    pub fn get_field(&self) -> Result<Field, String> {
        match self {
            Value::Field(f) => Ok(*f),
            Value::Number(n) => Ok(*n),
            v => Err(format!("expected field, got {}", v.type_name())),
        }
    }

    /// Promote a range-like value to a well-ordered range list. The
    /// invalid field promotes to the empty list (the demotion inverse).
    pub fn get_rlist(&self) -> Result<RangeList, String> {
        match self {
            Value::Field(f) if *f == F_INVALID => Ok(Vec::new()),
            Value::Field(f) => Ok(vec![Range::point(*f)]),
            Value::Number(n) => Ok(vec![Range::point(*n)]),
            Value::Range(r) => Ok(vec![*r]),
            Value::RangeList(list) => Ok(list.clone()),
            v => Err(format!("expected range-like value, got {}", v.type_name())),
        }
    }

    /// Lowest day count covered by a range-like value.
    pub fn get_low(&self) -> Result<Field, String> {
        match self {
            Value::Range(r) => Ok(r.beg),
            Value::RangeList(list) => Ok(list.first().map(|r| r.beg).unwrap_or(F_INVALID)),
            v => v.get_field(),
        }
    }

    /// Highest day count covered by a range-like value.
    pub fn get_high(&self) -> Result<Field, String> {
        match self {
            Value::Range(r) => Ok(r.end),
            Value::RangeList(list) => Ok(list.last().map(|r| r.end).unwrap_or(F_INVALID)),
            v => v.get_field(),
        }
    }

    // Propagate errors into the left operand; returns true if either
    // operand was an error and the operation should stop there.
    fn op_error(&mut self, rhs: &Value) -> bool {
        if self.is_error() {
            return true;
        }
        if let Value::Error(e) = rhs {
            *self = Value::Error(e.clone());
            return true;
        }
        false
    }

    fn type_error(&mut self, op: &str, rhs: &Value) {
        *self = Value::error(format!(
            "cannot apply '{}' to {} and {}",
            op,
            self.type_name(),
            rhs.type_name()
        ));
    }

    /// Addition. Strings concatenate (either side being a string renders
    /// the other to text); range-like values shift by a field amount.
    pub fn plus(&mut self, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        *self = match (std::mem::replace(self, Value::Null), rhs) {
            (Value::String(a), b) => Value::String(a + &b.to_string()),
            (a, Value::String(b)) => Value::String(a.to_string() + &b),
            (Value::Number(a), Value::Number(b)) => match a.checked_add(b) {
                Some(s) => Value::Number(s),
                None => Value::error("number overflow in '+'"),
            },
            (Value::Number(a), Value::Field(b)) => Value::Field(fld_add(a, b)),
            (Value::Field(a), Value::Number(b)) => Value::Field(fld_add(a, b)),
            (Value::Field(a), Value::Field(b)) => Value::Field(fld_add(a, b)),
            (Value::Float(a), Value::Float(b)) => Value::Float(a + b),
            (Value::Float(a), Value::Number(b)) => Value::Float(a + b as f64),
            (Value::Number(a), Value::Float(b)) => Value::Float(a as f64 + b),
            (Value::Range(r), b) | (b, Value::Range(r)) if b.get_field().is_ok() => {
                let by = b.get_field().unwrap();
                Value::Range(r.shifted(by)).demote()
            }
            (Value::RangeList(list), b) | (b, Value::RangeList(list))
                if b.get_field().is_ok() =>
            {
                let by = b.get_field().unwrap();
                Value::RangeList(rlist_shifted(&list, by)).demote()
            }
            (mut a, b) => {
                a.type_error("+", &b);
                a
            }
        };
    }

    /// Subtraction; range-like values shift backward.
    pub fn minus(&mut self, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        *self = match (std::mem::replace(self, Value::Null), rhs) {
            (Value::Number(a), Value::Number(b)) => match a.checked_sub(b) {
                Some(s) => Value::Number(s),
                None => Value::error("number overflow in '-'"),
            },
            (Value::Number(a), Value::Field(b)) => Value::Field(fld_sub(a, b)),
            (Value::Field(a), Value::Number(b)) => Value::Field(fld_sub(a, b)),
            (Value::Field(a), Value::Field(b)) => Value::Field(fld_sub(a, b)),
            (Value::Float(a), Value::Float(b)) => Value::Float(a - b),
            (Value::Float(a), Value::Number(b)) => Value::Float(a - b as f64),
            (Value::Number(a), Value::Float(b)) => Value::Float(a as f64 - b),
            (Value::Range(r), b) if b.get_field().is_ok() => {
                Value::Range(r.shifted(fld_negate(b.get_field().unwrap()))).demote()
            }
            (Value::RangeList(list), b) if b.get_field().is_ok() => {
                Value::RangeList(rlist_shifted(&list, fld_negate(b.get_field().unwrap())))
                    .demote()
            }
            (mut a, b) => {
                a.type_error("-", &b);
                a
            }
        };
    }

    pub fn multiply(&mut self, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        *self = match (std::mem::replace(self, Value::Null), rhs) {
            (Value::Number(a), Value::Number(b)) => match a.checked_mul(b) {
                Some(p) => Value::Number(p),
                None => Value::error("number overflow in '*'"),
            },
            (Value::Number(a), Value::Field(b)) => Value::Field(fld_mul(a, b)),
            (Value::Field(a), Value::Number(b)) => Value::Field(fld_mul(a, b)),
            (Value::Field(a), Value::Field(b)) => Value::Field(fld_mul(a, b)),
            (Value::Float(a), Value::Float(b)) => Value::Float(a * b),
            (Value::Float(a), Value::Number(b)) => Value::Float(a * b as f64),
            (Value::Number(a), Value::Float(b)) => Value::Float(a as f64 * b),
            (mut a, b) => {
                a.type_error("*", &b);
                a
            }
        };
    }

    /// The `/` operator: numeric operands promote to float.
    pub fn divide(&mut self, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        let a = match self {
            Value::Float(f) => *f,
            Value::Number(n) => *n as f64,
            _ => {
                let r = rhs;
                self.type_error("/", &r);
                return;
            }
        };
        let b = match rhs {
            Value::Float(f) => f,
            Value::Number(n) => n as f64,
            b => {
                self.type_error("/", &b);
                return;
            }
        };
        *self = if b == 0.0 {
            Value::error("division by zero")
        } else {
            Value::Float(a / b)
        };
    }

    /// Euclidean integer division (`div`).
    pub fn int_div(&mut self, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        *self = match (std::mem::replace(self, Value::Null), rhs) {
            (Value::Number(a), Value::Number(b)) => {
                if b == 0 {
                    Value::error("division by zero")
                } else {
                    Value::Number(a.div_euclid(b))
                }
            }
            (Value::Field(a), b) if b.get_field().is_ok() => {
                // Field division keeps the field domain; by-zero becomes
                // an error value rather than the invalid sentinel.
                let d = fld_div(a, b.get_field().unwrap());
                if d == F_INVALID && a != F_INVALID {
                    Value::error("division by zero")
                } else {
                    Value::Field(d)
                }
            }
            (mut a, b) => {
                a.type_error("div", &b);
                a
            }
        };
    }

    /// Euclidean remainder (`mod`), paired with `div`.
    pub fn int_mod(&mut self, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        *self = match (std::mem::replace(self, Value::Null), rhs) {
            (Value::Number(a), Value::Number(b)) => {
                if b == 0 {
                    Value::error("division by zero")
                } else {
                    Value::Number(a.rem_euclid(b))
                }
            }
            (Value::Field(a), b) if b.get_field().is_ok() => {
                let m = fld_mod(a, b.get_field().unwrap());
                if m == F_INVALID && a != F_INVALID {
                    Value::error("division by zero")
                } else {
                    Value::Field(m)
                }
            }
            (mut a, b) => {
                a.type_error("mod", &b);
                a
            }
        };
    }

    /// The `..` operator: the enclosing range of both operands.
    pub fn range_op(&mut self, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        let (lo1, hi1) = match (self.get_low(), self.get_high()) {
            (Ok(l), Ok(h)) => (l, h),
            _ => {
                self.type_error("..", &rhs);
                return;
            }
        };
        let (lo2, hi2) = match (rhs.get_low(), rhs.get_high()) {
            (Ok(l), Ok(h)) => (l, h),
            _ => {
                self.type_error("..", &rhs);
                return;
            }
        };
        if lo1 == F_INVALID || lo2 == F_INVALID {
            *self = Value::Field(F_INVALID);
            return;
        }
        let beg = lo1.min(lo2).min(hi1).min(hi2);
        let end = lo1.max(lo2).max(hi1).max(hi2);
        *self = Value::Range(Range { beg, end }).demote();
    }

    fn set_op(&mut self, op: &str, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        let a = match self.get_rlist() {
            Ok(a) => well_order(a),
            Err(_) => {
                self.type_error(op, &rhs);
                return;
            }
        };
        let b = match rhs.get_rlist() {
            Ok(b) => well_order(b),
            Err(_) => {
                self.type_error(op, &rhs);
                return;
            }
        };
        let out = match op {
            "|" => rlist_union(&a, &b),
            "&" => rlist_intersection(&a, &b),
            "\\" => rlist_rel_complement(&a, &b),
            "^" => rlist_symmetric(&a, &b),
            _ => unreachable!("unknown set operator"),
        };
        *self = Value::RangeList(out).demote();
    }

    /// Set union `|`.
    pub fn union(&mut self, rhs: Value) {
        self.set_op("|", rhs);
    }

    /// Set intersection `&`.
    pub fn intersection(&mut self, rhs: Value) {
        self.set_op("&", rhs);
    }

    /// Set relative complement `\`.
    pub fn rel_complement(&mut self, rhs: Value) {
        self.set_op("\\", rhs);
    }

    /// Set symmetric difference `^`.
    pub fn symmetric(&mut self, rhs: Value) {
        self.set_op("^", rhs);
    }

    /// Unary `~`: complement within the full timeline.
    pub fn complement(&mut self) {
        if self.is_error() {
            return;
        }
        match self.get_rlist() {
            Ok(list) => {
                *self = Value::RangeList(rlist_complement(&well_order(list))).demote();
            }
            Err(e) => *self = Value::Error(e),
        }
    }

    /// Unary minus.
    pub fn negate(&mut self) {
        if self.is_error() {
            return;
        }
        *self = match std::mem::replace(self, Value::Null) {
            Value::Number(n) => Value::Number(-n),
            Value::Field(f) => Value::Field(fld_negate(f)),
            Value::Float(f) => Value::Float(-f),
            Value::Range(r) => {
                Value::Range(Range::new(fld_negate(r.end), fld_negate(r.beg))).demote()
            }
            Value::RangeList(list) => Value::RangeList(rlist_negated(&list)).demote(),
            v => Value::error(format!("cannot negate {}", v.type_name())),
        };
    }

    /// Logical `not`.
    pub fn logical_not(&mut self) {
        if self.is_error() {
            return;
        }
        *self = match self.get_bool() {
            Ok(b) => Value::Bool(!b),
            Err(e) => Value::Error(e),
        };
    }

    pub fn logical_and(&mut self, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        *self = match (self.get_bool(), rhs.get_bool()) {
            (Ok(a), Ok(b)) => Value::Bool(a && b),
            (Err(e), _) | (_, Err(e)) => Value::Error(e),
        };
    }

    pub fn logical_or(&mut self, rhs: Value) {
        if self.op_error(&rhs) {
            return;
        }
        *self = match (self.get_bool(), rhs.get_bool()) {
            (Ok(a), Ok(b)) => Value::Bool(a || b),
            (Err(e), _) | (_, Err(e)) => Value::Error(e),
        };
    }

    /// Equality test used by `=` and `<>`. Number and field compare via
    /// conversion; null is non-equal to any non-null value; other
    /// cross-variant combinations are errors.
    pub fn value_eq(&self, rhs: &Value) -> Result<bool, String> {
        match (self, rhs) {
            (Value::Null, Value::Null) => Ok(true),
            (Value::Null, _) | (_, Value::Null) => Ok(false),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Number(a), Value::Number(b)) => Ok(a == b),
            (Value::Field(a), Value::Field(b)) => Ok(a == b),
            (Value::Number(_), Value::Field(_)) | (Value::Field(_), Value::Number(_)) => {
                Ok(self.get_number()? == rhs.get_number()?)
            }
            (Value::Float(a), Value::Float(b)) => Ok(a == b),
            (Value::String(a), Value::String(b)) => Ok(a == b),
            (Value::Range(a), Value::Range(b)) => Ok(a == b),
            (Value::RangeList(a), Value::RangeList(b)) => Ok(a == b),
            (Value::Object(a), Value::Object(b)) => Ok(a == b),
            _ => Err(format!(
                "cannot compare {} with {}",
                self.type_name(),
                rhs.type_name()
            )),
        }
    }

    /// Ordering test used by `< <= > >=`.
    pub fn value_cmp(&self, rhs: &Value) -> Result<Ordering, String> {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(a.cmp(b)),
            (Value::Field(a), Value::Field(b)) => Ok(a.cmp(b)),
            (Value::Number(_), Value::Field(_)) | (Value::Field(_), Value::Number(_)) => {
                Ok(self.get_number()?.cmp(&rhs.get_number()?))
            }
            (Value::Float(a), Value::Float(b)) => {
                a.partial_cmp(b).ok_or_else(|| "cannot order nan".to_string())
            }
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            _ => Err(format!(
                "cannot order {} with {}",
                self.type_name(),
                rhs.type_name()
            )),
        }
    }
}

/// Render a field value, using the sentinel spellings.
pub fn fld_to_string(f: Field) -> String {
    match f {
        F_INVALID => "?".to_string(),
        F_MINIMUM => "-infinity".to_string(),
        F_MAXIMUM => "+infinity".to_string(),
        _ => f.to_string(),
    }
}

fn range_to_string(r: &Range) -> String {
    if r.beg == r.end {
        fld_to_string(r.beg)
    } else {
        format!("{}..{}", fld_to_string(r.beg), fld_to_string(r.end))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Error(msg) => write!(f, "Error: {}", msg),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Field(fd) => write!(f, "{}", fld_to_string(*fd)),
            Value::Float(x) => {
                if x.is_nan() {
                    write!(f, "nan")
                } else if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Range(r) => write!(f, "{}", range_to_string(r)),
            Value::RangeList(list) => {
                if list.is_empty() {
                    return write!(f, "empty");
                }
                let parts: Vec<String> = list.iter().map(range_to_string).collect();
                write!(f, "{}", parts.join(" | "))
            }
            Value::Object(vals) => {
                write!(f, "{{")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match v {
                        Value::String(s) if i > 0 => write!(f, "\"{}\"", s)?,
                        v => write!(f, "{}", v)?,
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_propagation_binary() {
        let ops: Vec<fn(&mut Value, Value)> = vec![
            Value::plus,
            Value::minus,
            Value::multiply,
            Value::divide,
            Value::int_div,
            Value::int_mod,
            Value::range_op,
            Value::union,
            Value::intersection,
            Value::rel_complement,
            Value::symmetric,
            Value::logical_and,
            Value::logical_or,
        ];
        for op in ops {
            let mut left = Value::error("left");
            op(&mut left, Value::Number(1));
            assert_eq!(left, Value::error("left"));

            let mut right = Value::Number(1);
            op(&mut right, Value::error("right"));
            assert_eq!(right, Value::error("right"));

            // Left error wins when both operands are errors.
            let mut both = Value::error("left");
            op(&mut both, Value::error("right"));
            assert_eq!(both, Value::error("left"));
        }
    }

    #[test]
    fn test_field_saturation_through_ops() {
        let mut v = Value::Field(F_MAXIMUM);
        v.plus(Value::Number(100));
        assert_eq!(v, Value::Field(F_MAXIMUM));
        let mut v = Value::Field(F_INVALID);
        v.minus(Value::Field(7));
        assert_eq!(v, Value::Field(F_INVALID));
    }

    #[test]
    fn test_demotion() {
        let one = Value::RangeList(vec![Range::new(5, 5)]).demote();
        assert_eq!(one, Value::Field(5));
        let single = Value::RangeList(vec![Range::new(5, 9)]).demote();
        assert_eq!(single, Value::Range(Range::new(5, 9)));
        let none = Value::RangeList(vec![]).demote();
        assert_eq!(none, Value::Field(F_INVALID));
        // Idempotence
        assert_eq!(one.clone().demote(), one);
        assert_eq!(single.clone().demote(), single);
        assert_eq!(none.clone().demote(), none);
    }

    #[test]
    fn test_string_concat() {
        let mut v = Value::String("x=".to_string());
        v.plus(Value::Number(5));
        assert_eq!(v, Value::String("x=5".to_string()));
        let mut v = Value::Number(5);
        v.plus(Value::String("!".to_string()));
        assert_eq!(v, Value::String("5!".to_string()));
    }

    #[test]
    fn test_range_operator() {
        let mut v = Value::Field(10);
        v.range_op(Value::Field(3));
        assert_eq!(v, Value::Range(Range::new(3, 10)));
        let mut v = Value::Range(Range::new(1, 5));
        v.range_op(Value::Field(9));
        assert_eq!(v, Value::Range(Range::new(1, 9)));
    }

    #[test]
    fn test_set_ops_demote() {
        let mut v = Value::Range(Range::new(1, 10));
        v.intersection(Value::Range(Range::new(5, 20)));
        assert_eq!(v, Value::Range(Range::new(5, 10)));
        // Disjoint intersection demotes the empty result to invalid.
        let mut v = Value::Range(Range::new(1, 2));
        v.intersection(Value::Range(Range::new(5, 6)));
        assert_eq!(v, Value::Field(F_INVALID));
    }

    #[test]
    fn test_equality_rules() {
        assert_eq!(Value::Number(3).value_eq(&Value::Field(3)), Ok(true));
        assert_eq!(Value::Null.value_eq(&Value::Number(1)), Ok(false));
        assert!(Value::Number(3).value_eq(&Value::String("3".into())).is_err());
        assert!(Value::Field(F_MAXIMUM).value_eq(&Value::Number(1)).is_err());
    }

    #[test]
    fn test_rendering() {
        assert_eq!(Value::Field(F_MAXIMUM).to_string(), "+infinity");
        assert_eq!(Value::Field(F_INVALID).to_string(), "?");
        assert_eq!(Value::RangeList(vec![]).to_string(), "empty");
        assert_eq!(
            Value::RangeList(vec![Range::new(1, 2), Range::new(4, 4)]).to_string(),
            "1..2 | 4"
        );
        assert_eq!(
            Value::Range(Range::new(F_MINIMUM, 1756)).to_string(),
            "-infinity..1756"
        );
    }
}
