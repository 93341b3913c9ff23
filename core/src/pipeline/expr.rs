//! Computed-field expressions and filter predicates.

use super::document::{get_path, values_at, Document};
use super::sort::{compare_documents, compare_values, SortKey};
use serde_json::{Number, Value};
use std::{cmp::Ordering, fmt, sync::Arc};

#[derive(Debug, Clone)]
pub enum Expr {
    Field(String),
    Literal(Value),
    /// Length of the array at the path; 0 when missing or not an array.
    Size(String),
    Add(Vec<Expr>),
    Multiply(Vec<Expr>),
    Subtract(Box<Expr>, Box<Expr>),
    /// Stable sort of an array of documents.
    SortArray { input: Box<Expr>, by: Vec<SortKey> },
    /// First `limit` elements of an array; `None` keeps all.
    SliceArray { input: Box<Expr>, limit: Option<usize> },
}

impl Expr {
    pub fn field(path: impl Into<String>) -> Self {
        Self::Field(path.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn subtract(left: Expr, right: Expr) -> Self {
        Self::Subtract(Box::new(left), Box::new(right))
    }

    pub fn sort_array(input: Expr, by: Vec<SortKey>) -> Self {
        Self::SortArray {
            input: Box::new(input),
            by,
        }
    }

    pub fn slice_array(input: Expr, limit: Option<usize>) -> Self {
        Self::SliceArray {
            input: Box::new(input),
            limit,
        }
    }

    pub fn eval(&self, doc: &Document) -> Value {
        match self {
            Self::Field(path) => get_path(doc, path).cloned().unwrap_or(Value::Null),
            Self::Literal(value) => value.clone(),
            Self::Size(path) => match get_path(doc, path) {
                Some(Value::Array(items)) => Value::from(items.len()),
                _ => Value::from(0),
            },
            Self::Add(terms) => fold_numeric(terms, doc, Num::Int(0), Num::add),
            Self::Multiply(terms) => fold_numeric(terms, doc, Num::Int(1), Num::mul),
            Self::Subtract(left, right) => {
                match (Num::of(&left.eval(doc)), Num::of(&right.eval(doc))) {
                    (Some(a), Some(b)) => a.sub(b).into_value(),
                    _ => Value::Null,
                }
            }
            Self::SortArray { input, by } => match input.eval(doc) {
                Value::Array(mut items) => {
                    items.sort_by(|a, b| match (a.as_object(), b.as_object()) {
                        (Some(x), Some(y)) => compare_documents(x, y, by),
                        _ => compare_values(Some(a), Some(b)),
                    });
                    Value::Array(items)
                }
                other => other,
            },
            Self::SliceArray { input, limit } => match (input.eval(doc), limit) {
                (Value::Array(mut items), Some(n)) => {
                    items.truncate(*n);
                    Value::Array(items)
                }
                (other, _) => other,
            },
        }
    }
}

fn fold_numeric(
    terms: &[Expr],
    doc: &Document,
    start: Num,
    op: fn(Num, Num) -> Num,
) -> Value {
    let mut acc = start;
    for term in terms {
        match Num::of(&term.eval(doc)) {
            Some(n) => acc = op(acc, n),
            None => return Value::Null,
        }
    }
    acc.into_value()
}

/// Integer arithmetic stays integral until it overflows or meets a float.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else {
            return None;
        };
        match n.as_i64() {
            Some(i) => Some(Self::Int(i)),
            None => n.as_f64().map(Self::Float),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_add(b)
                .map(Self::Int)
                .unwrap_or(Self::Float(a as f64 + b as f64)),
            (a, b) => Self::Float(a.as_f64() + b.as_f64()),
        }
    }

    fn sub(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_sub(b)
                .map(Self::Int)
                .unwrap_or(Self::Float(a as f64 - b as f64)),
            (a, b) => Self::Float(a.as_f64() - b.as_f64()),
        }
    }

    fn mul(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_mul(b)
                .map(Self::Int)
                .unwrap_or(Self::Float(a as f64 * b as f64)),
            (a, b) => Self::Float(a.as_f64() * b.as_f64()),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Int(i) => Value::from(i),
            Self::Float(f) => float_value(f),
        }
    }
}

/// JSON has no NaN or infinity; those become null.
pub(crate) fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Row filter used by `Stage::Filter`.
#[derive(Clone)]
pub enum Predicate {
    /// Any value at the path (arrays fan out) equals `value`.
    Eq { field: String, value: Value },
    /// The string at the path contains `needle`, ignoring case.
    ContainsIgnoreCase { field: String, needle: String },
    Exists(String),
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Custom(Arc<dyn Fn(&Document) -> bool + Send + Sync>),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains_ignore_case(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::ContainsIgnoreCase {
            field: field.into(),
            needle: needle.into().to_lowercase(),
        }
    }

    pub fn custom(f: impl Fn(&Document) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::Eq { field, value } => values_at(doc, field)
                .into_iter()
                .any(|v| compare_values(Some(v), Some(value)) == Ordering::Equal),
            Self::ContainsIgnoreCase { field, needle } => match get_path(doc, field) {
                Some(Value::String(text)) => text.to_lowercase().contains(needle.as_str()),
                _ => false,
            },
            Self::Exists(field) => get_path(doc, field).is_some(),
            Self::Not(inner) => !inner.matches(doc),
            Self::All(parts) => parts.iter().all(|p| p.matches(doc)),
            Self::Custom(f) => f(doc),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq { field, value } => write!(f, "Eq({field} == {value})"),
            Self::ContainsIgnoreCase { field, needle } => {
                write!(f, "ContainsIgnoreCase({field} ~ {needle:?})")
            }
            Self::Exists(field) => write!(f, "Exists({field})"),
            Self::Not(inner) => write!(f, "Not({inner:?})"),
            Self::All(parts) => f.debug_list().entries(parts).finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn difficulty_style_arithmetic() {
        let d = doc(json!({ "avg": 7.0 }));
        let expr = Expr::subtract(
            Expr::literal(100),
            Expr::Multiply(vec![Expr::field("avg"), Expr::literal(5)]),
        );
        assert_eq!(expr.eval(&d), json!(65.0));
    }

    #[test]
    fn arithmetic_on_missing_field_is_null() {
        let d = doc(json!({}));
        let expr = Expr::Add(vec![Expr::field("nope"), Expr::literal(1)]);
        assert_eq!(expr.eval(&d), Value::Null);
    }

    #[test]
    fn sort_then_slice_array() {
        let d = doc(json!({
            "rows": [{ "s": 1, "n": "c" }, { "s": 3, "n": "a" }, { "s": 3, "n": "b" }]
        }));
        let expr = Expr::slice_array(
            Expr::sort_array(Expr::field("rows"), vec![SortKey::desc("s"), SortKey::asc("n")]),
            Some(2),
        );
        assert_eq!(
            expr.eval(&d),
            json!([{ "s": 3, "n": "a" }, { "s": 3, "n": "b" }])
        );
    }

    #[test]
    fn contains_ignore_case_matches_substrings() {
        let p = Predicate::contains_ignore_case("name", "SMI");
        assert!(p.matches(&doc(json!({ "name": "Jane Smith" }))));
        assert!(!p.matches(&doc(json!({ "name": "Jane Doe" }))));
        assert!(!p.matches(&doc(json!({ "title": "Smith" }))));
    }

    #[test]
    fn eq_fans_out_through_arrays() {
        let p = Predicate::eq("skills.skillId", "s2");
        assert!(p.matches(&doc(json!({ "skills": [{ "skillId": "s1" }, { "skillId": "s2" }] }))));
        assert!(!p.matches(&doc(json!({ "skills": [] }))));
    }
}
