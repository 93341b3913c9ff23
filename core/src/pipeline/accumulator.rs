//! Group accumulators: count, sum, avg, first, push.

use super::document::{get_path, Document};
use super::expr::float_value;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub enum Accumulator {
    /// Number of records in the group.
    Count,
    /// Sum of numeric values at the path; non-numeric values are skipped.
    Sum(String),
    /// Mean of numeric values at the path. An empty group yields 0.
    Avg(String),
    /// Value at the path in the group's first record (null when missing).
    First(String),
    /// Ordered collection of projected sub-records.
    Push(Projection),
}

/// Shape of one pushed element.
///
/// With `from` set, records lacking that path contribute nothing; this is
/// how a preserved-empty unwind turns into an empty list instead of a list
/// holding one hollow element.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub from: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl Projection {
    pub fn of(path: impl Into<String>) -> Self {
        Self {
            from: Some(path.into()),
            fields: Vec::new(),
        }
    }

    /// Copy `source` (relative to `from`) into the element as `name`.
    pub fn field(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.fields.push((name.into(), source.into()));
        self
    }

    fn project(&self, doc: &Document) -> Option<Value> {
        let base: &Value;
        let owned_root;
        match &self.from {
            Some(path) => base = get_path(doc, path)?,
            None => {
                owned_root = Value::Object(doc.clone());
                base = &owned_root;
            }
        }
        if self.fields.is_empty() {
            return Some(base.clone());
        }
        let source = base.as_object()?;
        let mut element = Map::new();
        for (name, path) in &self.fields {
            if let Some(value) = get_path(source, path) {
                element.insert(name.clone(), value.clone());
            }
        }
        Some(Value::Object(element))
    }
}

/// Neumaier-compensated running sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    pub fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

#[derive(Debug, Clone)]
pub(crate) enum AccState {
    Count(u64),
    Sum {
        int: i64,
        float: CompensatedSum,
        integral: bool,
    },
    Avg {
        sum: CompensatedSum,
        n: u64,
    },
    First(Option<Value>),
    Push(Vec<Value>),
}

impl Accumulator {
    pub(crate) fn init(&self) -> AccState {
        match self {
            Self::Count => AccState::Count(0),
            Self::Sum(_) => AccState::Sum {
                int: 0,
                float: CompensatedSum::default(),
                integral: true,
            },
            Self::Avg(_) => AccState::Avg {
                sum: CompensatedSum::default(),
                n: 0,
            },
            Self::First(_) => AccState::First(None),
            Self::Push(_) => AccState::Push(Vec::new()),
        }
    }
}

impl AccState {
    pub(crate) fn update(&mut self, acc: &Accumulator, doc: &Document) {
        match (self, acc) {
            (Self::Count(n), Accumulator::Count) => *n += 1,
            (
                Self::Sum {
                    int,
                    float,
                    integral,
                },
                Accumulator::Sum(path),
            ) => {
                if let Some(Value::Number(num)) = get_path(doc, path) {
                    match (num.as_i64(), *integral) {
                        (Some(i), true) => match int.checked_add(i) {
                            Some(next) => *int = next,
                            None => {
                                *integral = false;
                                float.add(*int as f64);
                                float.add(i as f64);
                            }
                        },
                        _ => {
                            if *integral {
                                *integral = false;
                                float.add(*int as f64);
                            }
                            float.add(num.as_f64().unwrap_or(0.0));
                        }
                    }
                }
            }
            (Self::Avg { sum, n }, Accumulator::Avg(path)) => {
                if let Some(Value::Number(num)) = get_path(doc, path) {
                    if let Some(x) = num.as_f64() {
                        sum.add(x);
                        *n += 1;
                    }
                }
            }
            (Self::First(slot), Accumulator::First(path)) => {
                if slot.is_none() {
                    *slot = Some(get_path(doc, path).cloned().unwrap_or(Value::Null));
                }
            }
            (Self::Push(items), Accumulator::Push(projection)) => {
                if let Some(element) = projection.project(doc) {
                    items.push(element);
                }
            }
            _ => {}
        }
    }

    pub(crate) fn finish(self) -> Value {
        match self {
            Self::Count(n) => Value::from(n),
            Self::Sum {
                int,
                float,
                integral,
            } => {
                if integral {
                    Value::from(int)
                } else {
                    float_value(float.total())
                }
            }
            Self::Avg { sum, n } => {
                if n == 0 {
                    Value::from(0)
                } else {
                    float_value(sum.total() / n as f64)
                }
            }
            Self::First(slot) => slot.unwrap_or(Value::Null),
            Self::Push(items) => Value::Array(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(acc: &Accumulator, docs: &[Value]) -> Value {
        let mut state = acc.init();
        for d in docs {
            state.update(acc, d.as_object().unwrap());
        }
        state.finish()
    }

    #[test]
    fn avg_of_empty_group_is_zero() {
        assert_eq!(run(&Accumulator::Avg("x".into()), &[]), json!(0));
        assert_eq!(run(&Accumulator::Avg("x".into()), &[json!({ "y": 1 })]), json!(0));
    }

    #[test]
    fn avg_skips_non_numeric() {
        let docs = [json!({ "x": 70 }), json!({ "x": "n/a" }), json!({ "x": 50 })];
        assert_eq!(run(&Accumulator::Avg("x".into()), &docs), json!(60.0));
    }

    #[test]
    fn sum_stays_integral_until_a_float_arrives() {
        let ints = [json!({ "x": 2 }), json!({ "x": 3 })];
        assert_eq!(run(&Accumulator::Sum("x".into()), &ints), json!(5));
        let mixed = [json!({ "x": 2 }), json!({ "x": 0.5 })];
        assert_eq!(run(&Accumulator::Sum("x".into()), &mixed), json!(2.5));
    }

    #[test]
    fn compensated_sum_keeps_small_terms() {
        let mut s = CompensatedSum::default();
        s.add(1.0e16);
        s.add(1.0);
        s.add(-1.0e16);
        assert_eq!(s.total(), 1.0);
    }

    #[test]
    fn push_skips_records_missing_the_source() {
        let acc = Accumulator::Push(Projection::of("h").field("name", "name"));
        let docs = [json!({ "h": { "name": "a", "x": 1 } }), json!({ "other": 1 })];
        assert_eq!(run(&acc, &docs), json!([{ "name": "a" }]));
    }
}
