//! Pipeline stages. Each stage consumes the full output of the one
//! before it and returns a fresh vector.

use super::accumulator::{AccState, Accumulator};
use super::document::{get_path, index_key, remove_path, set_path, values_at, Document};
use super::expr::{Expr, Predicate};
use super::sort::{compare_documents, SortKey};
use super::Pipeline;
use rayon::prelude::*;
use serde_json::Value;
use std::{collections::HashMap, fmt, sync::Arc};

/// What a join attaches to each local document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutput {
    /// The ordered array of matching foreign documents.
    Documents,
    /// Only the number of matches; nothing is cloned.
    Count,
}

#[derive(Clone)]
pub enum Stage {
    Filter(Predicate),
    /// Left outer join. Every local document survives, with zero or more
    /// matches attached under `as_field`. Values that match nothing,
    /// including dangling references, simply produce no match.
    Join {
        foreign: Arc<Vec<Document>>,
        local_field: String,
        foreign_field: String,
        as_field: String,
        output: JoinOutput,
    },
    Unwind {
        field: String,
        preserve_empty: bool,
    },
    /// Groups keep first-seen order. The group key lands in `_id`;
    /// `key: None` folds everything into one group keyed by null.
    GroupBy {
        key: Option<String>,
        accumulators: Vec<(String, Accumulator)>,
    },
    AddFields(Vec<(String, Expr)>),
    Project(Vec<(String, Expr)>),
    SortBy(Vec<SortKey>),
    Slice {
        offset: usize,
        limit: Option<usize>,
    },
    Count(String),
    /// Named sub-pipelines over the same input, merged into one row.
    Facet(Vec<(String, Pipeline)>),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Filter(_) => "filter",
            Self::Join { .. } => "join",
            Self::Unwind { .. } => "unwind",
            Self::GroupBy { .. } => "group_by",
            Self::AddFields(_) => "add_fields",
            Self::Project(_) => "project",
            Self::SortBy(_) => "sort_by",
            Self::Slice { .. } => "slice",
            Self::Count(_) => "count",
            Self::Facet(_) => "facet",
        }
    }

    pub(crate) fn apply(&self, input: Vec<Document>) -> Vec<Document> {
        match self {
            Self::Filter(predicate) => input.into_iter().filter(|d| predicate.matches(d)).collect(),
            Self::Join {
                foreign,
                local_field,
                foreign_field,
                as_field,
                output,
            } => join(input, foreign, local_field, foreign_field, as_field, *output),
            Self::Unwind {
                field,
                preserve_empty,
            } => unwind(input, field, *preserve_empty),
            Self::GroupBy { key, accumulators } => group_by(input, key.as_deref(), accumulators),
            Self::AddFields(fields) => input
                .into_iter()
                .map(|mut doc| {
                    let computed: Vec<(&String, Value)> =
                        fields.iter().map(|(name, expr)| (name, expr.eval(&doc))).collect();
                    for (name, value) in computed {
                        set_path(&mut doc, name, value);
                    }
                    doc
                })
                .collect(),
            Self::Project(fields) => input
                .iter()
                .map(|doc| {
                    let mut out = Document::new();
                    for (name, expr) in fields {
                        set_path(&mut out, name, expr.eval(doc));
                    }
                    out
                })
                .collect(),
            Self::SortBy(keys) => {
                let mut docs = input;
                docs.sort_by(|a, b| compare_documents(a, b, keys));
                docs
            }
            Self::Slice { offset, limit } => input
                .into_iter()
                .skip(*offset)
                .take(limit.unwrap_or(usize::MAX))
                .collect(),
            Self::Count(field) => {
                let mut row = Document::new();
                row.insert(field.clone(), Value::from(input.len()));
                vec![row]
            }
            Self::Facet(facets) => {
                let results: Vec<(String, Value)> = facets
                    .par_iter()
                    .map(|(name, pipeline)| {
                        let rows = pipeline.run(&input);
                        (name.clone(), Value::Array(rows.into_iter().map(Value::Object).collect()))
                    })
                    .collect();
                let mut row = Document::new();
                for (name, rows) in results {
                    row.insert(name, rows);
                }
                vec![row]
            }
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(p) => write!(f, "Filter({p:?})"),
            Self::Join {
                foreign,
                local_field,
                foreign_field,
                as_field,
                output,
            } => write!(
                f,
                "Join({local_field} = [{} docs].{foreign_field} as {as_field}, {output:?})",
                foreign.len()
            ),
            Self::Unwind {
                field,
                preserve_empty,
            } => write!(f, "Unwind({field}, preserve_empty={preserve_empty})"),
            Self::GroupBy { key, accumulators } => {
                let names: Vec<&str> = accumulators.iter().map(|(n, _)| n.as_str()).collect();
                write!(f, "GroupBy({key:?} -> {names:?})")
            }
            Self::AddFields(fields) | Self::Project(fields) => {
                let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
                write!(f, "{}({names:?})", self.name())
            }
            Self::SortBy(keys) => write!(f, "SortBy({keys:?})"),
            Self::Slice { offset, limit } => write!(f, "Slice({offset}, {limit:?})"),
            Self::Count(field) => write!(f, "Count({field})"),
            Self::Facet(facets) => {
                let names: Vec<&str> = facets.iter().map(|(n, _)| n.as_str()).collect();
                write!(f, "Facet({names:?})")
            }
        }
    }
}

fn join(
    input: Vec<Document>,
    foreign: &[Document],
    local_field: &str,
    foreign_field: &str,
    as_field: &str,
    output: JoinOutput,
) -> Vec<Document> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, doc) in foreign.iter().enumerate() {
        for value in values_at(doc, foreign_field) {
            if value.is_null() {
                continue;
            }
            let slot = index.entry(index_key(value)).or_default();
            if slot.last() != Some(&i) {
                slot.push(i);
            }
        }
    }

    input
        .into_iter()
        .map(|mut doc| {
            let mut hits: Vec<usize> = values_at(&doc, local_field)
                .into_iter()
                .filter(|v| !v.is_null())
                .filter_map(|v| index.get(&index_key(v)))
                .flatten()
                .copied()
                .collect();
            hits.sort_unstable();
            hits.dedup();
            let attached = match output {
                JoinOutput::Count => Value::from(hits.len()),
                JoinOutput::Documents => Value::Array(
                    hits.into_iter()
                        .map(|i| Value::Object(foreign[i].clone()))
                        .collect(),
                ),
            };
            set_path(&mut doc, as_field, attached);
            doc
        })
        .collect()
}

enum UnwindShape {
    Elements(Vec<Value>),
    Empty,
    Scalar,
}

fn unwind(input: Vec<Document>, field: &str, preserve_empty: bool) -> Vec<Document> {
    let mut out = Vec::with_capacity(input.len());
    for mut doc in input {
        let shape = match get_path(&doc, field) {
            Some(Value::Array(items)) if !items.is_empty() => UnwindShape::Elements(items.clone()),
            Some(Value::Array(_)) | Some(Value::Null) | None => UnwindShape::Empty,
            Some(_) => UnwindShape::Scalar,
        };
        match shape {
            UnwindShape::Elements(items) => {
                for item in items {
                    let mut copy = doc.clone();
                    set_path(&mut copy, field, item);
                    out.push(copy);
                }
            }
            UnwindShape::Empty => {
                if preserve_empty {
                    remove_path(&mut doc, field);
                    out.push(doc);
                }
            }
            UnwindShape::Scalar => out.push(doc),
        }
    }
    out
}

fn group_by(
    input: Vec<Document>,
    key: Option<&str>,
    accumulators: &[(String, Accumulator)],
) -> Vec<Document> {
    let mut order: Vec<(Value, Vec<AccState>)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for doc in &input {
        let key_value = key
            .and_then(|k| get_path(doc, k).cloned())
            .unwrap_or(Value::Null);
        let slot = *slots.entry(index_key(&key_value)).or_insert_with(|| {
            order.push((
                key_value.clone(),
                accumulators.iter().map(|(_, acc)| acc.init()).collect(),
            ));
            order.len() - 1
        });
        let states = &mut order[slot].1;
        for (state, (_, acc)) in states.iter_mut().zip(accumulators) {
            state.update(acc, doc);
        }
    }

    order
        .into_iter()
        .map(|(key_value, states)| {
            let mut row = Document::new();
            row.insert("_id".into(), key_value);
            for (state, (name, _)) in states.into_iter().zip(accumulators) {
                set_path(&mut row, name, state.finish());
            }
            row
        })
        .collect()
}
