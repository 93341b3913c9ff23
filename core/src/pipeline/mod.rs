//! Aggregation pipeline engine.
//!
//! A `Pipeline` is an ordered list of stages run left to right over a
//! snapshot of documents. Running never mutates the caller's input, and
//! given the same input and explicit tie-break keys it always produces
//! the same output. Reports and paginated listings are all expressed as
//! pipelines over this engine.

pub mod accumulator;
pub mod document;
pub mod expr;
pub mod sort;
pub mod stage;

pub use accumulator::{Accumulator, CompensatedSum, Projection};
pub use document::{from_documents, get_path, to_document, to_documents, Document};
pub use expr::{Expr, Predicate};
pub use sort::{SortKey, SortOrder};
pub use stage::{JoinOutput, Stage};

use std::{sync::Arc, time::Instant};

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn filter(self, predicate: Predicate) -> Self {
        self.stage(Stage::Filter(predicate))
    }

    /// Left outer join attaching the matching foreign documents.
    pub fn join(
        self,
        foreign: Arc<Vec<Document>>,
        local_field: &str,
        foreign_field: &str,
        as_field: &str,
    ) -> Self {
        self.stage(Stage::Join {
            foreign,
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
            output: JoinOutput::Documents,
        })
    }

    /// Left outer join attaching only the match count.
    pub fn join_count(
        self,
        foreign: Arc<Vec<Document>>,
        local_field: &str,
        foreign_field: &str,
        as_field: &str,
    ) -> Self {
        self.stage(Stage::Join {
            foreign,
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
            output: JoinOutput::Count,
        })
    }

    pub fn unwind(self, field: &str) -> Self {
        self.stage(Stage::Unwind {
            field: field.into(),
            preserve_empty: false,
        })
    }

    /// Unwind that keeps documents whose array is missing or empty,
    /// with the field removed.
    pub fn unwind_preserving(self, field: &str) -> Self {
        self.stage(Stage::Unwind {
            field: field.into(),
            preserve_empty: true,
        })
    }

    pub fn group_by(self, key: Option<&str>, accumulators: Vec<(&str, Accumulator)>) -> Self {
        self.stage(Stage::GroupBy {
            key: key.map(str::to_string),
            accumulators: accumulators
                .into_iter()
                .map(|(name, acc)| (name.to_string(), acc))
                .collect(),
        })
    }

    pub fn add_fields(self, fields: Vec<(&str, Expr)>) -> Self {
        self.stage(Stage::AddFields(named(fields)))
    }

    pub fn project(self, fields: Vec<(&str, Expr)>) -> Self {
        self.stage(Stage::Project(named(fields)))
    }

    pub fn sort_by(self, keys: Vec<SortKey>) -> Self {
        self.stage(Stage::SortBy(keys))
    }

    pub fn slice(self, offset: usize, limit: Option<usize>) -> Self {
        self.stage(Stage::Slice { offset, limit })
    }

    pub fn count(self, field: &str) -> Self {
        self.stage(Stage::Count(field.into()))
    }

    pub fn facet(self, facets: Vec<(&str, Pipeline)>) -> Self {
        self.stage(Stage::Facet(
            facets
                .into_iter()
                .map(|(name, pipeline)| (name.to_string(), pipeline))
                .collect(),
        ))
    }

    /// Run every stage over a private copy of `input`.
    pub fn run(&self, input: &[Document]) -> Vec<Document> {
        let mut docs = input.to_vec();
        for stage in &self.stages {
            let started = Instant::now();
            let rows_in = docs.len();
            docs = stage.apply(docs);
            log::trace!(
                "pipeline stage {}: {rows_in} -> {} rows in {:?}",
                stage.name(),
                docs.len(),
                started.elapsed()
            );
        }
        docs
    }
}

fn named(fields: Vec<(&str, Expr)>) -> Vec<(String, Expr)> {
    fields
        .into_iter()
        .map(|(name, expr)| (name.to_string(), expr))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn field(doc: &Document, name: &str) -> Value {
        doc.get(name).cloned().unwrap_or(Value::Null)
    }

    #[test]
    fn run_does_not_mutate_input() {
        let input = docs(vec![json!({ "n": 2 }), json!({ "n": 1 })]);
        let before = input.clone();
        let out = Pipeline::new()
            .sort_by(vec![SortKey::asc("n")])
            .add_fields(vec![("m", Expr::literal(1))])
            .run(&input);
        assert_eq!(input, before);
        assert_eq!(field(&out[0], "n"), json!(1));
    }

    #[test]
    fn left_join_keeps_unmatched_and_ignores_dangling() {
        let employees = Arc::new(docs(vec![
            json!({ "_id": "e1", "skills": [{ "skillId": "s1" }, { "skillId": "gone" }] }),
            json!({ "_id": "e2", "skills": [{ "skillId": "s1" }] }),
        ]));
        let skills = docs(vec![json!({ "_id": "s1" }), json!({ "_id": "s2" })]);

        let out = Pipeline::new()
            .join(employees.clone(), "_id", "skills.skillId", "holders")
            .run(&skills);
        assert_eq!(out.len(), 2);
        assert_eq!(field(&out[0], "holders").as_array().unwrap().len(), 2);
        assert_eq!(field(&out[1], "holders"), json!([]));

        let counted = Pipeline::new()
            .join_count(employees, "_id", "skills.skillId", "n")
            .run(&skills);
        assert_eq!(field(&counted[0], "n"), json!(2));
        assert_eq!(field(&counted[1], "n"), json!(0));
    }

    #[test]
    fn unwind_drops_or_preserves_empty_arrays() {
        let input = docs(vec![json!({ "a": [1, 2] }), json!({ "a": [] }), json!({ "b": 1 })]);
        assert_eq!(Pipeline::new().unwind("a").run(&input).len(), 2);
        let kept = Pipeline::new().unwind_preserving("a").run(&input);
        assert_eq!(kept.len(), 4);
        assert!(kept[2].get("a").is_none());
    }

    #[test]
    fn group_by_keeps_first_seen_order() {
        let input = docs(vec![
            json!({ "k": "b", "v": 1 }),
            json!({ "k": "a", "v": 3 }),
            json!({ "k": "b", "v": 5 }),
        ]);
        let out = Pipeline::new()
            .group_by(
                Some("k"),
                vec![
                    ("n", Accumulator::Count),
                    ("total", Accumulator::Sum("v".into())),
                    ("mean", Accumulator::Avg("v".into())),
                ],
            )
            .run(&input);
        assert_eq!(field(&out[0], "_id"), json!("b"));
        assert_eq!(field(&out[0], "n"), json!(2));
        assert_eq!(field(&out[0], "total"), json!(6));
        assert_eq!(field(&out[0], "mean"), json!(3.0));
        assert_eq!(field(&out[1], "_id"), json!("a"));
    }

    #[test]
    fn sort_is_stable_and_multi_key() {
        let input = docs(vec![
            json!({ "s": 1, "n": "x", "i": 0 }),
            json!({ "s": 2, "n": "b", "i": 1 }),
            json!({ "s": 2, "n": "a", "i": 2 }),
            json!({ "s": 1, "n": "x", "i": 3 }),
        ]);
        let out = Pipeline::new()
            .sort_by(vec![SortKey::desc("s"), SortKey::asc("n")])
            .run(&input);
        let order: Vec<i64> = out.iter().map(|d| d["i"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![2, 1, 0, 3]);
    }

    #[test]
    fn facet_merges_named_results_over_one_snapshot() {
        let input = docs((0..25).map(|i| json!({ "i": i })).collect());
        let out = Pipeline::new()
            .facet(vec![
                (
                    "data",
                    Pipeline::new()
                        .sort_by(vec![SortKey::asc("i")])
                        .slice(20, Some(10)),
                ),
                ("totalCount", Pipeline::new().count("count")),
            ])
            .run(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["data"].as_array().unwrap().len(), 5);
        assert_eq!(out[0]["totalCount"], json!([{ "count": 25 }]));
    }

    #[test]
    fn count_of_empty_input_is_zero() {
        let out = Pipeline::new().count("count").run(&[]);
        assert_eq!(out, docs(vec![json!({ "count": 0 })]));
    }
}
