//! Skill difficulty ranking.
//!
//! difficulty = 100 − avgProficiency × 5, so a skill whose holders all
//! rate themselves 10 scores 50 and a skill nobody holds scores 100.

use super::assignment_rows;
use crate::{
    dataset::EntityStore,
    error::WorkforceResult,
    pipeline::{from_documents, Accumulator, Expr, Pipeline, Projection, SortKey},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DIFFICULTY_CEILING: i64 = 100;
const POINTS_PER_PROFICIENCY: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEmployee {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub proficiency: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDifficulty {
    pub skill_id: String,
    pub skill_name: String,
    pub avg_proficiency: f64,
    pub difficulty: f64,
    /// Proficiency descending, then name ascending; at most `top_k`.
    pub employees: Vec<RankedEmployee>,
}

/// Rank skills from hardest to easiest.
///
/// `top_k` truncates each skill's employee list after the average has
/// been taken over every holder; `None` keeps them all.
pub fn skill_difficulty_ranking(
    store: &impl EntityStore,
    top_k: Option<usize>,
) -> WorkforceResult<Vec<SkillDifficulty>> {
    let snapshot = store.snapshot()?;
    let rows = assignment_rows(&snapshot.employee_documents()?);

    let docs = Pipeline::new()
        .join(Arc::new(rows), "_id", "skillId", "holders")
        .unwind_preserving("holders")
        .group_by(
            Some("_id"),
            vec![
                ("skillName", Accumulator::First("name".into())),
                ("avgProficiency", Accumulator::Avg("holders.proficiency".into())),
                (
                    "employees",
                    Accumulator::Push(
                        Projection::of("holders")
                            .field("_id", "_id")
                            .field("name", "name")
                            .field("proficiency", "proficiency"),
                    ),
                ),
            ],
        )
        .add_fields(vec![
            (
                "difficulty",
                Expr::subtract(
                    Expr::literal(DIFFICULTY_CEILING),
                    Expr::Multiply(vec![
                        Expr::field("avgProficiency"),
                        Expr::literal(POINTS_PER_PROFICIENCY),
                    ]),
                ),
            ),
            (
                "employees",
                Expr::slice_array(
                    Expr::sort_array(
                        Expr::field("employees"),
                        vec![SortKey::desc("proficiency"), SortKey::asc("name")],
                    ),
                    top_k,
                ),
            ),
        ])
        .sort_by(vec![SortKey::desc("difficulty"), SortKey::asc("skillName")])
        .project(vec![
            ("skillId", Expr::field("_id")),
            ("skillName", Expr::field("skillName")),
            ("avgProficiency", Expr::field("avgProficiency")),
            ("difficulty", Expr::field("difficulty")),
            ("employees", Expr::field("employees")),
        ])
        .run(&snapshot.skill_documents()?);

    from_documents(docs)
}
