//! Per-skill engagement: who holds each skill and how engaged they are.

use super::assignment_rows;
use crate::{
    dataset::EntityStore,
    error::WorkforceResult,
    pipeline::{from_documents, Accumulator, Expr, Pipeline, Projection, SortKey},
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagedEmployee {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub engagement_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEngagement {
    pub skill_id: String,
    pub skill_name: String,
    /// Mean engagement of the holders; 0 for a skill nobody holds.
    pub avg_engagement: f64,
    /// Engagement descending, then name ascending.
    pub employees: Vec<EngagedEmployee>,
}

/// Every skill with its holders, ordered by average engagement
/// (descending) and then skill name.
pub fn skill_engagement_report(store: &impl EntityStore) -> WorkforceResult<Vec<SkillEngagement>> {
    let started = Instant::now();
    let snapshot = store.snapshot()?;
    let rows = assignment_rows(&snapshot.employee_documents()?);

    let docs = Pipeline::new()
        .join(Arc::new(rows), "_id", "skillId", "holders")
        .unwind_preserving("holders")
        .group_by(
            Some("_id"),
            vec![
                ("skillName", Accumulator::First("name".into())),
                ("avgEngagement", Accumulator::Avg("holders.engagementScore".into())),
                (
                    "employees",
                    Accumulator::Push(
                        Projection::of("holders")
                            .field("_id", "_id")
                            .field("name", "name")
                            .field("engagementScore", "engagementScore"),
                    ),
                ),
            ],
        )
        .add_fields(vec![(
            "employees",
            Expr::sort_array(
                Expr::field("employees"),
                vec![SortKey::desc("engagementScore"), SortKey::asc("name")],
            ),
        )])
        .sort_by(vec![SortKey::desc("avgEngagement"), SortKey::asc("skillName")])
        .project(vec![
            ("skillId", Expr::field("_id")),
            ("skillName", Expr::field("skillName")),
            ("avgEngagement", Expr::field("avgEngagement")),
            ("employees", Expr::field("employees")),
        ])
        .run(&snapshot.skill_documents()?);

    let report: Vec<SkillEngagement> = from_documents(docs)?;
    log::debug!(
        "skill engagement report: {} skills in {:?}",
        report.len(),
        started.elapsed()
    );
    Ok(report)
}
