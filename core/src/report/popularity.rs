//! Holder counts per skill. Joins in count mode: no employee record is
//! copied into the output.

use crate::{
    dataset::{EntityStore, Snapshot},
    error::WorkforceResult,
    pipeline::{from_documents, Document, Expr, Pipeline, Predicate, SortKey},
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPopularity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub total_employees: u64,
}

/// `{ _id, name }` of a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

fn counted(snapshot: &Snapshot) -> WorkforceResult<Pipeline> {
    let employees: Arc<Vec<Document>> = Arc::new(snapshot.employee_documents()?);
    Ok(Pipeline::new().join_count(employees, "_id", "skills.skillId", "totalEmployees"))
}

/// Most-held skills first; ties broken by name.
pub fn skill_popularity_report(store: &impl EntityStore) -> WorkforceResult<Vec<SkillPopularity>> {
    let started = Instant::now();
    let snapshot = store.snapshot()?;

    let docs = counted(&snapshot)?
        .sort_by(vec![SortKey::desc("totalEmployees"), SortKey::asc("name")])
        .project(vec![
            ("_id", Expr::field("_id")),
            ("name", Expr::field("name")),
            ("totalEmployees", Expr::field("totalEmployees")),
        ])
        .run(&snapshot.skill_documents()?);

    let report: Vec<SkillPopularity> = from_documents(docs)?;
    log::debug!(
        "skill popularity report: {} skills over {} employees in {:?}",
        report.len(),
        snapshot.employees.len(),
        started.elapsed()
    );
    Ok(report)
}

/// Skills nobody holds, in catalog order.
pub fn unassigned_skills(store: &impl EntityStore) -> WorkforceResult<Vec<SkillRef>> {
    let snapshot = store.snapshot()?;
    let docs = counted(&snapshot)?
        .filter(Predicate::eq("totalEmployees", 0))
        .project(vec![("_id", Expr::field("_id")), ("name", Expr::field("name"))])
        .run(&snapshot.skill_documents()?);
    from_documents(docs)
}
