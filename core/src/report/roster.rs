//! Workforce-level listings that are not tied to a single skill.

use crate::{
    dataset::EntityStore,
    employee::Employee,
    error::WorkforceResult,
    pipeline::{from_documents, Accumulator, Pipeline, SortKey},
    skill::Skill,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCount {
    /// The position title.
    #[serde(rename = "_id")]
    pub position: String,
    pub count: u64,
}

/// Headcount per position, largest first.
pub fn employee_count_by_position(store: &impl EntityStore) -> WorkforceResult<Vec<PositionCount>> {
    let employees = store.snapshot()?.employee_documents()?;
    let docs = Pipeline::new()
        .group_by(Some("position"), vec![("count", Accumulator::Count)])
        .sort_by(vec![SortKey::desc("count"), SortKey::asc("_id")])
        .run(&employees);
    from_documents(docs)
}

/// The `n` most engaged employees; ties broken by name, then id.
pub fn top_engaged_employees(store: &impl EntityStore, n: usize) -> WorkforceResult<Vec<Employee>> {
    let employees = store.snapshot()?.employee_documents()?;
    let docs = Pipeline::new()
        .sort_by(vec![
            SortKey::desc("engagementScore"),
            SortKey::asc("name"),
            SortKey::asc("_id"),
        ])
        .slice(0, Some(n))
        .run(&employees);
    from_documents(docs)
}

pub fn total_skills(store: &impl EntityStore) -> WorkforceResult<u64> {
    Ok(store.list_skills()?.len() as u64)
}

/// Whole catalog by name, then id.
pub fn skills_sorted_by_name(store: &impl EntityStore) -> WorkforceResult<Vec<Skill>> {
    let skills = store.snapshot()?.skill_documents()?;
    let docs = Pipeline::new()
        .sort_by(vec![SortKey::asc("name"), SortKey::asc("_id")])
        .run(&skills);
    from_documents(docs)
}
