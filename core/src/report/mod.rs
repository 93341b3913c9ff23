//! Skill analytics reports.
//!
//! RULE: every report reads exactly one snapshot from its `EntityStore`
//! and computes everything else in memory with a `Pipeline`. No report
//! writes anything back.

pub mod difficulty;
pub mod engagement;
pub mod popularity;
pub mod roster;

pub use difficulty::{skill_difficulty_ranking, RankedEmployee, SkillDifficulty};
pub use engagement::{skill_engagement_report, EngagedEmployee, SkillEngagement};
pub use popularity::{skill_popularity_report, unassigned_skills, SkillPopularity, SkillRef};
pub use roster::{
    employee_count_by_position, skills_sorted_by_name, top_engaged_employees, total_skills,
    PositionCount,
};

use crate::pipeline::{Document, Expr, Pipeline};

/// One row per (employee, assignment) pair:
/// `{ _id, name, engagementScore, skillId, proficiency }`.
///
/// Employees without assignments produce no rows.
pub(crate) fn assignment_rows(employees: &[Document]) -> Vec<Document> {
    Pipeline::new()
        .unwind("skills")
        .project(vec![
            ("_id", Expr::field("_id")),
            ("name", Expr::field("name")),
            ("engagementScore", Expr::field("engagementScore")),
            ("skillId", Expr::field("skills.skillId")),
            ("proficiency", Expr::field("skills.proficiency")),
        ])
        .run(employees)
}
