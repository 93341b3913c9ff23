//! Engagement score: a simple tenure-and-breadth heuristic.
//!
//! score = skill count × 10 + (current year − hire year) × 5
//!
//! Tenure is counted in calendar years only; month and day are ignored.
//! A hire date in a future year yields a negative tenure term.

use crate::{
    clock::Clock,
    employee::Employee,
    error::{WorkforceError, WorkforceResult},
    store::WorkforceStore,
};
use chrono::Datelike;

const POINTS_PER_SKILL: i64 = 10;
const POINTS_PER_YEAR: i64 = 5;

pub fn engagement_score(skill_count: usize, hire_year: i32, current_year: i32) -> i64 {
    let tenure = i64::from(current_year) - i64::from(hire_year);
    skill_count as i64 * POINTS_PER_SKILL + tenure * POINTS_PER_YEAR
}

pub fn score_for(employee: &Employee, clock: &dyn Clock) -> i64 {
    engagement_score(
        employee.skill_count(),
        employee.hire_date.year(),
        clock.current_year(),
    )
}

/// Look the employee up and score it. Nothing is written back.
pub fn compute_engagement_score(
    store: &WorkforceStore,
    employee_id: &str,
    clock: &dyn Clock,
) -> WorkforceResult<i64> {
    let employee = store
        .get_employee(employee_id)?
        .ok_or_else(|| WorkforceError::not_found("employee", employee_id))?;
    Ok(score_for(&employee, clock))
}
