//! Employee records and their embedded skill assignments.

use crate::{
    error::{WorkforceError, WorkforceResult},
    skill::Skill,
    types::{EntityId, Role, MAX_PROFICIENCY, MIN_PROFICIENCY},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One employee ↔ skill link. `skill_id` is a weak reference: the skill
/// may have been deleted since the assignment was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAssignment {
    pub skill_id: EntityId,
    pub proficiency: u8,
}

impl SkillAssignment {
    pub fn new(skill_id: impl Into<EntityId>, proficiency: u8) -> WorkforceResult<Self> {
        Ok(Self {
            skill_id: skill_id.into(),
            proficiency: check_proficiency(i64::from(proficiency))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub emp_number: String,
    pub name: String,
    pub email: String,
    pub position: String,
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub engagement_score: u32,
    #[serde(default)]
    pub skills: Vec<SkillAssignment>,
}

impl Employee {
    /// Insert or update the assignment for `skill_id`.
    ///
    /// An existing assignment keeps its position in the list and only
    /// has its proficiency replaced. Returns `true` when a new
    /// assignment was appended.
    pub fn upsert_skill(&mut self, skill_id: &str, proficiency: u8) -> bool {
        match self.skills.iter_mut().find(|s| s.skill_id == skill_id) {
            Some(existing) => {
                existing.proficiency = proficiency;
                false
            }
            None => {
                self.skills.push(SkillAssignment {
                    skill_id: skill_id.to_string(),
                    proficiency,
                });
                true
            }
        }
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }
}

/// Validate a raw proficiency value against [MIN_PROFICIENCY, MAX_PROFICIENCY].
pub fn check_proficiency(value: i64) -> WorkforceResult<u8> {
    if value < i64::from(MIN_PROFICIENCY) || value > i64::from(MAX_PROFICIENCY) {
        return Err(WorkforceError::ValidationFailed(format!(
            "proficiency must be between {MIN_PROFICIENCY} and {MAX_PROFICIENCY}, got {value}"
        )));
    }
    Ok(value as u8)
}

/// Creation payload. Uniqueness of `emp_number` and `email` is checked by
/// the registry before anything is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub emp_number: String,
    pub name: String,
    pub email: String,
    pub position: String,
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub engagement_score: Option<u32>,
    #[serde(default)]
    pub skills: Vec<SkillAssignment>,
}

impl NewEmployee {
    /// Materialize the record under `id`. Duplicate skill ids collapse
    /// into one assignment carrying the last proficiency given.
    pub fn into_employee(self, id: EntityId) -> WorkforceResult<Employee> {
        let mut employee = Employee {
            id,
            emp_number: self.emp_number,
            name: self.name,
            email: self.email,
            position: self.position,
            hire_date: self.hire_date,
            role: self.role,
            engagement_score: self.engagement_score.unwrap_or(0),
            skills: Vec::with_capacity(self.skills.len()),
        };
        for assignment in self.skills {
            let proficiency = check_proficiency(i64::from(assignment.proficiency))?;
            employee.upsert_skill(&assignment.skill_id, proficiency);
        }
        Ok(employee)
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub emp_number: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub role: Option<Role>,
    pub engagement_score: Option<u32>,
}

impl EmployeeUpdate {
    pub fn apply_to(self, employee: &mut Employee) {
        if let Some(v) = self.emp_number {
            employee.emp_number = v;
        }
        if let Some(v) = self.name {
            employee.name = v;
        }
        if let Some(v) = self.email {
            employee.email = v;
        }
        if let Some(v) = self.position {
            employee.position = v;
        }
        if let Some(v) = self.hire_date {
            employee.hire_date = v;
        }
        if let Some(v) = self.role {
            employee.role = v;
        }
        if let Some(v) = self.engagement_score {
            employee.engagement_score = v;
        }
    }
}

/// Employee with its assignments resolved against the skill catalog.
/// Dangling skill ids are left out of `skill_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWithSkills {
    #[serde(flatten)]
    pub employee: Employee,
    pub skill_details: Vec<Skill>,
}
