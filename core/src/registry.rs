//! Employee and skill registries: the write side of the workforce core.
//!
//! RULE: uniqueness (empNumber, email, skill name) and skill references
//! are checked here, before the store is touched. A write that races
//! past the uniqueness check still surfaces as `UniquenessViolation`;
//! the store maps the constraint failure.

use crate::{
    clock::Clock,
    config::WorkforceConfig,
    dataset::EntityStore,
    employee::{check_proficiency, Employee, EmployeeUpdate, EmployeeWithSkills, NewEmployee},
    engagement_score::score_for,
    error::{WorkforceError, WorkforceResult},
    report,
    search::{paginate, Page, PageRequest},
    skill::{NewSkill, Skill, SkillUpdate},
    store::WorkforceStore,
    types::new_entity_id,
};
use std::collections::HashMap;

fn require_text(field: &str, value: &str) -> WorkforceResult<()> {
    if value.trim().is_empty() {
        return Err(WorkforceError::ValidationFailed(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

// ── Employees ─────────────────────────────────────────────────────

pub struct EmployeeRegistry<'a> {
    store: &'a WorkforceStore,
    config: &'a WorkforceConfig,
}

impl<'a> EmployeeRegistry<'a> {
    pub fn new(store: &'a WorkforceStore, config: &'a WorkforceConfig) -> Self {
        Self { store, config }
    }

    pub fn create(&self, new: NewEmployee) -> WorkforceResult<Employee> {
        require_text("empNumber", &new.emp_number)?;
        require_text("name", &new.name)?;
        require_text("email", &new.email)?;
        require_text("position", &new.position)?;
        self.ensure_emp_number_free(&new.emp_number)?;
        self.ensure_email_free(&new.email)?;
        for assignment in &new.skills {
            self.ensure_skill_exists(&assignment.skill_id)?;
        }

        let employee = new.into_employee(new_entity_id())?;
        self.store.insert_employee(&employee)?;
        log::debug!("created employee {} ({})", employee.emp_number, employee.id);
        Ok(employee)
    }

    pub fn get(&self, employee_id: &str) -> WorkforceResult<Employee> {
        self.store
            .get_employee(employee_id)?
            .ok_or_else(|| WorkforceError::not_found("employee", employee_id))
    }

    pub fn get_by_emp_number(&self, emp_number: &str) -> WorkforceResult<Employee> {
        self.store
            .employee_by_emp_number(emp_number)?
            .ok_or_else(|| WorkforceError::not_found("employee", emp_number))
    }

    pub fn find_by_email(&self, email: &str) -> WorkforceResult<Option<Employee>> {
        self.store.employee_by_email(email)
    }

    /// Apply a partial update. Changing empNumber or email re-checks
    /// uniqueness against every other employee.
    pub fn update(&self, employee_id: &str, update: EmployeeUpdate) -> WorkforceResult<Employee> {
        let mut employee = self.get(employee_id)?;
        if let Some(emp_number) = update.emp_number.as_deref() {
            require_text("empNumber", emp_number)?;
            if emp_number != employee.emp_number {
                self.ensure_emp_number_free(emp_number)?;
            }
        }
        if let Some(email) = update.email.as_deref() {
            require_text("email", email)?;
            if email != employee.email {
                self.ensure_email_free(email)?;
            }
        }
        update.apply_to(&mut employee);
        if !self.store.update_employee(&employee)? {
            return Err(WorkforceError::not_found("employee", employee_id));
        }
        Ok(employee)
    }

    /// Remove the employee and its assignments; returns what was removed.
    pub fn delete(&self, employee_id: &str) -> WorkforceResult<Employee> {
        let employee = self.get(employee_id)?;
        self.store.delete_employee(employee_id)?;
        Ok(employee)
    }

    pub fn list(&self) -> WorkforceResult<Vec<Employee>> {
        self.store.list_employees()
    }

    /// Every employee with assignments resolved to skill records.
    /// Dangling skill ids are skipped.
    pub fn list_with_skill_details(&self) -> WorkforceResult<Vec<EmployeeWithSkills>> {
        let snapshot = self.store.snapshot()?;
        let catalog: HashMap<&str, &Skill> = snapshot
            .skills
            .iter()
            .map(|s| (s.id.as_str(), s))
            .collect();
        Ok(snapshot
            .employees
            .iter()
            .map(|employee| EmployeeWithSkills {
                skill_details: employee
                    .skills
                    .iter()
                    .filter_map(|a| catalog.get(a.skill_id.as_str()).map(|s| (*s).clone()))
                    .collect(),
                employee: employee.clone(),
            })
            .collect())
    }

    /// Insert or update one assignment.
    ///
    /// An existing link keeps its position and gets the new proficiency;
    /// a new link is appended.
    pub fn assign_skill(
        &self,
        employee_id: &str,
        skill_id: &str,
        proficiency: i64,
    ) -> WorkforceResult<Employee> {
        let mut employee = self.get(employee_id)?;
        self.ensure_skill_exists(skill_id)?;
        let proficiency = check_proficiency(proficiency)?;
        self.store
            .upsert_assignment(employee_id, skill_id, proficiency)?;
        employee.upsert_skill(skill_id, proficiency);
        Ok(employee)
    }

    pub fn search(&self, request: &PageRequest) -> WorkforceResult<Page<Employee>> {
        paginate(self.store, request, &self.config.pagination)
    }

    pub fn engagement_score(&self, employee_id: &str, clock: &dyn Clock) -> WorkforceResult<i64> {
        Ok(score_for(&self.get(employee_id)?, clock))
    }

    /// `n = None` uses the configured default.
    pub fn top_engaged(&self, n: Option<usize>) -> WorkforceResult<Vec<Employee>> {
        report::top_engaged_employees(
            self.store,
            n.unwrap_or(self.config.reports.top_engaged_default),
        )
    }

    fn ensure_emp_number_free(&self, emp_number: &str) -> WorkforceResult<()> {
        if self.store.emp_number_exists(emp_number)? {
            return Err(WorkforceError::UniquenessViolation {
                field: "empNumber",
                value: emp_number.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_skill_exists(&self, skill_id: &str) -> WorkforceResult<()> {
        if self.store.get_skill(skill_id)?.is_none() {
            return Err(WorkforceError::not_found("skill", skill_id));
        }
        Ok(())
    }

    fn ensure_email_free(&self, email: &str) -> WorkforceResult<()> {
        if self.store.email_exists(email)? {
            return Err(WorkforceError::UniquenessViolation {
                field: "email",
                value: email.to_string(),
            });
        }
        Ok(())
    }
}

// ── Skills ────────────────────────────────────────────────────────

pub struct SkillCatalog<'a> {
    store: &'a WorkforceStore,
    config: &'a WorkforceConfig,
}

impl<'a> SkillCatalog<'a> {
    pub fn new(store: &'a WorkforceStore, config: &'a WorkforceConfig) -> Self {
        Self { store, config }
    }

    pub fn create(&self, new: NewSkill) -> WorkforceResult<Skill> {
        require_text("name", &new.name)?;
        self.ensure_name_free(&new.name)?;
        let skill = new.into_skill(new_entity_id());
        self.store.insert_skill(&skill)?;
        Ok(skill)
    }

    pub fn get(&self, skill_id: &str) -> WorkforceResult<Skill> {
        self.store
            .get_skill(skill_id)?
            .ok_or_else(|| WorkforceError::not_found("skill", skill_id))
    }

    pub fn update(&self, skill_id: &str, update: SkillUpdate) -> WorkforceResult<Skill> {
        let mut skill = self.get(skill_id)?;
        if let Some(name) = update.name.as_deref() {
            require_text("name", name)?;
            if name != skill.name {
                self.ensure_name_free(name)?;
            }
        }
        update.apply_to(&mut skill);
        self.store.update_skill(&skill)?;
        Ok(skill)
    }

    /// Assignments that referenced the skill stay behind as dangling ids.
    pub fn delete(&self, skill_id: &str) -> WorkforceResult<Skill> {
        let skill = self.get(skill_id)?;
        self.store.delete_skill(skill_id)?;
        Ok(skill)
    }

    pub fn list(&self) -> WorkforceResult<Vec<Skill>> {
        self.store.list_skills()
    }

    pub fn total(&self) -> WorkforceResult<u64> {
        report::total_skills(self.store)
    }

    pub fn sorted_by_name(&self) -> WorkforceResult<Vec<Skill>> {
        report::skills_sorted_by_name(self.store)
    }

    pub fn unassigned(&self) -> WorkforceResult<Vec<report::SkillRef>> {
        report::unassigned_skills(self.store)
    }

    pub fn search(&self, request: &PageRequest) -> WorkforceResult<Page<Skill>> {
        paginate(self.store, request, &self.config.pagination)
    }

    fn ensure_name_free(&self, name: &str) -> WorkforceResult<()> {
        if self.store.skill_by_name(name)?.is_some() {
            return Err(WorkforceError::UniquenessViolation {
                field: "name",
                value: name.to_string(),
            });
        }
        Ok(())
    }
}
