//! Read contract between the analytics core and whatever holds the data.
//!
//! RULE: reports and listings only see entities through `EntityStore`.
//! Every call works on one `Snapshot`, so employees and skills are
//! always mutually consistent within a call.

use crate::{
    employee::Employee,
    error::WorkforceResult,
    pipeline::{to_documents, Document},
    skill::Skill,
};

pub trait EntityStore {
    fn list_employees(&self) -> WorkforceResult<Vec<Employee>>;

    fn list_skills(&self) -> WorkforceResult<Vec<Skill>>;

    /// Point-in-time view of both entity sets.
    ///
    /// The default reads the two lists one after the other; stores that
    /// can do better (a read transaction) override it.
    fn snapshot(&self) -> WorkforceResult<Snapshot> {
        Ok(Snapshot::new(self.list_employees()?, self.list_skills()?))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub employees: Vec<Employee>,
    pub skills: Vec<Skill>,
}

impl Snapshot {
    pub fn new(employees: Vec<Employee>, skills: Vec<Skill>) -> Self {
        Self { employees, skills }
    }

    pub fn employee_documents(&self) -> WorkforceResult<Vec<Document>> {
        to_documents(&self.employees)
    }

    pub fn skill_documents(&self) -> WorkforceResult<Vec<Document>> {
        to_documents(&self.skills)
    }
}

impl EntityStore for Snapshot {
    fn list_employees(&self) -> WorkforceResult<Vec<Employee>> {
        Ok(self.employees.clone())
    }

    fn list_skills(&self) -> WorkforceResult<Vec<Skill>> {
        Ok(self.skills.clone())
    }

    fn snapshot(&self) -> WorkforceResult<Snapshot> {
        Ok(self.clone())
    }
}
