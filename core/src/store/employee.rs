use super::{unique_violation, WorkforceStore};
use crate::{
    employee::{Employee, SkillAssignment},
    error::WorkforceResult,
    types::Role,
};
use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::HashMap;

const HIRE_DATE_FORMAT: &str = "%Y-%m-%d";

const EMPLOYEE_COLUMNS: &str = "employee_id, emp_number, name, email, position,
                    hire_date, role, engagement_score";

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

// Assignments are filled in separately.
fn employee_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
    let hire_date: String = row.get(5)?;
    let role: String = row.get(6)?;
    Ok(Employee {
        id: row.get(0)?,
        emp_number: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        position: row.get(4)?,
        hire_date: NaiveDate::parse_from_str(&hire_date, HIRE_DATE_FORMAT)
            .map_err(|e| conversion_error(5, format!("bad hire_date '{hire_date}': {e}")))?,
        role: Role::parse(&role).ok_or_else(|| conversion_error(6, format!("bad role '{role}'")))?,
        engagement_score: row.get(7)?,
        skills: Vec::new(),
    })
}

fn unique_field(e: &Employee, column: &str) -> Option<(&'static str, String)> {
    match column {
        "emp_number" => Some(("empNumber", e.emp_number.clone())),
        "email" => Some(("email", e.email.clone())),
        _ => None,
    }
}

fn write_employee(conn: &Connection, e: &Employee) -> WorkforceResult<()> {
    conn.execute(
        "INSERT INTO employee (
            employee_id, emp_number, name, email, position,
            hire_date, role, engagement_score
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &e.id,
            &e.emp_number,
            &e.name,
            &e.email,
            &e.position,
            e.hire_date.format(HIRE_DATE_FORMAT).to_string(),
            e.role.as_str(),
            e.engagement_score,
        ],
    )
    .map_err(|err| unique_violation(err, |column| unique_field(e, column)))?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO skill_assignment (employee_id, skill_id, proficiency, ordinal)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (ordinal, assignment) in e.skills.iter().enumerate() {
        stmt.execute(params![
            &e.id,
            &assignment.skill_id,
            assignment.proficiency,
            ordinal as i64
        ])?;
    }
    Ok(())
}

impl WorkforceStore {
    // ── Employee ───────────────────────────────────────────────────

    /// Insert one employee together with its assignments.
    pub fn insert_employee(&self, employee: &Employee) -> WorkforceResult<()> {
        self.insert_employees(std::slice::from_ref(employee))
    }

    /// Insert a batch in one transaction: either every record lands or
    /// none does.
    pub fn insert_employees(&self, batch: &[Employee]) -> WorkforceResult<()> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        for employee in batch {
            write_employee(&tx, employee)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_employee(&self, employee_id: &str) -> WorkforceResult<Option<Employee>> {
        self.find_employee_where("employee_id", employee_id)
    }

    pub fn employee_by_emp_number(&self, emp_number: &str) -> WorkforceResult<Option<Employee>> {
        self.find_employee_where("emp_number", emp_number)
    }

    pub fn employee_by_email(&self, email: &str) -> WorkforceResult<Option<Employee>> {
        self.find_employee_where("email", email)
    }

    // `column` is always one of the literals above, never caller input.
    fn find_employee_where(&self, column: &str, value: &str) -> WorkforceResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE {column} = ?1");
        let employee = self
            .conn
            .query_row(&sql, params![value], employee_row_mapper)
            .optional()?;
        match employee {
            Some(mut employee) => {
                employee.skills = self.assignments_for(&employee.id)?;
                Ok(Some(employee))
            }
            None => Ok(None),
        }
    }

    fn assignments_for(&self, employee_id: &str) -> WorkforceResult<Vec<SkillAssignment>> {
        let mut stmt = self.conn.prepare(
            "SELECT skill_id, proficiency FROM skill_assignment
             WHERE employee_id = ?1 ORDER BY ordinal ASC",
        )?;
        let rows = stmt.query_map(params![employee_id], |row| {
            Ok(SkillAssignment {
                skill_id: row.get(0)?,
                proficiency: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Overwrite the scalar fields of an existing employee.
    /// Assignments are left alone. Returns false when no row matched.
    pub fn update_employee(&self, e: &Employee) -> WorkforceResult<bool> {
        let changed = self.conn.execute(
            "UPDATE employee SET
                emp_number = ?2, name = ?3, email = ?4, position = ?5,
                hire_date = ?6, role = ?7, engagement_score = ?8
             WHERE employee_id = ?1",
            params![
                &e.id,
                &e.emp_number,
                &e.name,
                &e.email,
                &e.position,
                e.hire_date.format(HIRE_DATE_FORMAT).to_string(),
                e.role.as_str(),
                e.engagement_score,
            ],
        )
        .map_err(|err| unique_violation(err, |column| unique_field(e, column)))?;
        Ok(changed > 0)
    }

    /// Assignments go with the employee (ON DELETE CASCADE).
    pub fn delete_employee(&self, employee_id: &str) -> WorkforceResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM employee WHERE employee_id = ?1",
            params![employee_id],
        )?;
        Ok(deleted > 0)
    }

    /// Set the proficiency for an existing link, or append a new one
    /// after the employee's current assignments.
    pub fn upsert_assignment(
        &self,
        employee_id: &str,
        skill_id: &str,
        proficiency: u8,
    ) -> WorkforceResult<()> {
        self.conn.execute(
            "INSERT INTO skill_assignment (employee_id, skill_id, proficiency, ordinal)
             VALUES (?1, ?2, ?3,
                 (SELECT COALESCE(MAX(ordinal), -1) + 1
                  FROM skill_assignment WHERE employee_id = ?1))
             ON CONFLICT(employee_id, skill_id) DO UPDATE SET
                proficiency = excluded.proficiency",
            params![employee_id, skill_id, proficiency],
        )?;
        Ok(())
    }

    /// Every employee with its assignments, in insertion order.
    pub fn all_employees(&self) -> WorkforceResult<Vec<Employee>> {
        let tx = self.conn.unchecked_transaction()?;
        let employees = self.load_employees()?;
        tx.commit()?;
        Ok(employees)
    }

    pub(super) fn load_employees(&self) -> WorkforceResult<Vec<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employee ORDER BY rowid ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut employees = stmt
            .query_map([], employee_row_mapper)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT employee_id, skill_id, proficiency FROM skill_assignment
             ORDER BY employee_id, ordinal ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                SkillAssignment {
                    skill_id: row.get(1)?,
                    proficiency: row.get(2)?,
                },
            ))
        })?;
        let mut by_employee: HashMap<String, Vec<SkillAssignment>> = HashMap::new();
        for row in rows {
            let (employee_id, assignment) = row?;
            by_employee.entry(employee_id).or_default().push(assignment);
        }
        for employee in &mut employees {
            if let Some(skills) = by_employee.remove(&employee.id) {
                employee.skills = skills;
            }
        }
        Ok(employees)
    }

    pub fn employee_count(&self) -> WorkforceResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM employee", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn emp_number_exists(&self, emp_number: &str) -> WorkforceResult<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM employee WHERE emp_number = ?1)",
                params![emp_number],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn email_exists(&self, email: &str) -> WorkforceResult<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM employee WHERE email = ?1)",
                params![email],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// Every issued employee number, in no particular order.
    pub(super) fn emp_numbers(conn: &Connection) -> WorkforceResult<Vec<String>> {
        let mut stmt = conn.prepare("SELECT emp_number FROM employee")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
