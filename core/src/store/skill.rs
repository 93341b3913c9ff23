use super::{unique_violation, WorkforceStore};
use crate::{error::WorkforceResult, skill::Skill};
use rusqlite::{params, OptionalExtension};

fn name_taken(skill: &Skill, column: &str) -> Option<(&'static str, String)> {
    (column == "name").then(|| ("name", skill.name.clone()))
}

fn skill_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Skill> {
    Ok(Skill {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

impl WorkforceStore {
    // ── Skill ──────────────────────────────────────────────────────

    pub fn insert_skill(&self, skill: &Skill) -> WorkforceResult<()> {
        self.conn.execute(
            "INSERT INTO skill (skill_id, name, description) VALUES (?1, ?2, ?3)",
            params![&skill.id, &skill.name, &skill.description],
        )
        .map_err(|err| unique_violation(err, |column| name_taken(skill, column)))?;
        Ok(())
    }

    pub fn get_skill(&self, skill_id: &str) -> WorkforceResult<Option<Skill>> {
        self.conn
            .query_row(
                "SELECT skill_id, name, description FROM skill WHERE skill_id = ?1",
                params![skill_id],
                skill_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn skill_by_name(&self, name: &str) -> WorkforceResult<Option<Skill>> {
        self.conn
            .query_row(
                "SELECT skill_id, name, description FROM skill WHERE name = ?1",
                params![name],
                skill_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn update_skill(&self, skill: &Skill) -> WorkforceResult<bool> {
        let changed = self.conn.execute(
            "UPDATE skill SET name = ?2, description = ?3 WHERE skill_id = ?1",
            params![&skill.id, &skill.name, &skill.description],
        )
        .map_err(|err| unique_violation(err, |column| name_taken(skill, column)))?;
        Ok(changed > 0)
    }

    /// Assignments pointing at the skill are kept; they become dangling.
    pub fn delete_skill(&self, skill_id: &str) -> WorkforceResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM skill WHERE skill_id = ?1", params![skill_id])?;
        Ok(deleted > 0)
    }

    /// Every skill, in insertion order.
    pub fn all_skills(&self) -> WorkforceResult<Vec<Skill>> {
        self.load_skills()
    }

    pub(super) fn load_skills(&self) -> WorkforceResult<Vec<Skill>> {
        let mut stmt = self
            .conn
            .prepare("SELECT skill_id, name, description FROM skill ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], skill_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn skill_count(&self) -> WorkforceResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM skill", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
