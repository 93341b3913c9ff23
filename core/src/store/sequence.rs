use super::WorkforceStore;
use crate::{
    emp_number::{max_suffix, plan_batch},
    error::WorkforceResult,
};
use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};
use std::ops::RangeInclusive;

const EMP_NUMBER_SEQUENCE: &str = "emp_number";

impl WorkforceStore {
    // ── Identifier reservation ─────────────────────────────────────

    /// Reserve `count` consecutive employee numbers.
    ///
    /// Runs under SQLite's write lock (`BEGIN IMMEDIATE`), so two callers
    /// never get overlapping ranges. The range starts above both the
    /// persisted counter and the highest number already on file; numbers
    /// whose insert later fails are skipped, never reissued.
    pub fn reserve_emp_numbers(
        &self,
        prefix: &str,
        count: u64,
    ) -> WorkforceResult<RangeInclusive<u64>> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let counter: u64 = tx
            .query_row(
                "SELECT value FROM id_sequence WHERE name = ?1",
                params![EMP_NUMBER_SEQUENCE],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(|v| v.max(0) as u64)
            .unwrap_or(0);
        let on_file = max_suffix(Self::emp_numbers(&tx)?.iter().map(String::as_str), prefix);

        let range = plan_batch(counter.max(on_file), count)?;
        tx.execute(
            "INSERT INTO id_sequence (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            params![EMP_NUMBER_SEQUENCE, *range.end() as i64],
        )?;
        tx.commit()?;

        log::debug!(
            "reserved {prefix} numbers {}..={} (counter was {counter}, max on file {on_file})",
            range.start(),
            range.end()
        );
        Ok(range)
    }
}
