//! Sequential employee-number allocation.
//!
//! Numbers look like `EMP042`: a fixed prefix and a zero-padded decimal
//! suffix. Parsing, formatting and range planning are pure; reserving a
//! range against stored data is `WorkforceStore::reserve_emp_numbers`.

use crate::{
    config::GenerationConfig,
    error::{WorkforceError, WorkforceResult},
};
use std::ops::RangeInclusive;

/// Numeric suffix of `value`, or `None` when it does not carry `prefix`
/// followed by decimal digits only.
pub fn parse_suffix(value: &str, prefix: &str) -> Option<u64> {
    let digits = value.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Highest suffix among `values`; 0 when none parse.
pub fn max_suffix<'a>(values: impl IntoIterator<Item = &'a str>, prefix: &str) -> u64 {
    values
        .into_iter()
        .filter_map(|v| parse_suffix(v, prefix))
        .max()
        .unwrap_or(0)
}

/// `format_number(7, "EMP", 3)` → `EMP007`. Wider numbers are not cut.
pub fn format_number(n: u64, prefix: &str, width: usize) -> String {
    format!("{prefix}{n:0width$}")
}

/// Numbers `max + 1 ..= max + count`.
pub fn plan_batch(max: u64, count: u64) -> WorkforceResult<RangeInclusive<u64>> {
    if count == 0 {
        return Err(WorkforceError::ValidationFailed(
            "batch size must be at least 1".into(),
        ));
    }
    let start = max.checked_add(1);
    let end = max.checked_add(count);
    match (start, end) {
        (Some(start), Some(end)) => Ok(start..=end),
        _ => Err(WorkforceError::ValidationFailed(format!(
            "employee number space exhausted after {max}"
        ))),
    }
}

/// Reject batch sizes outside `1..=max_batch`.
pub fn check_batch_size(count: i64, max_batch: u64) -> WorkforceResult<u64> {
    if count < 1 || count as u64 > max_batch {
        return Err(WorkforceError::ValidationFailed(format!(
            "batch size must be between 1 and {max_batch}, got {count}"
        )));
    }
    Ok(count as u64)
}

/// Prefix and width taken from the generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmpNumberFormat {
    pub prefix: String,
    pub width: usize,
}

impl EmpNumberFormat {
    pub fn from_config(cfg: &GenerationConfig) -> Self {
        Self {
            prefix: cfg.emp_number_prefix.clone(),
            width: cfg.emp_number_width,
        }
    }

    pub fn format(&self, n: u64) -> String {
        format_number(n, &self.prefix, self.width)
    }

    pub fn parse(&self, value: &str) -> Option<u64> {
        parse_suffix(value, &self.prefix)
    }

    pub fn render(&self, range: RangeInclusive<u64>) -> Vec<String> {
        range.map(|n| self.format(n)).collect()
    }
}

impl Default for EmpNumberFormat {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}
