//! Seeded synthetic employee batches.
//!
//! RULE: a batch is numbered by the store's allocator and written in a
//! single transaction. Given the same seed and the same store state,
//! `generate` produces the same records. The RNG streams are keyed by the
//! seed and the first reserved number.

use crate::{
    clock::Clock,
    config::GenerationConfig,
    emp_number::{check_batch_size, EmpNumberFormat},
    employee::{Employee, SkillAssignment},
    error::WorkforceResult,
    name_generator::NameGenerator,
    rng::{RngBank, RngStream, SeededRng},
    store::WorkforceStore,
    types::{EntityId, Role, MAX_PROFICIENCY, MIN_PROFICIENCY},
};
use chrono::{Days, NaiveDate};

const DAYS_PER_YEAR: i64 = 365;

pub struct BatchGenerator<'a> {
    store: &'a WorkforceStore,
    config: &'a GenerationConfig,
    clock: &'a dyn Clock,
    seed: u64,
}

impl<'a> BatchGenerator<'a> {
    pub fn new(
        store: &'a WorkforceStore,
        config: &'a GenerationConfig,
        clock: &'a dyn Clock,
        seed: u64,
    ) -> Self {
        Self {
            store,
            config,
            clock,
            seed,
        }
    }

    /// Generate, number and insert `count` employees.
    ///
    /// Every generated employee holds every skill currently in the
    /// catalog. Fails with `ValidationFailed` unless
    /// `1 <= count <= max_batch`.
    pub fn generate(&self, count: i64) -> WorkforceResult<Vec<Employee>> {
        let count = check_batch_size(count, self.config.max_batch)?;
        let skill_ids: Vec<EntityId> = self
            .store
            .all_skills()?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let format = EmpNumberFormat::from_config(self.config);
        let numbers = self
            .store
            .reserve_emp_numbers(&format.prefix, count)?;
        let first = *numbers.start();

        // Mixing in the first number keeps consecutive batches drawn with
        // the same seed from repeating each other's ids.
        let bank = RngBank::new(self.seed ^ first.rotate_left(32));
        let mut streams = Streams {
            identity: bank.for_stream(RngStream::Identity),
            position: bank.for_stream(RngStream::Position),
            tenure: bank.for_stream(RngStream::Tenure),
            engagement: bank.for_stream(RngStream::Engagement),
            proficiency: bank.for_stream(RngStream::Proficiency),
            keys: bank.for_stream(RngStream::Keys),
        };

        let today = self.clock.today();
        let batch: Vec<Employee> = numbers
            .map(|n| self.build(&mut streams, &format.format(n), today, &skill_ids))
            .collect();

        self.store.insert_employees(&batch)?;
        log::info!(
            "generated {} employees ({}..={}) with {} skills each, seed {}",
            batch.len(),
            format.format(first),
            format.format(first + count - 1),
            skill_ids.len(),
            self.seed
        );
        Ok(batch)
    }

    fn build(
        &self,
        rng: &mut Streams,
        emp_number: &str,
        today: NaiveDate,
        skill_ids: &[EntityId],
    ) -> Employee {
        let name = NameGenerator::generate_full_name(&mut rng.identity);
        let email = NameGenerator::email_for(&name, emp_number, &self.config.email_domain);
        let position = NameGenerator::generate_job_title(&mut rng.position).to_string();

        let window = i64::from(self.config.hire_window_years) * DAYS_PER_YEAR;
        let days_ago = rng.tenure.range_inclusive(0, window) as u64;
        let hire_date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);

        let engagement_score =
            rng.engagement
                .range_inclusive(0, i64::from(self.config.max_engagement_score)) as u32;

        let skills = skill_ids
            .iter()
            .map(|skill_id| SkillAssignment {
                skill_id: skill_id.clone(),
                proficiency: rng.proficiency.range_inclusive(
                    i64::from(MIN_PROFICIENCY),
                    i64::from(MAX_PROFICIENCY),
                ) as u8,
            })
            .collect();

        Employee {
            id: deterministic_id(&mut rng.keys),
            emp_number: emp_number.to_string(),
            name,
            email,
            position,
            hire_date,
            role: Role::Employee,
            engagement_score,
            skills,
        }
    }
}

struct Streams {
    identity: SeededRng,
    position: SeededRng,
    tenure: SeededRng,
    engagement: SeededRng,
    proficiency: SeededRng,
    keys: SeededRng,
}

/// A v4-shaped uuid whose bytes come from the seeded stream.
fn deterministic_id(rng: &mut SeededRng) -> EntityId {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&rng.next_u64().to_le_bytes());
    bytes[8..].copy_from_slice(&rng.next_u64().to_le_bytes());
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}
