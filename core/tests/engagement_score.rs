use chrono::NaiveDate;
use workforce_core::{
    clock::FixedClock,
    config::WorkforceConfig,
    employee::{NewEmployee, SkillAssignment},
    engagement_score::compute_engagement_score,
    error::WorkforceError,
    registry::EmployeeRegistry,
    skill::NewSkill,
    store::WorkforceStore,
    types::Role,
};

// ── Test helpers ────────────────────────────────────────────────────────────

fn hire(store: &WorkforceStore, hire_date: NaiveDate, skill_count: usize) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = WorkforceConfig::default_test();
    for i in 0..skill_count {
        let id = format!("s{i}");
        if store.get_skill(&id).unwrap().is_none() {
            store
                .insert_skill(&NewSkill::new(format!("Skill {i}"), "").into_skill(id))
                .unwrap();
        }
    }
    EmployeeRegistry::new(store, &config)
        .create(NewEmployee {
            emp_number: format!("EMP{}", hire_date.format("%Y%m%d")),
            name: "Tenure Test".into(),
            email: format!("tenure.{}@example.com", hire_date),
            position: "Analyst".into(),
            hire_date,
            role: Role::Employee,
            engagement_score: None,
            skills: (0..skill_count)
                .map(|i| SkillAssignment {
                    skill_id: format!("s{i}"),
                    proficiency: 5,
                })
                .collect(),
        })
        .unwrap()
        .id
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn three_skills_five_years() {
    let store = WorkforceStore::in_memory_migrated().unwrap();
    let id = hire(&store, NaiveDate::from_ymd_opt(2020, 11, 30).unwrap(), 3);
    let clock = FixedClock::ymd(2025, 1, 2).unwrap();
    assert_eq!(compute_engagement_score(&store, &id, &clock).unwrap(), 55);
}

#[test]
fn tenure_counts_calendar_years_only() {
    let store = WorkforceStore::in_memory_migrated().unwrap();
    let id = hire(&store, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), 0);
    // One day of service, one calendar year of tenure.
    let clock = FixedClock::ymd(2025, 1, 1).unwrap();
    assert_eq!(compute_engagement_score(&store, &id, &clock).unwrap(), 5);
}

#[test]
fn future_hire_date_scores_negative() {
    let store = WorkforceStore::in_memory_migrated().unwrap();
    let id = hire(&store, NaiveDate::from_ymd_opt(2027, 3, 1).unwrap(), 1);
    let clock = FixedClock::ymd(2025, 6, 1).unwrap();
    assert_eq!(compute_engagement_score(&store, &id, &clock).unwrap(), 0);

    let id = hire(&store, NaiveDate::from_ymd_opt(2028, 3, 1).unwrap(), 0);
    assert_eq!(compute_engagement_score(&store, &id, &clock).unwrap(), -15);
}

#[test]
fn unknown_employee_is_not_found() {
    let store = WorkforceStore::in_memory_migrated().unwrap();
    let clock = FixedClock::ymd(2025, 6, 1).unwrap();
    match compute_engagement_score(&store, "nobody", &clock) {
        Err(WorkforceError::NotFound { entity, id }) => {
            assert_eq!(entity, "employee");
            assert_eq!(id, "nobody");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}
