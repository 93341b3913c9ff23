use chrono::NaiveDate;
use std::{collections::HashSet, thread};
use workforce_core::{
    clock::FixedClock,
    config::WorkforceConfig,
    emp_number::{parse_suffix, EmpNumberFormat},
    employee::NewEmployee,
    error::WorkforceError,
    generator::BatchGenerator,
    registry::EmployeeRegistry,
    store::WorkforceStore,
    types::Role,
};

// ── Test helpers ────────────────────────────────────────────────────────────

fn new_employee(emp_number: &str) -> NewEmployee {
    let _ = env_logger::builder().is_test(true).try_init();
    NewEmployee {
        emp_number: emp_number.into(),
        name: format!("Holder {emp_number}"),
        email: format!("{}@example.com", emp_number.to_lowercase()),
        position: "Clerk".into(),
        hire_date: NaiveDate::from_ymd_opt(2020, 5, 5).unwrap(),
        role: Role::Employee,
        engagement_score: None,
        skills: Vec::new(),
    }
}

fn temp_db_path(tag: &str) -> String {
    let dir = std::env::temp_dir();
    dir.join(format!("workforce-{tag}-{}.db", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn generated_batch_continues_from_highest_existing_number() {
    let store = WorkforceStore::in_memory_migrated().unwrap();
    let config = WorkforceConfig::default_test();
    let registry = EmployeeRegistry::new(&store, &config);
    registry.create(new_employee("EMP005")).unwrap();
    registry.create(new_employee("EMP012")).unwrap();
    registry.create(new_employee("LEGACY-99")).unwrap();

    let clock = FixedClock::ymd(2025, 6, 30).unwrap();
    let batch = BatchGenerator::new(&store, &config.generation, &clock, 9)
        .generate(4)
        .unwrap();

    let numbers: Vec<&str> = batch.iter().map(|e| e.emp_number.as_str()).collect();
    assert_eq!(numbers, vec!["EMP013", "EMP014", "EMP015", "EMP016"]);
    for (offset, e) in batch.iter().enumerate() {
        assert_eq!(parse_suffix(&e.emp_number, "EMP"), Some(13 + offset as u64));
        assert!(registry.get_by_emp_number(&e.emp_number).is_ok(), "inserted");
    }
    assert_eq!(store.employee_count().unwrap(), 7);
}

#[test]
fn abandoned_reservation_leaves_a_gap_not_a_collision() {
    let store = WorkforceStore::in_memory_migrated().unwrap();
    let config = WorkforceConfig::default_test();
    let abandoned = store.reserve_emp_numbers("EMP", 3).unwrap();
    assert_eq!(abandoned, 1..=3);

    let clock = FixedClock::ymd(2025, 1, 1).unwrap();
    let batch = BatchGenerator::new(&store, &config.generation, &clock, 1)
        .generate(2)
        .unwrap();
    assert_eq!(batch[0].emp_number, "EMP004");
    assert_eq!(batch[1].emp_number, "EMP005");
}

#[test]
fn invalid_batch_sizes_are_rejected_before_reserving() {
    let store = WorkforceStore::in_memory_migrated().unwrap();
    let config = WorkforceConfig::default_test();
    let clock = FixedClock::ymd(2025, 1, 1).unwrap();
    let generator = BatchGenerator::new(&store, &config.generation, &clock, 1);

    for n in [0, -1, 1_001] {
        match generator.generate(n) {
            Err(WorkforceError::ValidationFailed(_)) => {}
            other => panic!("batch of {n} should fail validation, got {other:?}"),
        }
    }
    assert_eq!(store.reserve_emp_numbers("EMP", 1).unwrap(), 1..=1);
}

#[test]
fn failed_batch_insert_commits_nothing() {
    let store = WorkforceStore::in_memory_migrated().unwrap();
    let config = WorkforceConfig::default_test();
    let registry = EmployeeRegistry::new(&store, &config);
    let existing = registry.create(new_employee("EMP001")).unwrap();

    let clock = FixedClock::ymd(2025, 1, 1).unwrap();
    let mut batch = BatchGenerator::new(&store, &config.generation, &clock, 3)
        .generate(2)
        .unwrap();
    assert_eq!(store.employee_count().unwrap(), 3);

    // Second record reuses an email that is already on file.
    for (i, e) in batch.iter_mut().enumerate() {
        e.id = format!("dup-{i}");
        e.emp_number = format!("EMP9{i}");
        e.email = if i == 1 { existing.email.clone() } else { "fresh@example.com".into() };
    }
    assert!(store.insert_employees(&batch).is_err());
    assert_eq!(store.employee_count().unwrap(), 3, "whole batch rolled back");
    assert!(store.get_employee("dup-0").unwrap().is_none());
}

#[test]
fn concurrent_reservations_never_overlap() {
    let path = temp_db_path("reserve");
    WorkforceStore::open(&path).unwrap().migrate().unwrap();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let path = path.clone();
            thread::spawn(move || {
                let store = WorkforceStore::open(&path).unwrap();
                (0..25)
                    .map(|_| store.reserve_emp_numbers("EMP", 4).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for worker in workers {
        for range in worker.join().unwrap() {
            for n in range {
                assert!(seen.insert(n), "number {n} handed out twice");
            }
        }
    }
    assert_eq!(seen.len(), 4 * 25 * 4);
    assert_eq!(seen.iter().max(), Some(&400));

    let rendered = EmpNumberFormat::default().format(400);
    assert_eq!(rendered, "EMP400");

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
}
