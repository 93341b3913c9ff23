use chrono::NaiveDate;
use workforce_core::{
    config::WorkforceConfig,
    employee::{EmployeeUpdate, NewEmployee, SkillAssignment},
    error::WorkforceError,
    registry::{EmployeeRegistry, SkillCatalog},
    report::skill_popularity_report,
    search::PageRequest,
    skill::{NewSkill, SkillUpdate},
    store::WorkforceStore,
    types::{new_entity_id, Role},
};

// ── Test helpers ────────────────────────────────────────────────────────────

fn setup() -> (WorkforceStore, WorkforceConfig) {
    let _ = env_logger::builder().is_test(true).try_init();
    (
        WorkforceStore::in_memory_migrated().unwrap(),
        WorkforceConfig::default_test(),
    )
}

fn new_employee(n: u32, name: &str) -> NewEmployee {
    NewEmployee {
        emp_number: format!("EMP{n:03}"),
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        position: "Engineer".into(),
        hire_date: NaiveDate::from_ymd_opt(2022, 2, 2).unwrap(),
        role: Role::Employee,
        engagement_score: None,
        skills: Vec::new(),
    }
}

// ── Employees ───────────────────────────────────────────────────────────────

#[test]
fn create_defaults_and_lookups() {
    let (store, config) = setup();
    let employees = EmployeeRegistry::new(&store, &config);
    let created = employees.create(new_employee(1, "Ada Obi")).unwrap();

    assert_eq!(created.engagement_score, 0);
    assert_eq!(created.role, Role::Employee);
    assert_eq!(employees.get(&created.id).unwrap(), created);
    assert_eq!(employees.get_by_emp_number("EMP001").unwrap().id, created.id);
    assert_eq!(
        employees.find_by_email("ada.obi@example.com").unwrap().map(|e| e.id),
        Some(created.id)
    );
    assert!(employees.find_by_email("nobody@example.com").unwrap().is_none());
}

#[test]
fn duplicate_emp_number_or_email_is_rejected() {
    let (store, config) = setup();
    let employees = EmployeeRegistry::new(&store, &config);
    employees.create(new_employee(1, "Ada Obi")).unwrap();

    let err = employees.create(new_employee(1, "Ben Roy")).unwrap_err();
    assert!(matches!(
        err,
        WorkforceError::UniquenessViolation { field: "empNumber", .. }
    ));

    let mut clash = new_employee(2, "Ben Roy");
    clash.email = "ada.obi@example.com".into();
    let err = employees.create(clash).unwrap_err();
    assert!(matches!(
        err,
        WorkforceError::UniquenessViolation { field: "email", .. }
    ));
    assert_eq!(employees.list().unwrap().len(), 1);
}

#[test]
fn create_rejects_assignment_to_unknown_skill() {
    let (store, config) = setup();
    let employees = EmployeeRegistry::new(&store, &config);
    let rust = SkillCatalog::new(&store, &config)
        .create(NewSkill::new("Rust", "systems"))
        .unwrap();

    let mut ada = new_employee(1, "Ada Obi");
    ada.skills = vec![
        SkillAssignment { skill_id: rust.id.clone(), proficiency: 7 },
        SkillAssignment { skill_id: "no-such-skill".into(), proficiency: 5 },
    ];
    let err = employees.create(ada).unwrap_err();
    assert!(matches!(
        err,
        WorkforceError::NotFound { entity: "skill", ref id } if id == "no-such-skill"
    ));
    assert!(employees.list().unwrap().is_empty());

    let mut ada = new_employee(1, "Ada Obi");
    ada.skills = vec![SkillAssignment { skill_id: rust.id.clone(), proficiency: 7 }];
    let created = employees.create(ada).unwrap();
    assert_eq!(created.skills.len(), 1);
}

#[test]
fn constraint_failures_surface_as_uniqueness_violations() {
    // Writes that bypass the registry checks, as a racing writer would.
    let (store, _config) = setup();
    let ada = new_employee(1, "Ada Obi").into_employee(new_entity_id()).unwrap();
    store.insert_employee(&ada).unwrap();

    let mut same_email = new_employee(2, "Ben Roy").into_employee(new_entity_id()).unwrap();
    same_email.email = ada.email.clone();
    let err = store.insert_employee(&same_email).unwrap_err();
    assert!(matches!(
        err,
        WorkforceError::UniquenessViolation { field: "email", ref value } if value == "ada.obi@example.com"
    ));

    let same_number = new_employee(1, "Cy Dee").into_employee(new_entity_id()).unwrap();
    let err = store.insert_employee(&same_number).unwrap_err();
    assert!(matches!(
        err,
        WorkforceError::UniquenessViolation { field: "empNumber", .. }
    ));

    store
        .insert_skill(&NewSkill::new("Rust", "systems").into_skill(new_entity_id()))
        .unwrap();
    let err = store
        .insert_skill(&NewSkill::new("Rust", "again").into_skill(new_entity_id()))
        .unwrap_err();
    assert!(matches!(
        err,
        WorkforceError::UniquenessViolation { field: "name", .. }
    ));
    assert_eq!(store.employee_count().unwrap(), 1);
}

#[test]
fn update_rechecks_uniqueness_only_when_changed() {
    let (store, config) = setup();
    let employees = EmployeeRegistry::new(&store, &config);
    let ada = employees.create(new_employee(1, "Ada Obi")).unwrap();
    employees.create(new_employee(2, "Ben Roy")).unwrap();

    let same = EmployeeUpdate {
        email: Some(ada.email.clone()),
        position: Some("Lead".into()),
        ..Default::default()
    };
    let updated = employees.update(&ada.id, same).unwrap();
    assert_eq!(updated.position, "Lead");
    assert_eq!(employees.get(&ada.id).unwrap().position, "Lead");

    let taken = EmployeeUpdate {
        emp_number: Some("EMP002".into()),
        ..Default::default()
    };
    assert!(matches!(
        employees.update(&ada.id, taken),
        Err(WorkforceError::UniquenessViolation { .. })
    ));
    assert!(matches!(
        employees.update("missing", EmployeeUpdate::default()),
        Err(WorkforceError::NotFound { .. })
    ));
}

#[test]
fn assign_skill_upserts_in_place() {
    let (store, config) = setup();
    let employees = EmployeeRegistry::new(&store, &config);
    let skills = SkillCatalog::new(&store, &config);
    let ada = employees.create(new_employee(1, "Ada Obi")).unwrap();
    let rust = skills.create(NewSkill::new("Rust", "")).unwrap();
    let sql = skills.create(NewSkill::new("SQL", "")).unwrap();

    employees.assign_skill(&ada.id, &rust.id, 4).unwrap();
    employees.assign_skill(&ada.id, &sql.id, 6).unwrap();
    let after = employees.assign_skill(&ada.id, &rust.id, 9).unwrap();

    let stored = employees.get(&ada.id).unwrap();
    assert_eq!(stored.skills, after.skills);
    let pairs: Vec<(&str, u8)> = stored
        .skills
        .iter()
        .map(|s| (s.skill_id.as_str(), s.proficiency))
        .collect();
    assert_eq!(pairs, vec![(rust.id.as_str(), 9), (sql.id.as_str(), 6)]);
}

#[test]
fn assign_skill_validates_in_order() {
    let (store, config) = setup();
    let employees = EmployeeRegistry::new(&store, &config);
    let skills = SkillCatalog::new(&store, &config);
    let ada = employees.create(new_employee(1, "Ada Obi")).unwrap();
    let rust = skills.create(NewSkill::new("Rust", "")).unwrap();

    assert!(matches!(
        employees.assign_skill("ghost", &rust.id, 5),
        Err(WorkforceError::NotFound { entity: "employee", .. })
    ));
    assert!(matches!(
        employees.assign_skill(&ada.id, "ghost", 5),
        Err(WorkforceError::NotFound { entity: "skill", .. })
    ));
    for bad in [0, 11, -3] {
        assert!(matches!(
            employees.assign_skill(&ada.id, &rust.id, bad),
            Err(WorkforceError::ValidationFailed(_))
        ));
    }
    assert!(employees.get(&ada.id).unwrap().skills.is_empty());
}

#[test]
fn delete_employee_removes_assignments() {
    let (store, config) = setup();
    let employees = EmployeeRegistry::new(&store, &config);
    let skills = SkillCatalog::new(&store, &config);
    let ada = employees.create(new_employee(1, "Ada Obi")).unwrap();
    let rust = skills.create(NewSkill::new("Rust", "")).unwrap();
    employees.assign_skill(&ada.id, &rust.id, 7).unwrap();

    let removed = employees.delete(&ada.id).unwrap();
    assert_eq!(removed.id, ada.id);
    assert!(matches!(employees.get(&ada.id), Err(WorkforceError::NotFound { .. })));
    assert_eq!(skill_popularity_report(&store).unwrap()[0].total_employees, 0);
}

// ── Skills ──────────────────────────────────────────────────────────────────

#[test]
fn skill_names_are_unique() {
    let (store, config) = setup();
    let skills = SkillCatalog::new(&store, &config);
    let rust = skills.create(NewSkill::new("Rust", "systems")).unwrap();
    skills.create(NewSkill::new("Go", "")).unwrap();

    assert!(matches!(
        skills.create(NewSkill::new("Rust", "again")),
        Err(WorkforceError::UniquenessViolation { field: "name", .. })
    ));
    assert!(matches!(
        skills.update(&rust.id, SkillUpdate { name: Some("Go".into()), description: None }),
        Err(WorkforceError::UniquenessViolation { .. })
    ));
    let renamed = skills
        .update(&rust.id, SkillUpdate { name: None, description: Some("memory safe".into()) })
        .unwrap();
    assert_eq!(renamed.description, "memory safe");
    assert_eq!(skills.total().unwrap(), 2);
    let sorted: Vec<String> = skills.sorted_by_name().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(sorted, vec!["Go", "Rust"]);
}

#[test]
fn deleted_skill_leaves_a_dangling_reference() {
    let (store, config) = setup();
    let employees = EmployeeRegistry::new(&store, &config);
    let skills = SkillCatalog::new(&store, &config);
    let ada = employees.create(new_employee(1, "Ada Obi")).unwrap();
    let rust = skills.create(NewSkill::new("Rust", "")).unwrap();
    let sql = skills.create(NewSkill::new("SQL", "")).unwrap();
    employees.assign_skill(&ada.id, &rust.id, 7).unwrap();
    employees.assign_skill(&ada.id, &sql.id, 3).unwrap();

    skills.delete(&rust.id).unwrap();

    let stored = employees.get(&ada.id).unwrap();
    assert_eq!(stored.skills.len(), 2, "assignment survives its skill");

    let detailed = employees.list_with_skill_details().unwrap();
    let names: Vec<&str> = detailed[0].skill_details.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["SQL"], "dangling id skipped");

    let popularity = skill_popularity_report(&store).unwrap();
    assert_eq!(popularity.len(), 1);
    assert_eq!(popularity[0].total_employees, 1);
    assert!(skills.unassigned().unwrap().is_empty());
}

#[test]
fn registry_search_uses_configured_limits() {
    let (store, mut config) = setup();
    config.pagination.default_limit = 2;
    let employees = EmployeeRegistry::new(&store, &config);
    for (n, name) in ["Ann Lee", "Bo Lin", "Cy Low"].iter().enumerate() {
        employees.create(new_employee(n as u32 + 1, name)).unwrap();
    }
    let page = employees.search(&PageRequest::new().search("l")).unwrap();
    assert_eq!(page.limit, 2);
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data[0].emp_number, "EMP001");
}
