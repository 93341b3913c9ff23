//! workforce-runner: headless driver for the workforce skill analytics core.
//!
//! Usage:
//!   workforce-runner --db staff.db --seed-skills --generate 50 --seed 7
//!   workforce-runner --db staff.db --report difficulty --top-k 3
//!   workforce-runner --db staff.db --list employees --search ana --sort-by hireDate --order desc
//!   workforce-runner --db staff.db --score <employee-id> --today 2025-06-30

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::env;
use workforce_core::{
    clock::{Clock, FixedClock, SystemClock},
    config::WorkforceConfig,
    generator::BatchGenerator,
    registry::{EmployeeRegistry, SkillCatalog},
    report,
    search::PageRequest,
    skill::NewSkill,
    store::WorkforceStore,
};

const STARTER_SKILLS: &[(&str, &str)] = &[
    ("Rust", "Systems programming with ownership and borrowing"),
    ("SQL", "Relational querying and schema design"),
    ("TypeScript", "Typed JavaScript for web services and front ends"),
    ("Kubernetes", "Container orchestration and cluster operations"),
    ("Data Analysis", "Exploratory analysis and reporting"),
    ("Public Speaking", "Presenting to internal and external audiences"),
    ("Project Management", "Planning, tracking and delivering work"),
    ("Security", "Threat modelling and secure coding practice"),
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    db: String,
    seed: u64,
    employees: i64,
    skills: i64,
    generated: usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let generate = parse_arg(&args, "--generate", 0i64);
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    let config = match WorkforceConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e:#}; using built-in defaults");
            WorkforceConfig::default()
        }
    };

    let clock: Box<dyn Clock> = match flag_value(&args, "--today") {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("--today expects YYYY-MM-DD, got '{raw}'"))?;
            Box::new(FixedClock::new(date))
        }
        None => Box::new(SystemClock),
    };

    let store = WorkforceStore::open(db)?;
    store.migrate()?;
    let employees = EmployeeRegistry::new(&store, &config);
    let skills = SkillCatalog::new(&store, &config);

    if has_flag(&args, "--seed-skills") {
        let mut added = 0;
        for (name, description) in STARTER_SKILLS {
            if store.skill_by_name(name)?.is_none() {
                skills.create(NewSkill::new(*name, *description))?;
                added += 1;
            }
        }
        log::info!("seeded {added} starter skills");
    }

    let mut generated = 0;
    if generate != 0 {
        let batch = BatchGenerator::new(&store, &config.generation, &*clock, seed)
            .generate(generate)?;
        generated = batch.len();
    }

    if let Some(kind) = flag_value(&args, "--report") {
        match kind {
            "engagement" => print_json(&report::skill_engagement_report(&store)?)?,
            "difficulty" => {
                let top_k = flag_value(&args, "--top-k")
                    .and_then(|v| v.parse().ok())
                    .or(config.reports.difficulty_top_k);
                print_json(&report::skill_difficulty_ranking(&store, top_k)?)?
            }
            "popularity" => print_json(&report::skill_popularity_report(&store)?)?,
            "unassigned" => print_json(&skills.unassigned()?)?,
            "positions" => print_json(&report::employee_count_by_position(&store)?)?,
            "top" => {
                let n = flag_value(&args, "--top").and_then(|v| v.parse().ok());
                print_json(&employees.top_engaged(n)?)?
            }
            other => bail!(
                "unknown --report '{other}' \
                 (engagement|difficulty|popularity|unassigned|positions|top)"
            ),
        }
    }

    if let Some(kind) = flag_value(&args, "--list") {
        let request = page_request(&args);
        match kind {
            "employees" => print_json(&employees.search(&request)?)?,
            "skills" => print_json(&skills.search(&request)?)?,
            other => bail!("unknown --list '{other}' (employees|skills)"),
        }
    }

    if let Some(employee_id) = flag_value(&args, "--score") {
        let score = employees.engagement_score(employee_id, &*clock)?;
        print_json(&serde_json::json!({ "_id": employee_id, "engagementScore": score }))?;
    }

    let summary = RunSummary {
        db: db.to_string(),
        seed,
        employees: store.employee_count()?,
        skills: store.skill_count()?,
        generated,
    };
    log::info!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn page_request(args: &[String]) -> PageRequest {
    PageRequest {
        page: flag_value(args, "--page").and_then(|v| v.parse().ok()),
        limit: flag_value(args, "--limit").and_then(|v| v.parse().ok()),
        search: flag_value(args, "--search").map(str::to_string),
        sort_by: flag_value(args, "--sort-by").map(str::to_string),
        sort_order: flag_value(args, "--order").map(str::to_string),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
