//! Deterministic identity generation for synthetic employees.
//!
//! Names, job titles and email addresses come from curated lists.
//! Same RNG seed = same identities.

use crate::rng::SeededRng;

pub struct NameGenerator;

impl NameGenerator {
    /// Generate a full name (first + last) deterministically.
    pub fn generate_full_name(rng: &mut SeededRng) -> String {
        let first = rng.pick(Self::first_names()).copied().unwrap_or("Alex");
        let last = rng.pick(Self::last_names()).copied().unwrap_or("Morgan");
        format!("{first} {last}")
    }

    pub fn generate_job_title(rng: &mut SeededRng) -> &'static str {
        rng.pick(Self::job_titles()).copied().unwrap_or("Analyst")
    }

    /// Build a lowercase email from a name and the employee number.
    ///
    /// The number keeps addresses unique inside a batch even when the
    /// same name is drawn twice. Anything outside `[a-z0-9.]` is dropped
    /// from the local part.
    pub fn email_for(full_name: &str, emp_number: &str, domain: &str) -> String {
        let local: String = full_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(".")
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.')
            .collect();
        format!("{local}.{}@{domain}", emp_number.to_lowercase())
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "Aisha", "Alan", "Amara", "Andre", "Anika", "Arjun", "Beatriz", "Bruno",
            "Camille", "Carlos", "Chen", "Chloe", "Dara", "Diego", "Elena", "Emeka",
            "Farah", "Felix", "Grace", "Hana", "Hugo", "Ingrid", "Isaac", "Jonas",
            "Julia", "Kai", "Kavya", "Leila", "Liam", "Lucia", "Malik", "Marta",
            "Mateo", "Mei", "Nadia", "Nikhil", "Noor", "Olga", "Omar", "Priya",
            "Rafael", "Rosa", "Samir", "Sara", "Sofia", "Tariq", "Tomas", "Yara",
            "Yusuf", "Zoe",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Abara", "Andersen", "Baker", "Bianchi", "Castro", "Chen", "Costa", "Dubois",
            "Eriksen", "Fischer", "Garcia", "Gupta", "Haddad", "Hoffmann", "Ibrahim", "Ito",
            "Jansen", "Kim", "Kowalski", "Larsen", "Lopez", "Mendes", "Moreau", "Nakamura",
            "Novak", "Okafor", "Olsen", "Patel", "Petrov", "Quinn", "Rossi", "Santos",
            "Schmidt", "Silva", "Singh", "Tanaka", "Torres", "Varga", "Wagner", "Zhang",
        ]
    }

    fn job_titles() -> &'static [&'static str] {
        &[
            "Software Engineer", "Senior Software Engineer", "Data Analyst",
            "Data Engineer", "Product Manager", "QA Engineer", "DevOps Engineer",
            "UX Designer", "Technical Writer", "Engineering Manager",
            "Business Analyst", "Security Engineer", "Support Specialist",
            "Solutions Architect", "Scrum Master",
        ]
    }
}
