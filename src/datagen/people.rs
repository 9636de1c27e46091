//! Synthetic demographic records: parents with mailing, employment and
//! finance details, plus their children. Seeded and injectable; callers
//! that want a different vendor implement `PersonSource`.

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::datagen::{deterministic_uuid, standard_normal};

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Noah", "Olivia", "Liam", "Emma", "Ava", "Lucas",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Taylor",
];

const STREETS: &[&str] = &[
    "Maple St", "Oak Ave", "Cedar Ln", "Pine Rd", "Elm Dr", "Birch Ct", "Walnut Blvd",
    "Chestnut Way",
];

const CITIES: &[(&str, &str)] = &[
    ("Springfield", "IL"),
    ("Madison", "WI"),
    ("Portland", "OR"),
    ("Austin", "TX"),
    ("Denver", "CO"),
    ("Raleigh", "NC"),
    ("Columbus", "OH"),
    ("Phoenix", "AZ"),
];

/// Jobs with their average salary in thousands, matching the shape of the
/// source dataset's salary table. Average 0 means unemployed.
const JOBS: &[(&str, f64)] = &[
    ("Teacher", 45.0),
    ("Software engineer", 120.0),
    ("Nurse", 76.0),
    ("Surgeon", 210.0),
    ("Electrician", 65.0),
    ("Accountant", 67.0),
    ("Lawyer", 165.0),
    ("Pharmacist", 95.0),
    ("Retail clerk", 29.0),
    ("Chef", 43.0),
    ("Plumber", 55.0),
    ("Pilot", 95.0),
    ("Journalist", 44.0),
    ("Architect", 84.0),
    ("Unemployed", 0.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Parent {
    pub parent_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: i32,
    pub job: String,
    pub salary: f64,
    pub start_date: NaiveDate,
    pub bank_act: String,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    pub child_id: Uuid,
    pub parent1_id: Uuid,
    pub parent2_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub same_residence: bool,
    pub is_student: bool,
    pub is_employed: bool,
}

/// Opaque source of synthetic people.
pub trait PersonSource {
    fn next_parent(&mut self) -> Parent;
    fn next_child(&mut self, parent1: &Parent, parent2: Option<&Parent>) -> Child;
}

/// Seeded generator; the same seed reproduces the same people.
pub struct SeededPeople {
    rng: ChaCha8Rng,
}

impl SeededPeople {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn pick<'a>(&mut self, list: &'a [&'a str]) -> &'a str {
        list[self.rng.gen_range(0..list.len())]
    }

    /// Salary around the job average, floored at a tenth of it, with a
    /// rare outlier for the top of the field. Zero average stays zero.
    fn salary_for(&mut self, avg: f64) -> f64 {
        if avg == 0.0 {
            return 0.0;
        }
        let base = (avg + standard_normal(&mut self.rng) * avg / 4.0).max(avg / 10.0);
        if self.rng.gen_bool(0.05) {
            base * self.rng.gen_range(2.0..6.0)
        } else {
            base
        }
    }

    /// Savings scale with salary and tenure; negative means debt. The
    /// unemployed get a small noisy balance either side of zero.
    fn savings_for(&mut self, salary: f64, years: f64) -> f64 {
        if salary == 0.0 {
            return standard_normal(&mut self.rng) * 25.0;
        }
        salary * years / 4.0 + standard_normal(&mut self.rng) * salary / 8.0
    }
}

impl PersonSource for SeededPeople {
    fn next_parent(&mut self) -> Parent {
        let (city, state) = CITIES[self.rng.gen_range(0..CITIES.len())];
        let (job, avg_salary) = JOBS[self.rng.gen_range(0..JOBS.len())];

        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 8, 15).unwrap();
        let span = (end - start).num_days();
        let start_date = start + chrono::Duration::days(self.rng.gen_range(0..span));
        let years = (end - start_date).num_days() as f64 / 365.25;

        let salary = self.salary_for(avg_salary);
        let savings = self.savings_for(salary, years);

        Parent {
            parent_id: deterministic_uuid(&mut self.rng),
            first_name: self.pick(FIRST_NAMES).to_string(),
            last_name: self.pick(LAST_NAMES).to_string(),
            address: format!("{} {}", self.rng.gen_range(1..9999), self.pick(STREETS)),
            city: city.to_string(),
            state: state.to_string(),
            zip: self.rng.gen_range(10_000..99_999),
            job: job.to_string(),
            salary,
            start_date,
            bank_act: format!("{:020}", self.rng.gen_range(0..u64::MAX)),
            savings,
        }
    }

    fn next_child(&mut self, parent1: &Parent, parent2: Option<&Parent>) -> Child {
        let is_student = self.rng.gen_bool(0.6);
        Child {
            child_id: deterministic_uuid(&mut self.rng),
            parent1_id: parent1.parent_id,
            parent2_id: parent2.map(|p| p.parent_id),
            first_name: self.pick(FIRST_NAMES).to_string(),
            last_name: parent1.last_name.clone(),
            same_residence: self.rng.gen_bool(0.7),
            is_student,
            is_employed: if is_student {
                self.rng.gen_bool(0.2)
            } else {
                self.rng.gen_bool(0.8)
            },
        }
    }
}

/// Generate `households` parents (some with a co-parent) and their children.
pub fn generate_households(households: usize, seed: u64) -> (Vec<Parent>, Vec<Child>) {
    let mut source = SeededPeople::new(seed);
    let mut shuffle_rng = ChaCha8Rng::seed_from_u64(seed ^ 0x9e3779b97f4a7c15);

    let mut parents = Vec::new();
    let mut children = Vec::new();

    for _ in 0..households {
        let parent1 = source.next_parent();
        let parent2 = if shuffle_rng.gen_bool(0.65) {
            let mut p = source.next_parent();
            p.last_name = parent1.last_name.clone();
            p.address = parent1.address.clone();
            p.city = parent1.city.clone();
            p.state = parent1.state.clone();
            p.zip = parent1.zip;
            Some(p)
        } else {
            None
        };

        for _ in 0..shuffle_rng.gen_range(0..4) {
            children.push(source.next_child(&parent1, parent2.as_ref()));
        }

        parents.push(parent1);
        if let Some(p) = parent2 {
            parents.push(p);
        }
    }

    (parents, children)
}
