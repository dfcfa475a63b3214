//! Pre-built datasets for common testing scenarios.

use serde::{Deserialize, Serialize};

/// Job family of an [`Employee`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Engineer,
    Manager,
    Sales,
}

/// A small record with a name, a salary and a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub salary: i32,
    pub role: Role,
}

impl Employee {
    #[must_use]
    pub fn new(name: &str, salary: i32, role: Role) -> Self {
        Self {
            name: name.to_string(),
            salary,
            role,
        }
    }
}

/// Three employees: A earns 1,000,000, B 1,200,000 and C 1,050,000.
///
/// # Example
///
/// ```
/// use ironstream::*;
/// use ironstream::ordering::{comparing, reverse};
/// use ironstream::testing::sample_employees;
///
/// let names: Vec<String> = from_vec(sample_employees())
///     .filter(|e| e.salary >= 1_050_000)
///     .sorted_by(reverse(comparing(|e: &ironstream::testing::Employee| e.salary)))
///     .map(|e| e.name.clone())
///     .collect_vec()
///     .unwrap();
/// assert_eq!(names, vec!["B", "C"]);
/// ```
#[must_use]
pub fn sample_employees() -> Vec<Employee> {
    vec![
        Employee::new("A", 1_000_000, Role::Engineer),
        Employee::new("B", 1_200_000, Role::Manager),
        Employee::new("C", 1_050_000, Role::Engineer),
    ]
}

/// A larger roster with repeated salaries and every role represented.
#[must_use]
pub fn sample_roster() -> Vec<Employee> {
    vec![
        Employee::new("Ada", 1_300_000, Role::Engineer),
        Employee::new("Bo", 900_000, Role::Sales),
        Employee::new("Cy", 1_100_000, Role::Manager),
        Employee::new("Di", 900_000, Role::Engineer),
        Employee::new("Ed", 1_050_000, Role::Sales),
        Employee::new("Flo", 1_100_000, Role::Engineer),
        Employee::new("Gus", 750_000, Role::Sales),
        Employee::new("Hal", 1_250_000, Role::Manager),
    ]
}
