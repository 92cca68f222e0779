//! Shared fixtures for unit tests

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{Schema, Shape, ValueKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub owner: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub priority: i64,
    pub estimate_hours: f64,
    pub budget: Decimal,
    pub due_date: Option<DateTime<Utc>>,
    pub is_billable: bool,
    pub manager: Option<User>,
    pub project: Option<Project>,
}

impl Shape for User {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: Lazy<Schema<User>> = Lazy::new(|| {
            Schema::builder("User")
                .field("id", ValueKind::Uuid, |u: &User| u.id)
                .field("fullName", ValueKind::Text, |u: &User| u.full_name.clone())
                .field("email", ValueKind::Text, |u: &User| u.email.clone())
                .build()
        });
        &SCHEMA
    }
}

impl Shape for Project {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: Lazy<Schema<Project>> = Lazy::new(|| {
            Schema::builder("Project")
                .field("id", ValueKind::Uuid, |p: &Project| p.id)
                .field("name", ValueKind::Text, |p: &Project| p.name.clone())
                .nested("owner", |p: &Project| p.owner.as_ref())
                .build()
        });
        &SCHEMA
    }
}

impl Shape for Task {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: Lazy<Schema<Task>> = Lazy::new(|| {
            Schema::builder("Task")
                .field("id", ValueKind::Uuid, |t: &Task| t.id)
                .field("name", ValueKind::Text, |t: &Task| t.name.clone())
                .field("status", ValueKind::Text, |t: &Task| t.status.clone())
                .field("priority", ValueKind::Integer, |t: &Task| t.priority)
                .field("estimateHours", ValueKind::Float, |t: &Task| t.estimate_hours)
                .field("budget", ValueKind::Decimal, |t: &Task| t.budget)
                .optional_field("dueDate", ValueKind::Timestamp, |t: &Task| t.due_date)
                .field("isBillable", ValueKind::Boolean, |t: &Task| t.is_billable)
                .nested("manager", |t: &Task| t.manager.as_ref())
                .nested("project", |t: &Task| t.project.as_ref())
                .build()
        });
        &SCHEMA
    }
}

pub fn ada() -> User {
    User {
        id: Uuid::from_u128(0xa1),
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
    }
}

pub fn linus() -> User {
    User {
        id: Uuid::from_u128(0xa2),
        full_name: "Linus Torvalds".to_string(),
        email: "linus@example.com".to_string(),
    }
}

pub fn grace() -> User {
    User {
        id: Uuid::from_u128(0xa3),
        full_name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
    }
}

pub fn apollo() -> Project {
    Project {
        id: Uuid::from_u128(0xb1),
        name: "Apollo".to_string(),
        owner: Some(grace()),
    }
}

pub fn hermes() -> Project {
    Project {
        id: Uuid::from_u128(0xb2),
        name: "Hermes".to_string(),
        owner: None,
    }
}

pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn task(
    n: u128,
    name: &str,
    status: &str,
    priority: i64,
    estimate_hours: f64,
    budget: Decimal,
    due_date: Option<DateTime<Utc>>,
    is_billable: bool,
    manager: Option<User>,
    project: Option<Project>,
) -> Task {
    Task {
        id: Uuid::from_u128(n),
        name: name.to_string(),
        status: status.to_string(),
        priority,
        estimate_hours,
        budget,
        due_date,
        is_billable,
        manager,
        project,
    }
}

/// Five tasks:
///
/// | # | name | status | priority | due | manager | project |
/// |---|------|--------|----------|-----|---------|---------|
/// | 0 | Write proposal | Completed | 3 | 2024-11-15 | Ada | Apollo |
/// | 1 | Design schema | InProgress | 5 | 2025-02-01 | Linus | Apollo |
/// | 2 | Review PR | Completed | 1 | 2025-03-10 | Ada | Hermes |
/// | 3 | Deploy | Pending | 4 | none | none | none |
/// | 4 | Fix login bug | Completed | 2 | 2024-12-31 | Linus | Hermes |
pub fn sample_tasks() -> Vec<Task> {
    vec![
        task(
            1,
            "Write proposal",
            "Completed",
            3,
            4.5,
            Decimal::new(120_000, 2),
            Some(date(2024, 11, 15)),
            true,
            Some(ada()),
            Some(apollo()),
        ),
        task(
            2,
            "Design schema",
            "InProgress",
            5,
            8.0,
            Decimal::new(30_050, 2),
            Some(date(2025, 2, 1)),
            false,
            Some(linus()),
            Some(apollo()),
        ),
        task(
            3,
            "Review PR",
            "Completed",
            1,
            1.0,
            Decimal::new(9_999, 2),
            Some(date(2025, 3, 10)),
            true,
            Some(ada()),
            Some(hermes()),
        ),
        task(
            4,
            "Deploy",
            "Pending",
            4,
            2.5,
            Decimal::ZERO,
            None,
            false,
            None,
            None,
        ),
        task(
            5,
            "Fix login bug",
            "Completed",
            2,
            3.0,
            Decimal::new(45_000, 2),
            Some(date(2024, 12, 31)),
            true,
            Some(linus()),
            Some(hermes()),
        ),
    ]
}

/// `count` tasks named `Task 01`, `Task 02`, ... with priority equal to their number
pub fn numbered_tasks(count: usize) -> Vec<Task> {
    (1..=count)
        .map(|n| {
            task(
                n as u128,
                &format!("Task {:02}", n),
                "Pending",
                n as i64,
                1.0,
                Decimal::ONE,
                None,
                false,
                None,
                None,
            )
        })
        .collect()
}

pub fn names(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.name.as_str()).collect()
}
