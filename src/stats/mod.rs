//! Derived statistics behind the dashboard charts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{AttendanceSession, Category, Student};

/// Presence totals for one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: i64,
    pub present: usize,
    pub absent: usize,
    pub total: usize,
    pub rate_percent: f64,
}

impl SessionSummary {
    pub fn from_session(session: &AttendanceSession) -> Self {
        let total = session.records.len();
        let present = session.records.iter().filter(|r| r.present).count();
        Self {
            session_id: session.id,
            present,
            absent: total - present,
            total,
            rate_percent: percent(present, total),
        }
    }
}

/// Members per category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub count: usize,
    pub percent: f64,
}

/// Count and share of members in each category, in category order.
pub fn category_breakdown(students: &[Student]) -> Vec<CategoryShare> {
    let total = students.len();
    Category::ALL
        .into_iter()
        .map(|category| {
            let count = students.iter().filter(|s| s.category == category).count();
            CategoryShare {
                category,
                count,
                percent: percent(count, total),
            }
        })
        .collect()
}

/// Number of members per department id.
pub fn department_counts(students: &[Student]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for student in students {
        *counts.entry(student.department_id).or_insert(0) += 1;
    }
    counts
}

/// Average presence rate across sessions, weighting every record equally.
pub fn overall_rate(sessions: &[AttendanceSession]) -> f64 {
    let (present, total) = sessions
        .iter()
        .map(SessionSummary::from_session)
        .fold((0, 0), |(p, t), s| (p + s.present, t + s.total));
    percent(present, total)
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64 * 1000.0).round() / 10.0
    }
}
