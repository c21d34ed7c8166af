//! In-memory filtering, sorting and pagination for student tables.

use serde::Serialize;

use crate::models::{Category, Student};

/// Column a student table is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Name,
    Age,
    Category,
}

/// Table state for a student listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentQuery {
    /// Case-insensitive substring matched against name and church
    pub search: Option<String>,
    pub department_id: Option<i64>,
    pub category: Option<Category>,
    pub sort: SortKey,
    pub descending: bool,
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
}

impl Default for StudentQuery {
    fn default() -> Self {
        Self {
            search: None,
            department_id: None,
            category: None,
            sort: SortKey::Name,
            descending: false,
            page: 1,
            per_page: 10,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl StudentQuery {
    fn matches(&self, student: &Student) -> bool {
        if self.department_id.is_some_and(|id| id != student.department_id) {
            return false;
        }
        if self.category.is_some_and(|c| c != student.category) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                student.name.to_lowercase().contains(&needle)
                    || student
                        .church
                        .as_deref()
                        .is_some_and(|church| church.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }

    /// Filter, sort and slice `students`.
    pub fn apply(&self, students: &[Student]) -> Page<Student> {
        let mut matched: Vec<Student> = students
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match self.sort {
                SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortKey::Age => a.age.cmp(&b.age),
                SortKey::Category => a.category.cmp(&b.category),
            }
            .then_with(|| a.id.cmp(&b.id));
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });

        paginate(matched, self.page, self.per_page)
    }
}

/// Slice `items` into a 1-based page. Out-of-range pages are empty.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total,
        total_pages,
    }
}
