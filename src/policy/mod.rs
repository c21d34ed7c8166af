//! Role-based authorization policy.
//!
//! Every screen asks these functions instead of comparing roles itself.
//! `super_admin` is unrestricted; every other role is confined to the
//! departments listed on its account.

use crate::models::{Role, User};

/// Things a user may view or create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Students,
    Departments,
    Attendance,
    Managers,
    Admins,
    Users,
}

/// The departments a user owns and the department being accessed.
///
/// A `target` of `None` means a listing; callers narrow it with [`visible_departments`].
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub own_departments: &'a [i64],
    pub target: Option<i64>,
}

impl<'a> Scope<'a> {
    pub fn of(user: &'a User, target: Option<i64>) -> Self {
        Self {
            own_departments: &user.department_ids,
            target,
        }
    }

    fn in_scope(&self) -> bool {
        match self.target {
            Some(department_id) => self.own_departments.contains(&department_id),
            None => true,
        }
    }
}

/// Whether `role` may see `resource` within `scope`.
pub fn can_view(role: Role, resource: Resource, scope: &Scope<'_>) -> bool {
    let allowed = match role {
        Role::SuperAdmin => return true,
        Role::Admin => true,
        Role::Staff => !matches!(resource, Resource::Admins | Resource::Users),
        Role::Manager => matches!(
            resource,
            Resource::Students | Resource::Departments | Resource::Attendance
        ),
    };
    allowed && scope.in_scope()
}

/// Whether `role` may create `resource` within `scope`.
///
/// Creation always needs a concrete target department unless the user is a super admin.
pub fn can_create(role: Role, resource: Resource, scope: &Scope<'_>) -> bool {
    let allowed = match role {
        Role::SuperAdmin => return true,
        Role::Admin => matches!(
            resource,
            Resource::Students | Resource::Managers | Resource::Admins | Resource::Attendance
        ),
        Role::Manager | Role::Staff => resource == Resource::Attendance,
    };
    allowed && scope.target.is_some() && scope.in_scope()
}

/// Whether `user` may record attendance for `department_id`.
pub fn can_record_attendance(user: &User, department_id: i64) -> bool {
    user.is_active
        && can_create(
            user.role,
            Resource::Attendance,
            &Scope::of(user, Some(department_id)),
        )
}

/// The subset of `departments` that `user` may see.
pub fn visible_departments(user: &User, departments: &[i64]) -> Vec<i64> {
    departments
        .iter()
        .copied()
        .filter(|id| can_view(user.role, Resource::Departments, &Scope::of(user, Some(*id))))
        .collect()
}

/// Items that belong to exactly one department.
pub trait DepartmentScoped {
    fn department_id(&self) -> i64;
}

impl DepartmentScoped for crate::models::Student {
    fn department_id(&self) -> i64 {
        self.department_id
    }
}

impl DepartmentScoped for crate::models::AttendanceSession {
    fn department_id(&self) -> i64 {
        self.department_id
    }
}

impl DepartmentScoped for crate::models::Department {
    fn department_id(&self) -> i64 {
        self.id
    }
}

/// Keep the items of `resource` that `user` may view.
pub fn filter_visible<T: DepartmentScoped>(user: &User, resource: Resource, items: Vec<T>) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| can_view(user.role, resource, &Scope::of(user, Some(item.department_id()))))
        .collect()
}
