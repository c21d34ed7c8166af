//! Cache-aware data access.
//!
//! The REST backend is the source of truth; [`Repository`] fronts it with the
//! query cache and keeps the cache honest by invalidating on every mutation.

mod repository;

pub use repository::*;
