//! Data models for the Flock membership backend.
//!
//! Field names follow the backend's snake_case JSON.

mod attendance;
mod category_details;
mod department;
mod envelope;
mod member;
mod user;

pub use attendance::*;
pub use category_details::*;
pub use department::*;
pub use envelope::*;
pub use member::*;
pub use user::*;
