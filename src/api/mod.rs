//! REST API client module.
//!
//! `client` owns the transport and the reauthentication flow; the remaining
//! files add one `impl ApiClient` block per backend resource.

mod attendance;
mod auth;
mod client;
mod departments;
mod students;
mod users;

pub use client::*;
