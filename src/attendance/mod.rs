//! Attendance session composition.
//!
//! An operator picks a department, category, date and session type
//! ([`SessionParams`]), loads the eligible members ([`EligibilityResolver`]),
//! marks presence ([`PresenceLedger`]) and submits the whole session as one
//! batch ([`AttendanceForm`]).

mod eligibility;
mod form;
mod ledger;
mod params;

pub use eligibility::*;
pub use form::*;
pub use ledger::*;
pub use params::*;
