//! Client-side copies of the records owned by the EcoCharge API.
//!
//! Field names follow the API's camelCase JSON. Optional fields default so
//! that partial payloads from the change feed still decode.

mod admin;
mod change;
mod contact;
mod device;
mod ids;
mod rating;
mod report;
mod sql;

pub use admin::{AdminProfile, AdminSession, LoginResponse};
pub use change::{ChangeEvent, ChangeKind, Collection};
pub use contact::ContactMessage;
pub use device::Device;
pub use rating::{Rating, RatingSummary};
pub use report::{Report, ReportStatus};
pub use sql::SqlResult;
