//! # EcoCharge Types
//!
//! Core types, models, and error definitions for the EcoCharge admin client.
//!
//! - **`error`** - Form and live-list error types
//! - **`models`** - Client-side copies of API records (admins, ratings, reports, devices)
//! - **`validation`** - Form structs and the rules checked before a request is sent
//! - **`live`** - Reconciliation of real-time change events into local lists
//!
//! ## Architecture Role
//!
//! ```text
//!                ecocharge-types (this crate)
//!                        │
//!                        ▼
//!                 ecocharge-client
//!                        │
//!                        ▼
//!                  ecocharge-cli
//! ```
//!
//! Everything here is synchronous and free of I/O.

pub mod error;
pub mod live;
pub mod models;
pub mod validation;

pub use error::{FormError, ListError};
pub use live::{ListChange, LiveList, Record};
pub use models::{
    AdminProfile, AdminSession, ChangeEvent, ChangeKind, Collection, ContactMessage, Device,
    LoginResponse, Rating, RatingSummary, Report, ReportStatus, SqlResult,
};
