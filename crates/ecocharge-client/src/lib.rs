//! # EcoCharge Client
//!
//! Async SDK for the EcoCharge REST API.
//!
//! - [`EcoChargeClient`] wraps every API operation, validates forms before
//!   sending them, attaches the cached bearer token, and retries an
//!   unauthorized call once before forcing a logout.
//! - [`SessionStore`] persists the admin session and the login cooldown
//!   ([`FileSessionStore`] on disk, [`MemorySessionStore`] in tests).
//! - [`ChangeFeed`] subscribes to the real-time "ratings" / "devices" feed.

mod admin;
mod auth;
mod client;
mod config;
pub mod cooldown;
mod error;
mod feed;
mod public;
mod session;

pub use auth::OtpVerification;
pub use client::EcoChargeClient;
pub use config::{default_data_dir, ClientConfig, DEFAULT_API_URL};
pub use error::ClientError;
pub use feed::{parse_feed_event, watch, ChangeFeed, ChangeStream};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, StoredState};
