/// Hostel Hub
///
/// Student hostel booking marketplace: agent verification and admin
/// moderation, hostel listings and the booking state machine.

pub mod account;
pub mod admin;
pub mod api;
pub mod auth;
pub mod blob_store;
pub mod bookings;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod hostels;
pub mod jobs;
pub mod mailer;
pub mod metrics;
pub mod rate_limit;
pub mod server;

pub use context::AppContext;
pub use error::{HubError, HubResult};
