//! TimeWise backend: account/session lifecycle and soft-delete data
//! integrity for a personal time tracker.
//!
//! Users register, authenticate, and manage projects and time entries
//! scoped to their account. All durable state lives in a pooled SQLite
//! store; uniqueness among live rows is enforced there, soft-deleted rows
//! are retained for audit and history.

pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod server;
pub mod store;
