//! Brewpoints Core - Shared types and points rules.
//!
//! This crate provides the pieces shared by every Brewpoints component:
//! - `server` - Loyalty HTTP API for guests and shop admins
//! - `cli` - Command-line tools for migrations and shop provisioning
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. The transactional half of the points engine lives in the
//! server crate and calls into [`rules`] for every calculation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, phones, and statuses
//! - [`rules`] - Points calculation and churn classification

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod rules;
pub mod types;

pub use types::*;
