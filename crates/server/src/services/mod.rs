//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Shop admin and guest sign-in, bearer tokens
//! - `points` - Purchase accrual and reward redemption
//! - `admin` - Dashboard aggregates and shop settings

pub mod admin;
pub mod auth;
pub mod points;
