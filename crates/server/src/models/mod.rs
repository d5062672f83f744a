//! Domain models for the loyalty backend.
//!
//! These types are what the repositories return and the routes serialize.
//! Identifier, email, and phone columns decode straight into the validated
//! `brewpoints_core` types.

pub mod dashboard;
pub mod guest;
pub mod purchase;
pub mod reward;
pub mod shop;

pub use dashboard::{DashboardSummary, TopGuest};
pub use guest::{Guest, GuestIdentity, NewGuest};
pub use purchase::{NewPurchase, Purchase};
pub use reward::{NewReward, Reward};
pub use shop::{NewShop, Shop, ShopSettings, ShopSettingsUpdate};
