//! API endpoint handlers.
//!
//! Each module corresponds to a screen of the practice app. Handlers reuse
//! the business logic in the crate's top-level modules.

pub mod auth;
pub mod cases;
pub mod health;
pub mod pages;
pub mod patients;
pub mod prescriptions;
pub mod profile;
pub mod remedies;
pub mod repertory;
