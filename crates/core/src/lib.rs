//! Greengrocer Core - Shared types library.
//!
//! This crate provides the domain types and validation rules used by the
//! Greengrocer API:
//!
//! - `api` - JSON CRUD service for customers, accounts, products, and orders
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation functions - no I/O,
//! no database access, no HTTP. This keeps it lightweight and fully testable
//! without external services.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, phone numbers, and prices
//! - [`validation`] - Field-level validators (password strength, usernames, quantities)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{ValidationError, ValidationResult};
