//! Bhavani Boutique Core - Shared types library.
//!
//! This crate provides common types used across all Bhavani Boutique components:
//! - `storefront` - Customer-facing catalog, cart, wishlist and contact API
//! - `admin` - Product management console API
//! - `cli` - Command-line tools for migrations, seeding and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. The `postgres` feature adds `sqlx` encoding for
//! the ID newtypes.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, sizes and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
