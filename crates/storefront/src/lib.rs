//! Bhavani Boutique storefront library.
//!
//! The public JSON API: catalog browsing, cart, wishlist, profile and the
//! contact form. Exposed as a library so the binary, router tests and the
//! integration-tests crate share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod supabase;
