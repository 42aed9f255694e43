//! Bhavani Boutique admin library.
//!
//! Product management for the boutique's staff: product CRUD with
//! draft/publish, stock by size, image uploads to hosted storage, the
//! contact inbox and a dashboard.
//!
//! The library is shared by the `bhavani-admin` binary and the `bb-cli`
//! seeding command, which reuses [`models::ProductInput`] validation and
//! [`db::AdminProductRepository`].
//!
//! # Security
//!
//! This crate holds the storage service-role key. Every API route requires
//! an admin bearer token.

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
