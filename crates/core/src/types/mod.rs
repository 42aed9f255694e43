//! Core types for Bhavani Boutique.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod size;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use size::{Size, SizeError};
pub use slug::{Slug, SlugError, like_pattern};
pub use status::ProductStatus;
