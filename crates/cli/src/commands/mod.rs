//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Read `DATABASE_URL`, loading `.env` first if present.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").ok().map(SecretString::from)
}
