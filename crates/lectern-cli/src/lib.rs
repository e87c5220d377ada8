//! # Lectern CLI
//!
//! Administrative commands and development seeding for Lectern.
//!
//! Admin accounts cannot be self-registered through the API, so
//! [`admin::create_admin`] is the way the first one comes to exist.
//!
//! ```ignore
//! use lectern_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, SeedConfig::default()).await?;
//! ```

pub mod admin;
pub mod seeder;
