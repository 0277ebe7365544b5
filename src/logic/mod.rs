//! Logic Module - Extraction Engines
//!
//! ## Layout
//! - `changeset/` - Version histories and the samplers that pick version pairs
//! - `features/` - Attribute extraction (accessors, geometry, diffs, primary tags)
//! - `users` - User statistics lookup
//! - `assembler` - One output row per sample
//! - `dataset/` - Input changeset list and output table

pub mod config;
pub mod error;

pub mod changeset;
pub mod features;
pub mod users;

pub mod assembler;
pub mod dataset;
