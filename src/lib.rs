//! Changeset Attributes - Library Entry Point
//!
//! Turns the edit history of map features into a flat table of attributes
//! for training a harmful-changeset classifier.
//!
//! ## Architecture
//! - `logic/changeset/` - Feature versions, version histories, sources, samplers
//! - `logic/features/` - Accessors, geometric metrics, pairwise diffs, column layout
//! - `logic/users.rs` - Per-user statistics
//! - `logic/assembler.rs` - Joins everything into one row per sample
//! - `logic/dataset/` - Labelled input list, output table and exporters

pub mod constants;
pub mod logic;

pub use logic::assembler::{AttributeAssembler, ExtractionSummary};
pub use logic::changeset::{Changeset, ChangesetSource, DirectoryChangesetSource, FeatureVersion, Sample, Sampler, TagSampler};
pub use logic::config::{AttributeSchema, ExtractorConfig, MetricSpace};
pub use logic::dataset::{AttributeTable, ExportFormat, Harmful, LabelledChangeset};
pub use logic::error::{ExtractError, ExtractResult};
pub use logic::features::{AttributeRow, AttributeValue, ChangedTagsEncoder, TagEncoder};
pub use logic::users::{DirectoryUserDetails, InMemoryUserDetails, UserDetails, UserDetailsSource};
