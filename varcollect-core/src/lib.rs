//! # Core models for variant-call ingestion.
//!
//! This crate holds the canonical shapes that both ingestion paths of
//! `varcollect-vcf` converge on: the per-allele [`Variant`], its attached
//! [`VariantMetadata`], and the finished [`VariantCollection`]. It also owns
//! [`Genome`], the versioned annotation context that variants are resolved
//! against, along with the reference-name inference helpers.
pub mod errors;
pub mod genome;
pub mod models;

pub use errors::*;
pub use genome::*;
pub use models::*;
