//! # VCF ingestion for varcollect.
//!
//! Two structurally different parsers converge on one canonical shape:
//! [`load_vcf`] streams records one at a time (any local file, URL or
//! pre-opened reader), while [`load_vcf_fast`] parses local files through
//! chunked dataframes. Both split multi-allelic records into per-allele
//! [`Variant`](varcollect_core::Variant)s, attach per-record metadata, and
//! stop cleanly at `max_variants`.
//!
//! ```no_run
//! use varcollect_vcf::{LoadOptions, load_vcf};
//!
//! let collection = load_vcf("somatic.vcf.gz", &LoadOptions::default())?;
//! println!("{}", collection);
//! # Ok::<(), varcollect_vcf::VcfError>(())
//! ```
#[cfg(feature = "dataframe")]
pub mod dataframe;
pub mod error;
pub mod load;
pub mod reader;
pub mod source;
pub mod stream;

// re-expose core functions
#[cfg(feature = "dataframe")]
pub use dataframe::*;
pub use error::*;
pub use load::*;
pub use reader::*;
pub use source::*;
pub use stream::*;
