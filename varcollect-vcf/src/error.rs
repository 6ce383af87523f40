use std::io;

use thiserror::Error;

use varcollect_core::{GenomeError, VariantError};

/// Error type for varcollect-vcf operations.
#[derive(Error, Debug)]
pub enum VcfError {
    /// IO error occurred while reading a source.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to open a local VCF file.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// URL scheme outside file/http/https/ftp.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// Remote fetch came back with a non-success status.
    #[error("HTTP status {status} when fetching {url}")]
    Fetch { url: String, status: u16 },

    /// Remote fetch failed before a status was available.
    #[error("request error when fetching {url}: {msg}")]
    Request { url: String, msg: String },

    /// URL source given but the crate was built without the http feature.
    #[error("remote source given and http feature not enabled: {0}")]
    HttpFeatureDisabled(String),

    /// Could not work out which reference genome the data was aligned to.
    #[error("unable to infer reference genome for {0}")]
    ReferenceInference(String),

    /// Dataframe chunk columns do not match the fixed expected layout.
    #[error("dataframe columns {found:?} do not match expected columns {expected:?}")]
    TableShape {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Corrupt compressed payload in a streamed source.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// A data line that does not parse as a VCF record.
    #[error("malformed VCF record at line {line}: {msg}")]
    MalformedRecord { line: usize, msg: String },

    /// A table row that does not normalize into a record. Rows are counted
    /// over data lines only, so the number is not a file line.
    #[cfg(feature = "dataframe")]
    #[error("malformed VCF record at data row {row}: {msg}")]
    MalformedRow { row: usize, msg: String },

    #[error(transparent)]
    Genome(#[from] GenomeError),

    #[error(transparent)]
    Variant(#[from] VariantError),

    #[cfg(feature = "dataframe")]
    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}

/// Result type alias for varcollect-vcf operations.
pub type Result<T> = std::result::Result<T, VcfError>;
