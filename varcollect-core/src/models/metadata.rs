use std::collections::HashMap;

use serde::Serialize;

/// Parsed INFO annotations for one record, keyed by INFO field name.
pub type InfoMap = HashMap<String, InfoValue>;

/// A single INFO field value.
///
/// VCF INFO entries are semi-structured; values are kept as whatever scalar
/// they parse into, with bare keys (Type=Flag) carrying no value at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InfoValue {
    Flag,
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<InfoValue>),
}

///
/// Per-record details attached to one [`Variant`](crate::models::Variant).
///
/// A multi-allelic record produces one metadata entry per emitted allele;
/// the scalar fields repeat per allele while `alt_allele_index` records the
/// allele's zero-based position in the record's ALT list.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantMetadata {
    /// Record identifier; `None` when the ID column was ".".
    pub id: Option<String>,
    /// Phred-scaled quality; `None` when the QUAL column was ".".
    pub qual: Option<f64>,
    /// Failing filter names, in order. `None` means unfiltered (".");
    /// an empty vector means the record passed all filters.
    pub filter: Option<Vec<String>>,
    /// Zero-based position of this allele among the record's ALT entries.
    pub alt_allele_index: usize,
    /// Parsed INFO annotations; `None` when INFO parsing was skipped.
    pub info: Option<InfoMap>,
}
