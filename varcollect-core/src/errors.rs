use thiserror::Error;

#[derive(Error, Debug)]
pub enum VariantError {
    #[error("invalid nucleotide {nucleotide:?} in allele {allele:?}")]
    InvalidNucleotide { nucleotide: char, allele: String },

    #[error("empty contig name for variant at position {0}")]
    EmptyContig(u64),
}

#[derive(Error, Debug)]
pub enum GenomeError {
    #[error("failed to infer reference genome from {0:?}")]
    UnknownReference(String),

    #[error("unsupported Ensembl release: {0}")]
    UnsupportedRelease(u32),
}
