use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::{Arc, Mutex, OnceLock};

use serde::Serialize;

use crate::errors::GenomeError;

/// Most recent Ensembl release this crate knows how to annotate against.
pub const MAX_ENSEMBL_RELEASE: u32 = 111;

/// Earliest Ensembl release with a supported reference genome.
pub const MIN_ENSEMBL_RELEASE: u32 = 54;

/// Canonical reference names and the aliases they are recognized by.
///
/// Aliases are matched as case-insensitive substrings, so a FASTA path like
/// `/data/Homo_sapiens.GRCh37.75.fa` or `ucsc/hg19.fa.gz` resolves the same
/// canonical name.
const REFERENCE_ALIASES: &[(&str, &[&str])] = &[
    ("NCBI36", &["ncbi36", "hg18", "b36"]),
    ("GRCh37", &["grch37", "hg19", "b37", "ncbi37", "v37"]),
    ("GRCh38", &["grch38", "hg38", "b38"]),
];

///
/// A versioned genome-annotation context: a canonical reference name tied to
/// an Ensembl release number.
///
/// Contexts are shared via [`cached_release`] so that every variant resolved
/// against the same release points at one instance.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genome {
    pub reference_name: &'static str,
    pub release: u32,
}

impl Genome {
    ///
    /// Build a genome context for an Ensembl release.
    ///
    /// # Arguments
    /// - release: the Ensembl release number
    pub fn new(release: u32) -> Result<Self, GenomeError> {
        let reference_name = reference_name_for_release(release)?;
        Ok(Genome {
            reference_name,
            release,
        })
    }
}

impl Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Ensembl {})", self.reference_name, self.release)
    }
}

///
/// Normalize a reference identifier to its canonical name.
///
/// The input may be a bare name in any capitalization ("hg19", "GRCh37.p13")
/// or a full path to a reference FASTA pulled out of a VCF header.
///
pub fn infer_reference_name(name: &str) -> Result<&'static str, GenomeError> {
    let lowered = name.to_lowercase();
    for (canonical, aliases) in REFERENCE_ALIASES {
        if aliases.iter().any(|alias| lowered.contains(alias)) {
            return Ok(canonical);
        }
    }
    Err(GenomeError::UnknownReference(name.to_string()))
}

///
/// Latest Ensembl release aligned against the given reference genome.
///
/// The name is canonicalized first, so aliases are accepted.
///
pub fn ensembl_release_for_reference_name(name: &str) -> Result<u32, GenomeError> {
    match infer_reference_name(name)? {
        "NCBI36" => Ok(54),
        "GRCh37" => Ok(75),
        _ => Ok(MAX_ENSEMBL_RELEASE),
    }
}

/// Reference genome that an Ensembl release annotates.
pub fn reference_name_for_release(release: u32) -> Result<&'static str, GenomeError> {
    match release {
        0..MIN_ENSEMBL_RELEASE => Err(GenomeError::UnsupportedRelease(release)),
        54 => Ok("NCBI36"),
        55..=75 => Ok("GRCh37"),
        _ => Ok("GRCh38"),
    }
}

fn release_cache() -> &'static Mutex<HashMap<u32, Arc<Genome>>> {
    static CACHE: OnceLock<Mutex<HashMap<u32, Arc<Genome>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

///
/// Fetch the shared annotation context for an Ensembl release.
///
/// Contexts are memoized for the life of the process: repeated requests for
/// the same release return the same `Arc`.
///
pub fn cached_release(release: u32) -> Result<Arc<Genome>, GenomeError> {
    let mut cache = release_cache()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(genome) = cache.get(&release) {
        return Ok(Arc::clone(genome));
    }
    let genome = Arc::new(Genome::new(release)?);
    cache.insert(release, Arc::clone(&genome));
    Ok(genome)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("GRCh37", "GRCh37")]
    #[case("hg19", "GRCh37")]
    #[case("B37", "GRCh37")]
    #[case("/reference/Homo_sapiens.GRCh38.dna.fa.gz", "GRCh38")]
    #[case("file:///data/human_b36_male.fa", "NCBI36")]
    #[case("GRCh37.p13", "GRCh37")]
    fn test_infer_reference_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(infer_reference_name(input).unwrap(), expected);
    }

    #[rstest]
    fn test_infer_reference_name_unknown() {
        assert!(infer_reference_name("Zea_mays.AGPv4").is_err());
    }

    #[rstest]
    #[case("hg18", 54)]
    #[case("hg19", 75)]
    #[case("hg38", MAX_ENSEMBL_RELEASE)]
    fn test_release_for_reference(#[case] name: &str, #[case] release: u32) {
        assert_eq!(ensembl_release_for_reference_name(name).unwrap(), release);
    }

    #[rstest]
    fn test_reference_name_for_release() {
        assert_eq!(reference_name_for_release(54).unwrap(), "NCBI36");
        assert_eq!(reference_name_for_release(66).unwrap(), "GRCh37");
        assert_eq!(reference_name_for_release(75).unwrap(), "GRCh37");
        assert_eq!(reference_name_for_release(76).unwrap(), "GRCh38");
        assert!(reference_name_for_release(12).is_err());
    }

    #[rstest]
    fn test_cached_release_reuses_context() {
        let first = cached_release(75).unwrap();
        let second = cached_release(75).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.reference_name, "GRCh37");
    }
}
