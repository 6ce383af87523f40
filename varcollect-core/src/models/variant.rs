use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;

use crate::errors::VariantError;
use crate::genome::Genome;

/// Nucleotide codes accepted without opting in to the extended alphabet.
const STANDARD_NUCLEOTIDES: &str = "ACGT";

/// IUPAC ambiguity codes, accepted only with `allow_extended_nucleotides`.
const EXTENDED_NUCLEOTIDES: &str = "ACGTNRYSWKMBDHV";

///
/// A single alternate allele at a genomic position, resolved against an
/// annotation context.
///
/// Identity is the four fields (contig, start, ref, alt); the genome context
/// is deliberately excluded from equality and hashing so that the same call
/// annotated against different releases still compares equal.
///
#[derive(Debug, Clone, Serialize)]
pub struct Variant {
    pub contig: String,
    /// 1-based start position of the reference allele.
    pub start: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub genome: Arc<Genome>,
}

impl Variant {
    ///
    /// Build a variant, validating the allele alphabet.
    ///
    /// Alleles are trimmed and uppercased. With
    /// `allow_extended_nucleotides` set, IUPAC ambiguity codes are accepted;
    /// otherwise anything outside A/C/G/T rejects the variant. Empty allele
    /// strings are allowed (trimmed insertion/deletion representation).
    ///
    /// # Arguments
    /// - contig: chromosome or contig name
    /// - start: 1-based position of the first reference base
    /// - ref_allele: reference allele string
    /// - alt_allele: alternate allele string
    /// - genome: annotation context the call was aligned against
    /// - allow_extended_nucleotides: accept codes beyond A/C/G/T
    pub fn new(
        contig: &str,
        start: u64,
        ref_allele: &str,
        alt_allele: &str,
        genome: Arc<Genome>,
        allow_extended_nucleotides: bool,
    ) -> Result<Self, VariantError> {
        let contig = contig.trim();
        if contig.is_empty() {
            return Err(VariantError::EmptyContig(start));
        }
        let ref_allele = normalize_allele(ref_allele, allow_extended_nucleotides)?;
        let alt_allele = normalize_allele(alt_allele, allow_extended_nucleotides)?;

        Ok(Variant {
            contig: contig.to_string(),
            start,
            ref_allele,
            alt_allele,
            genome,
        })
    }
}

fn normalize_allele(allele: &str, allow_extended: bool) -> Result<String, VariantError> {
    let alphabet = match allow_extended {
        true => EXTENDED_NUCLEOTIDES,
        false => STANDARD_NUCLEOTIDES,
    };
    let normalized = allele.trim().to_uppercase();
    for nucleotide in normalized.chars() {
        if !alphabet.contains(nucleotide) {
            return Err(VariantError::InvalidNucleotide {
                nucleotide,
                allele: allele.to_string(),
            });
        }
    }
    Ok(normalized)
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.contig == other.contig
            && self.start == other.start
            && self.ref_allele == other.ref_allele
            && self.alt_allele == other.alt_allele
    }
}

impl Eq for Variant {}

impl Hash for Variant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.contig.hash(state);
        self.start.hash(state);
        self.ref_allele.hash(state);
        self.alt_allele.hash(state);
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} g.{}{}>{}",
            self.contig, self.start, self.ref_allele, self.alt_allele
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::genome::cached_release;

    fn make_variant(contig: &str, start: u64, ref_allele: &str, alt_allele: &str) -> Variant {
        Variant::new(
            contig,
            start,
            ref_allele,
            alt_allele,
            cached_release(75).unwrap(),
            false,
        )
        .unwrap()
    }

    #[rstest]
    fn test_equality_ignores_genome() {
        let a = make_variant("1", 100, "A", "T");
        let b = Variant::new("1", 100, "A", "T", cached_release(54).unwrap(), false).unwrap();
        assert_eq!(a, b);
    }

    #[rstest]
    fn test_alleles_normalized() {
        let v = make_variant("1", 100, " acg ", "t");
        assert_eq!(v.ref_allele, "ACG");
        assert_eq!(v.alt_allele, "T");
    }

    #[rstest]
    fn test_rejects_extended_nucleotides_by_default() {
        let genome = cached_release(75).unwrap();
        let result = Variant::new("1", 100, "A", "N", Arc::clone(&genome), false);
        assert!(result.is_err());

        let tolerant = Variant::new("1", 100, "A", "N", genome, true);
        assert!(tolerant.is_ok());
    }

    #[rstest]
    fn test_usable_as_map_key() {
        let mut map: HashMap<Variant, u32> = HashMap::new();
        map.insert(make_variant("1", 100, "A", "T"), 1);
        map.insert(make_variant("1", 100, "A", "C"), 2);
        // Same (contig, pos, ref) but distinct alts are distinct keys.
        assert_eq!(map.len(), 2);
        assert_eq!(map[&make_variant("1", 100, "A", "C")], 2);
    }

    #[rstest]
    fn test_display() {
        let v = make_variant("chr7", 55_242_464, "GGAATTAAGAGAAGC", "G");
        assert_eq!(v.to_string(), "chr7 g.55242464GGAATTAAGAGAAGC>G");
    }
}
