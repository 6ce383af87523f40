use std::collections::HashMap;
use std::sync::Arc;

use varcollect_core::{
    Genome, Variant, VariantCollection, VariantMetadata, cached_release,
    ensembl_release_for_reference_name, infer_reference_name,
};

use crate::error::{Result, VcfError};
use crate::source::{VcfHandle, VcfSource};

/// Header metadata key that conventionally points at the reference FASTA.
pub const DEFAULT_REFERENCE_VCF_KEY: &str = "reference";

/// Default number of rows per dataframe chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

///
/// Knobs shared by both ingestion paths.
///
/// `include_info` and `chunk_size` only affect the dataframe path
/// ([`load_vcf_fast`](crate::dataframe::load_vcf_fast)).
///
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Drop records whose FILTER field names failing filters.
    pub only_passing: bool,
    /// Annotate against this Ensembl release, skipping all inference.
    pub ensembl_version: Option<u32>,
    /// Reference genome name, used when no explicit release is given.
    pub reference_name: Option<String>,
    /// Header metadata key consulted when neither release nor name is given.
    pub reference_vcf_key: String,
    /// Accept IUPAC ambiguity codes in REF/ALT alleles.
    pub allow_extended_nucleotides: bool,
    /// Parse the INFO column (dataframe path only).
    pub include_info: bool,
    /// Rows per dataframe chunk (dataframe path only).
    pub chunk_size: usize,
    /// Stop after this many variants; reaching the limit is not an error.
    pub max_variants: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            only_passing: true,
            ensembl_version: None,
            reference_name: None,
            reference_vcf_key: DEFAULT_REFERENCE_VCF_KEY.to_string(),
            allow_extended_nucleotides: false,
            include_info: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_variants: None,
        }
    }
}

///
/// Work out the annotation context for a source.
///
/// Resolution order: an explicit Ensembl release wins outright; next an
/// explicit reference name, normalized to its canonical form; finally the
/// `reference_vcf_key` entry of the header metadata, whose value (usually a
/// FASTA path) is normalized the same way. A missing metadata key is a
/// [`VcfError::ReferenceInference`] naming the source.
///
pub fn resolve_genome(
    metadata: &HashMap<String, String>,
    options: &LoadOptions,
    source: Option<&str>,
) -> Result<Arc<Genome>> {
    let release = match options.ensembl_version {
        Some(release) => release,
        None => {
            let reference = match &options.reference_name {
                Some(name) => infer_reference_name(name)?,
                None => {
                    let value = metadata.get(&options.reference_vcf_key).ok_or_else(|| {
                        VcfError::ReferenceInference(
                            source.unwrap_or("<opened reader>").to_string(),
                        )
                    })?;
                    infer_reference_name(value)?
                }
            };
            ensembl_release_for_reference_name(reference)?
        }
    };
    log::debug!("annotating against Ensembl release {}", release);
    Ok(cached_release(release)?)
}

///
/// Load a [`VariantCollection`] from a path, URL or pre-opened reader by
/// streaming records one at a time.
///
/// Multi-allelic records are split into one variant per ALT entry, "."
/// no-call entries are dropped (their positions still count toward sibling
/// allele indices), and with `only_passing` set any record naming a failing
/// filter is skipped whole. The collection never grows past
/// `max_variants`; hitting the limit ends the run cleanly.
///
/// # Arguments
/// - source: path to a `.vcf`/`.vcf.gz` file, a `file`/`http`/`https`/`ftp`
///   URL, or a [`VcfReader`](crate::reader::VcfReader)
/// - options: see [`LoadOptions`]
pub fn load_vcf(source: impl Into<VcfSource>, options: &LoadOptions) -> Result<VariantCollection> {
    let mut handle = VcfHandle::open(source)?;
    let genome = resolve_genome(&handle.reader.metadata, options, handle.path.as_deref())?;

    let mut variants: Vec<Variant> = Vec::new();
    let mut metadata: HashMap<Variant, VariantMetadata> = HashMap::new();

    'records: for record in handle.reader.by_ref() {
        let record = record?;
        if options.only_passing && record.filter.as_ref().is_some_and(|f| !f.is_empty()) {
            continue;
        }
        for (alt_allele_index, alt) in record.alt.iter().enumerate() {
            // "." marks an explicit no-call; never materialized.
            if alt == "." || alt.is_empty() {
                continue;
            }
            if let Some(max) = options.max_variants {
                if variants.len() >= max {
                    break 'records;
                }
            }
            let variant = Variant::new(
                &record.chrom,
                record.pos,
                &record.reference,
                alt,
                Arc::clone(&genome),
                options.allow_extended_nucleotides,
            )?;
            metadata.insert(
                variant.clone(),
                VariantMetadata {
                    id: record.id.clone(),
                    qual: record.qual,
                    filter: record.filter.clone(),
                    alt_allele_index,
                    info: Some(record.info.clone()),
                },
            );
            variants.push(variant);
        }
    }

    let path = handle.path.clone();
    handle.close();
    Ok(VariantCollection::new(variants, metadata, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Cursor, Write};
    use std::path::PathBuf;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use varcollect_core::InfoValue;

    use crate::reader::VcfReader;

    const HEADER: &str = "\
##fileformat=VCFv4.2\n\
##reference=/data/ucsc/hg19.fa\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

    fn write_vcf(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let content = format!("{}{}", HEADER, body);
        if name.ends_with(".gz") {
            let file = std::fs::File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(content.as_bytes()).unwrap();
            encoder.finish().unwrap();
        } else {
            std::fs::write(&path, content).unwrap();
        }
        path
    }

    const BODY: &str = "\
1\t100\t.\tA\tT\t.\tPASS\tDP=10\n\
1\t200\trs1\tG\tC,T\t30\tPASS\tDP=20\n";

    #[rstest]
    fn test_load_splits_multiallelic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf", BODY);
        let collection = load_vcf(path.to_str().unwrap(), &LoadOptions::default()).unwrap();

        assert_eq!(collection.len(), 3);
        let alts: Vec<&str> = collection
            .variants
            .iter()
            .map(|v| v.alt_allele.as_str())
            .collect();
        assert_eq!(alts, vec!["T", "C", "T"]);

        let second = &collection.variants[1];
        let meta = collection.metadata_for(second).unwrap();
        assert_eq!(meta.id.as_deref(), Some("rs1"));
        assert_eq!(meta.qual, Some(30.0));
        assert_eq!(meta.filter, Some(vec![]));
        assert_eq!(meta.alt_allele_index, 0);
        assert_eq!(
            meta.info.as_ref().unwrap()["DP"],
            InfoValue::Integer(20)
        );
        let third = collection.metadata_for(&collection.variants[2]).unwrap();
        assert_eq!(third.alt_allele_index, 1);

        assert_eq!(collection.path.as_deref(), path.to_str());
        assert_eq!(collection.metadata.len(), 3);
    }

    #[rstest]
    fn test_load_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf.gz", BODY);
        let collection = load_vcf(path.to_str().unwrap(), &LoadOptions::default()).unwrap();
        assert_eq!(collection.len(), 3);
    }

    #[rstest]
    fn test_max_variants_is_a_hard_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf", BODY);
        let options = LoadOptions {
            max_variants: Some(2),
            ..Default::default()
        };
        let collection = load_vcf(path.to_str().unwrap(), &options).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.variants[1].alt_allele, "C");
    }

    #[rstest]
    fn test_only_passing_skips_whole_record() {
        let body = "\
1\t100\t.\tA\tT\t.\tq10;s50\tDP=10\n\
1\t200\t.\tG\tC,T\t.\t.\tDP=20\n\
1\t300\t.\tT\tA\t.\tPASS\tDP=30\n";
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf", body);

        let collection = load_vcf(path.to_str().unwrap(), &LoadOptions::default()).unwrap();
        // Row 1 fails filters; row 2 is unfiltered ("."); row 3 passes.
        assert_eq!(collection.len(), 3);

        let lenient = LoadOptions {
            only_passing: false,
            ..Default::default()
        };
        let collection = load_vcf(path.to_str().unwrap(), &lenient).unwrap();
        assert_eq!(collection.len(), 4);
        let failing = collection.metadata_for(&collection.variants[0]).unwrap();
        assert_eq!(
            failing.filter,
            Some(vec!["q10".to_string(), "s50".to_string()])
        );
    }

    #[rstest]
    fn test_no_call_allele_keeps_sibling_indices() {
        let body = "1\t100\t.\tA\tT,.,C\t.\tPASS\t.\n";
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf", body);
        let collection = load_vcf(path.to_str().unwrap(), &LoadOptions::default()).unwrap();

        assert_eq!(collection.len(), 2);
        let indices: Vec<usize> = collection
            .variants
            .iter()
            .map(|v| collection.metadata_for(v).unwrap().alt_allele_index)
            .collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[rstest]
    fn test_load_from_opened_reader() {
        let reader =
            VcfReader::from_reader(Cursor::new(format!("{}{}", HEADER, BODY))).unwrap();
        let collection = load_vcf(reader, &LoadOptions::default()).unwrap();
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.path, None);
    }

    #[rstest]
    fn test_idempotent_over_same_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf", BODY);
        let first = load_vcf(path.to_str().unwrap(), &LoadOptions::default()).unwrap();
        let second = load_vcf(path.to_str().unwrap(), &LoadOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_reference_inference_matches_explicit_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf", BODY);

        let inferred = load_vcf(path.to_str().unwrap(), &LoadOptions::default()).unwrap();
        let explicit = LoadOptions {
            reference_name: Some("GRCh37".to_string()),
            ..Default::default()
        };
        let explicit = load_vcf(path.to_str().unwrap(), &explicit).unwrap();

        let a = &inferred.variants[0].genome;
        let b = &explicit.variants[0].genome;
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(a.reference_name, "GRCh37");
        assert_eq!(a.release, 75);
    }

    #[rstest]
    fn test_missing_reference_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.vcf");
        std::fs::write(
            &path,
            format!(
                "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n{}",
                BODY
            ),
        )
        .unwrap();

        let result = load_vcf(path.to_str().unwrap(), &LoadOptions::default());
        assert!(matches!(result, Err(VcfError::ReferenceInference(_))));

        // An explicit release needs no header metadata at all.
        let pinned = LoadOptions {
            ensembl_version: Some(75),
            ..Default::default()
        };
        assert!(load_vcf(path.to_str().unwrap(), &pinned).is_ok());
    }

    #[rstest]
    fn test_negative_pos_is_rejected() {
        let body = "1\t-5\t.\tA\tT\t.\tPASS\t.\n";
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf", body);
        let result = load_vcf(path.to_str().unwrap(), &LoadOptions::default());
        assert!(matches!(result, Err(VcfError::MalformedRecord { .. })));
    }

    #[rstest]
    fn test_invalid_nucleotide_rejects_run() {
        let body = "1\t100\t.\tA\tZ\t.\tPASS\t.\n";
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf", body);
        let result = load_vcf(path.to_str().unwrap(), &LoadOptions::default());
        assert!(matches!(result, Err(VcfError::Variant(_))));
    }

    #[rstest]
    fn test_extended_nucleotides_opt_in() {
        let body = "1\t100\t.\tA\tN\t.\tPASS\t.\n";
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(&dir, "sample.vcf", body);
        let options = LoadOptions {
            allow_extended_nucleotides: true,
            ..Default::default()
        };
        let collection = load_vcf(path.to_str().unwrap(), &options).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.variants[0].alt_allele, "N");
    }
}
