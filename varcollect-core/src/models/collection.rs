use std::collections::HashMap;
use std::fmt::{self, Display};

use serde::Serialize;

use crate::models::metadata::VariantMetadata;
use crate::models::variant::Variant;

///
/// The finished result of one ingestion run: variants in input order with
/// their per-record metadata and the source they came from.
///
/// Built once by the normalizers and read-only afterwards. Multi-allelic
/// records contribute several entries, in ALT-list order, each with its own
/// metadata keyed by the variant's four-field identity.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantCollection {
    pub variants: Vec<Variant>,
    pub metadata: HashMap<Variant, VariantMetadata>,
    pub path: Option<String>,
}

pub struct VariantCollectionIterator<'a> {
    collection: &'a VariantCollection,
    index: usize,
}

impl VariantCollection {
    pub fn new(
        variants: Vec<Variant>,
        metadata: HashMap<Variant, VariantMetadata>,
        path: Option<String>,
    ) -> Self {
        VariantCollection {
            variants,
            metadata,
            path,
        }
    }

    ///
    /// Get number of variants in the collection
    ///
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    ///
    /// Look up the metadata attached to a variant.
    ///
    pub fn metadata_for(&self, variant: &Variant) -> Option<&VariantMetadata> {
        self.metadata.get(variant)
    }

    ///
    /// Iterate unique contig names seen in the collection, in input order.
    ///
    pub fn iter_contigs(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = Vec::new();
        for variant in &self.variants {
            if !seen.contains(&variant.contig.as_str()) {
                seen.push(variant.contig.as_str());
            }
        }
        seen.into_iter()
    }
}

impl<'a> Iterator for VariantCollectionIterator<'a> {
    type Item = &'a Variant;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.collection.variants.len() {
            let variant = &self.collection.variants[self.index];
            self.index += 1;
            Some(variant)
        } else {
            None
        }
    }
}

impl<'a> IntoIterator for &'a VariantCollection {
    type Item = &'a Variant;
    type IntoIter = VariantCollectionIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        VariantCollectionIterator {
            collection: self,
            index: 0,
        }
    }
}

impl Display for VariantCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariantCollection with {} variants.", self.len())
    }
}
