use anyhow::Result;
use clap::ArgMatches;

use varcollect_vcf::{LoadOptions, load_vcf, load_vcf_fast};

pub fn run_load(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    let head = *matches.get_one::<usize>("head").expect("head has a default");

    let options = LoadOptions {
        only_passing: !matches.get_flag("all"),
        ensembl_version: matches.get_one::<u32>("ensembl-version").copied(),
        reference_name: matches.get_one::<String>("reference-name").cloned(),
        reference_vcf_key: matches
            .get_one::<String>("reference-key")
            .expect("reference-key has a default")
            .clone(),
        allow_extended_nucleotides: matches.get_flag("extended-nucleotides"),
        include_info: !matches.get_flag("skip-info"),
        chunk_size: *matches
            .get_one::<usize>("chunk-size")
            .expect("chunk-size has a default"),
        max_variants: matches.get_one::<usize>("max-variants").copied(),
    };

    log::info!("loading {}", path);
    let collection = match matches.get_flag("fast") {
        true => load_vcf_fast(path, &options)?,
        false => load_vcf(path.as_str(), &options)?,
    };

    println!("{}", collection);
    if let Some(variant) = collection.variants.first() {
        println!("annotation context: {}", variant.genome);
    }
    for variant in (&collection).into_iter().take(head) {
        let metadata = collection
            .metadata_for(variant)
            .expect("every variant has a metadata entry");
        println!(
            "{}\tid={}\tqual={}\tallele_index={}",
            variant,
            metadata.id.as_deref().unwrap_or("."),
            metadata
                .qual
                .map(|q| q.to_string())
                .unwrap_or_else(|| ".".to_string()),
            metadata.alt_allele_index,
        );
    }
    if collection.len() > head {
        println!("... and {} more", collection.len() - head);
    }

    Ok(())
}
