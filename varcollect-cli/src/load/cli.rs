use clap::{Arg, ArgAction, Command, value_parser};

pub const LOAD_CMD: &str = "load";

pub fn create_load_cli() -> Command {
    Command::new(LOAD_CMD)
        .about("Load a VCF into a variant collection and print a summary")
        .arg(
            Arg::new("path")
                .required(true)
                .help("Path or URL to a .vcf or .vcf.gz file"),
        )
        .arg(
            Arg::new("fast")
                .long("fast")
                .action(ArgAction::SetTrue)
                .help("Use the chunked dataframe loader (local files only)"),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .action(ArgAction::SetTrue)
                .help("Keep records whose FILTER names failing filters"),
        )
        .arg(
            Arg::new("ensembl-version")
                .long("ensembl-version")
                .value_parser(value_parser!(u32))
                .help("Annotate against this Ensembl release, skipping inference"),
        )
        .arg(
            Arg::new("reference-name")
                .long("reference-name")
                .help("Reference genome the variants were aligned against"),
        )
        .arg(
            Arg::new("reference-key")
                .long("reference-key")
                .default_value("reference")
                .help("Header metadata key holding the reference path"),
        )
        .arg(
            Arg::new("extended-nucleotides")
                .long("extended-nucleotides")
                .action(ArgAction::SetTrue)
                .help("Accept IUPAC ambiguity codes in alleles"),
        )
        .arg(
            Arg::new("skip-info")
                .long("skip-info")
                .action(ArgAction::SetTrue)
                .help("Skip INFO parsing (fast loader only)"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .value_parser(value_parser!(usize))
                .default_value("100000")
                .help("Rows per dataframe chunk (fast loader only)"),
        )
        .arg(
            Arg::new("max-variants")
                .long("max-variants")
                .value_parser(value_parser!(usize))
                .help("Stop after this many variants"),
        )
        .arg(
            Arg::new("head")
                .long("head")
                .value_parser(value_parser!(usize))
                .default_value("10")
                .help("How many variants to print"),
        )
}
