mod load;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "varcollect";
    pub const BIN_NAME: &str = "varcollect";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Load variant-call data from VCF sources into canonical per-allele collections.")
        .subcommand_required(true)
        .subcommand(load::cli::create_load_cli())
}

fn main() -> Result<()> {
    env_logger::init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // LOAD
        //
        Some((load::cli::LOAD_CMD, matches)) => {
            load::handlers::run_load(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
