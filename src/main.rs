//! Data-access wiring CLI
//!
//! Usage:
//!   data-access-wiring [OPTIONS] [MANIFEST]
//!
//! Options:
//!   -c, --catalog <FILE>     Replacement template catalog (TOML)
//!   -d, --defaults <FILE>    Parameters to pre-seed the store with (TOML)
//!   -p, --parameter <NAME>   Print only one parameter
//!   -f, --format <FORMAT>    Output format: toml or json
//!   --dump-catalog           Print the built-in template catalog
//!   -v, --verbose            Log expansion details to stderr
//!   -h, --help               Print help

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use data_access_wiring::{
    Catalog, CrateContext, DataAccessConfiguration, MemoryStore, WiringConfig, WiringError,
};

#[derive(Parser)]
#[command(name = "data-access-wiring")]
#[command(about = "Expand data-access templates for every resource of a crate")]
struct Cli {
    /// Crate manifest (TOML)
    #[arg(required_unless_present = "dump_catalog")]
    manifest: Option<PathBuf>,

    /// Replacement template catalog (TOML)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Parameters to pre-seed the store with (TOML)
    #[arg(short, long)]
    defaults: Option<PathBuf>,

    /// Print only this parameter
    #[arg(short, long)]
    parameter: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Toml)]
    format: Format,

    /// Print the built-in template catalog and exit
    #[arg(long, conflicts_with = "catalog")]
    dump_catalog: bool,

    /// Log expansion details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Toml,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String, WiringError> {
    // clap guarantees a manifest unless the catalog dump was requested
    let Some(manifest) = cli.manifest.as_ref().filter(|_| !cli.dump_catalog) else {
        return Ok(Catalog::default().to_toml_string()?);
    };

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::default(),
    };
    let context = CrateContext::from_file(manifest)?;

    let mut store = match &cli.defaults {
        Some(path) => MemoryStore::from_file(path)?,
        None => MemoryStore::new(),
    };

    DataAccessConfiguration::with_config(WiringConfig::new().with_catalog(catalog))
        .apply(&context, &mut store)?;

    let store = match &cli.parameter {
        Some(name) => store.subset(name)?,
        None => store,
    };

    let output = match cli.format {
        Format::Toml => store.to_toml_string()?,
        Format::Json => store.to_json_string()?,
    };
    Ok(output)
}
