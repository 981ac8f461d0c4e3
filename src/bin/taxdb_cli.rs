use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;

use taxdb_rs::{annotations_text, annotate_sequences, TaxDbConfig, TaxonStoreBuilder, TaxonomyDb};

#[derive(Parser)]
#[command(name = "taxdb-rs", about = "Build and query an NCBI taxonomy SQLite store")]
struct Cli {
    /// Taxon id that terminates every lineage
    #[arg(long, global = true, default_value_t = taxdb_rs::config::ROOT_TAXON_ID)]
    root: u32,

    /// Maximum hops before a lineage walk is declared cyclic
    #[arg(long, global = true, default_value_t = taxdb_rs::config::MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new store from nodes.dmp, names.dmp and a gi_taxid dump (.gz accepted)
    Build {
        #[arg(long)]
        nodes: PathBuf,
        #[arg(long)]
        names: PathBuf,
        /// GI to taxid file for nucleotide (or protein) sequences
        #[arg(long = "id-map")]
        id_map: PathBuf,
        /// Output filepath; must not exist yet
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the lineage of a taxon, or of the taxa mapped to sequence ids
    Lineage {
        #[arg(long)]
        db: PathBuf,
        #[arg(long, conflicts_with = "sequence")]
        taxon: Option<u32>,
        #[arg(long, num_args = 1..)]
        sequence: Vec<u64>,
    },
}

fn spinner(color: &str, msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner
}

fn run(cli: Cli) -> taxdb_rs::Result<()> {
    let config = TaxDbConfig::default()
        .with_root(cli.root)
        .with_max_depth(cli.max_depth);

    match cli.command {
        Command::Build {
            nodes,
            names,
            id_map,
            out,
        } => {
            let spinner = spinner("green", "Building taxonomy DB...");
            let result = TaxonStoreBuilder::new(config).build_from_paths(&out, &id_map, &nodes, &names);
            match result {
                Ok(summary) => spinner.finish_with_message(format!(
                    "DB created: {} nodes, {} of {} gi-taxid pairs stored.",
                    summary.nodes_stored, summary.identifiers_stored, summary.identifier_rows
                )),
                Err(e) => {
                    spinner.abandon_with_message("Build failed.");
                    return Err(e);
                }
            }
        }
        Command::Lineage { db, taxon, sequence } => {
            if let Some(taxon_id) = taxon {
                let taxonomy = TaxonomyDb::open_with_config(&db, config)?;
                match taxonomy.get_lineage(taxon_id)? {
                    Some(lineage) => {
                        for (rank, name) in &lineage {
                            println!("{rank}\t{name}");
                        }
                    }
                    None => eprintln!("taxon {taxon_id} not found"),
                }
                taxonomy.close()?;
            } else {
                let annotations = annotate_sequences(&db, &sequence, config)?;
                print!("{}", annotations_text(&annotations));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
