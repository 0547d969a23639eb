//! grove CLI — export a segment store's node tree as line-oriented text.
//!
//! The document goes to standard output, diagnostics go to standard
//! error. Setup failures (bad arguments, unreadable journal, unresolvable
//! root) exit non-zero; a completed export exits zero even when parts of
//! the store were unavailable and had to be omitted.

use std::io::{self, BufWriter};
use std::path::Path;
use std::process;

use clap::{Arg, ArgAction, Command};
use grove_export::Exporter;
use grove_storage::{is_store, SegmentStore};
use tracing_subscriber::EnvFilter;

fn build_cli() -> Command {
    Command::new("grove")
        .about("Export a node store to a text-based intermediate format")
        .arg(
            Arg::new("store")
                .long("store")
                .value_name("PATH")
                .required(true)
                .help("Path to the segment store"),
        )
        .arg(
            Arg::new("blob-store")
                .long("blob-store")
                .value_name("PATH")
                .help("Path to the blob store holding external binary values"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Verbose logging on standard error"),
        )
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_store(store: &str, blob_store: Option<&String>) -> Result<SegmentStore, String> {
    if !is_store(Path::new(store)) {
        return Err(format!("no segment store found at {store}"));
    }
    match blob_store {
        Some(blobs) => SegmentStore::open_with_blobs(store, blobs),
        None => SegmentStore::open(store),
    }
    .map_err(|e| format!("failed to open segment store: {e}"))
}

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let store_path = matches
        .get_one::<String>("store")
        .expect("--store is required");

    let store = match open_store(store_path, matches.get_one::<String>("blob-store")) {
        Ok(store) => store,
        Err(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
    };

    let root = match store.root() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("cannot resolve the store root: {e}");
            process::exit(1);
        }
    };

    let out = BufWriter::new(io::stdout().lock());
    let summary = match Exporter::new(out, io::stderr()).export(&root) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("export failed: {e}");
            process::exit(1);
        }
    };

    if summary.is_partial() {
        tracing::warn!(
            nodes = summary.nodes,
            properties = summary.properties,
            omissions = summary.omissions,
            fragments = summary.fragments.len(),
            "export completed with omissions"
        );
    } else {
        tracing::info!(
            nodes = summary.nodes,
            properties = summary.properties,
            "export complete"
        );
    }
}
