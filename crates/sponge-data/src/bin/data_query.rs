//! `data-query`: look up a dot-separated query in a JSON document.
//!
//! Usage:
//!   data-query [-v|-vv] '<query>'
//!
//! The document is read from stdin and loaded into a data container. The
//! value at the query is printed as pretty JSON.

use std::io::{self, Read, Write};

use clap::Parser;
use sponge_data::cli::{lookup_query, Cli};

fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match lookup_query(buf.trim(), &cli.query) {
        Ok(result) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{result}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
