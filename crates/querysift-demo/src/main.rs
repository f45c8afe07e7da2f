//! `sift` - filter a JSON file of books with a query.
//!
//! ```text
//! sift --file books.json "ct('Genres', 'sf') and gt('Pages', '300')"
//! sift --file books.json --count "eq('Series', $!NULL!$)"
//! sift --file books.json --explain "sw('Title', 'D') or lt('Year', '1900')"
//! ```
//!
//! Logging goes to stderr and is controlled by `SIFT_LOG` (an `EnvFilter`
//! directive such as `querysift=trace`) or `--verbose`.

mod book;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use querysift::{CompileOptions, Compiler, PropertyCase};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::book::{load_books, Book};

const LOG_ENV: &str = "SIFT_LOG";

#[derive(Debug, Parser)]
#[command(name = "sift", version, about = "Filter a JSON file of books with a query")]
struct Cli {
    /// JSON file holding an array of books
    #[arg(short, long)]
    file: PathBuf,

    /// Print the parsed clauses before the results
    #[arg(long)]
    explain: bool,

    /// Print only the number of matching books
    #[arg(long)]
    count: bool,

    /// Match property names exactly
    #[arg(long)]
    exact: bool,

    /// Log compilation details to stderr
    #[arg(short, long)]
    verbose: bool,

    /// The query, e.g. "eq('Author', 'Jane Austen')"
    query: String,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("querysift=trace,sift=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let books = load_books(&cli.file)?;
    info!(books = books.len(), file = %cli.file.display(), "loaded records");

    if cli.explain {
        let clauses = querysift::parse(&cli.query).context("invalid query")?;
        for clause in &clauses {
            match clause.composition() {
                Some(joiner) => writeln!(out, "{joiner:>4} {clause}")?,
                None => writeln!(out, "     {clause}")?,
            }
        }
    }

    let case = if cli.exact {
        PropertyCase::Exact
    } else {
        PropertyCase::AsciiInsensitive
    };
    let compiler = Compiler::with_options(CompileOptions::new().property_case(case));
    let predicate = compiler
        .compile::<Book>(&cli.query)
        .context("invalid query")?;

    if cli.count {
        writeln!(out, "{}", predicate.count(&books))?;
    } else {
        for book in predicate.filter(&books) {
            writeln!(out, "{}", serde_json::to_string(book)?)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out)
}
