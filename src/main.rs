//! querygen CLI
//!
//! Usage:
//!   querygen [OPTIONS] <GRAMMAR>
//!
//! Options:
//!   -o, --overrides <FILE>    Override configuration (TOML format)
//!   -s, --start <NAME>        Start symbol [default: START]
//!   -a, --all                 Generate from every named element
//!   --skip-prefix <PREFIX>    Names to leave out with --all (repeatable)
//!   -n, --limit <N>           Stop after N queries per start symbol
//!   -l, --list                List named elements and their kinds
//!   -v, --verbose             Increase log verbosity (repeatable)
//!   -h, --help                Print help

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use querygen::{Generator, Grammar, Overrides};

#[derive(Parser)]
#[command(name = "querygen")]
#[command(about = "Generate test queries from a grammar description")]
struct Cli {
    /// Grammar definition file
    grammar: PathBuf,

    /// Override configuration (TOML format)
    #[arg(short, long)]
    overrides: Option<PathBuf>,

    /// Start symbol
    #[arg(short, long, default_value = "START")]
    start: String,

    /// Generate from every named element in definition order
    #[arg(short, long, conflicts_with = "start")]
    all: bool,

    /// With --all, skip elements whose name starts with this prefix
    #[arg(long = "skip-prefix", value_name = "PREFIX", requires = "all")]
    skip_prefix: Vec<String>,

    /// Stop after this many queries per start symbol
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// List named elements and their kinds instead of generating
    #[arg(short, long)]
    list: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(message) = run(&cli) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "querygen=warn",
        1 => "querygen=debug",
        _ => "querygen=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let filename = cli.grammar.display().to_string();
    let source = fs::read_to_string(&cli.grammar)
        .map_err(|e| format!("Error reading file '{}': {}", filename, e))?;
    let grammar = Grammar::parse(&source).map_err(|e| e.format(&source, &filename))?;
    info!(file = %filename, elements = grammar.len(), "grammar loaded");

    let mut out = io::stdout().lock();

    if cli.list {
        for (name, id) in grammar.names() {
            // A closed pipe just ends the listing
            if writeln!(out, "{}\t{}", name, grammar.get(id).kind()).is_err() {
                return Ok(());
            }
        }
        return Ok(());
    }

    let overrides = match &cli.overrides {
        Some(path) => Overrides::from_file(path)
            .map_err(|e| format!("Error loading overrides '{}': {}", path.display(), e))?,
        None => Overrides::default(),
    };

    let starts: Vec<&str> = if cli.all {
        grammar
            .names()
            .map(|(name, _)| name)
            .filter(|name| !cli.skip_prefix.iter().any(|p| name.starts_with(p.as_str())))
            .collect()
    } else {
        vec![cli.start.as_str()]
    };

    let generator = Generator::new(&grammar, &overrides);
    for start in starts {
        let queries = generator
            .generate(start)
            .map_err(|e| format!("Error: {}", e))?;
        for query in queries.take(cli.limit.unwrap_or(usize::MAX)) {
            let query = query.map_err(|e| format!("Error: {}", e))?;
            if writeln!(out, "{}", query).is_err() {
                return Ok(());
            }
        }
    }

    Ok(())
}
