use clap::{Parser as ClapParser, Subcommand};
use cql_builder::{
    cli::{self, CheckMode, CheckOptions, CheckResult, CliError},
    codec::{make_regex_wildcard, make_wildcard_regex},
};
use std::{
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "cqlb")]
#[command(about = "cqlb - Parse, normalize and inspect Corpus Query Language patterns")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the syntax of a pattern
    Check {
        /// The CQL pattern (reads from stdin if not provided)
        query: Option<String>,
    },

    /// Print the parsed pattern as JSON
    Parse {
        /// The CQL pattern (reads from stdin if not provided)
        query: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Builder settings JSON file
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Load a pattern into the query builder and print canonical CQL
    Normalize {
        /// The CQL pattern (reads from stdin if not provided)
        query: Option<String>,

        /// Builder settings JSON file
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Show the query builder tree of a pattern
    Tree {
        /// The CQL pattern (reads from stdin if not provided)
        query: Option<String>,

        /// Builder settings JSON file
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Convert a wildcard pattern (* and ?) to a regex
    Wildcard {
        text: String,
    },

    /// Convert a wildcard-style regex back to wildcards
    Regex {
        pattern: String,
    },

    /// Show documentation, optionally for one topic
    Docs {
        /// Topic name (omit to list topics)
        topic: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { query } => run_check(query, None, false, CheckMode::Syntax),
        Commands::Parse {
            query,
            pretty,
            settings,
        } => run_check(query, settings, pretty, CheckMode::Ast),
        Commands::Normalize { query, settings } => {
            run_check(query, settings, false, CheckMode::Normalize)
        }
        Commands::Tree { query, settings } => run_check(query, settings, false, CheckMode::Tree),
        Commands::Wildcard { text } => {
            println!("{}", make_wildcard_regex(&text));
            Ok(())
        }
        Commands::Regex { pattern } => {
            println!("{}", make_regex_wildcard(&pattern));
            Ok(())
        }
        Commands::Docs { topic: None } => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Docs { topic: Some(topic) } => match cli::get_doc_topic(&topic) {
            Ok(content) => {
                print!("{}", content);
                Ok(())
            }
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_query(query: Option<String>) -> Result<String, CliError> {
    match query {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn run_check(
    query: Option<String>,
    settings: Option<PathBuf>,
    pretty: bool,
    mode: CheckMode,
) -> Result<(), CliError> {
    let options = CheckOptions {
        query: read_query(query)?,
        settings,
        pretty,
        mode,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Empty => println!("No query"),
        CheckResult::Ast(text) | CheckResult::Cql(text) => println!("{}", text),
        CheckResult::Tree(tree) => print!("{}", tree),
    }
    Ok(())
}
