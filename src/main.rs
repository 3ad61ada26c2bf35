use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::{Parser as ClapParser, Subcommand};
use jsonsift::{
    cli::{self, CheckOptions, CheckResult, CliError},
    to_json, to_json_pretty,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "jsift")]
#[command(about = "jsift - path queries, conditions and fallbacks over JSON documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and execute a query
    Check {
        /// The query to execute
        query: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Configuration file (aliases, fallback, fuzzy matching)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,

        /// Log alias expansion, fuzzy matches and fallbacks to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'jsift docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Check { verbose: true, .. });
    init_tracing(verbose);

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            config,
            pretty,
            syntax_only,
            verbose: _,
        } => run_check(query, input, config, pretty, syntax_only),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("jsonsift=debug")
    } else {
        EnvFilter::try_from_env("JSIFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_check(
    query: String,
    input: Option<String>,
    config: Option<PathBuf>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let config = config.map(fs::read_to_string).transpose()?;

    let options = CheckOptions {
        query,
        input,
        config,
        pretty,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => {
            let json = if pretty {
                to_json_pretty(&output)
            } else {
                to_json(&output)
            };
            println!("{}", json);
        }
    }
    Ok(())
}
