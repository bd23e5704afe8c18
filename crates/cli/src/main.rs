use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, Result, bail};
use argh::{Args, Value};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "argh")]
#[command(
    version,
    about = "Parse command line arguments and print them as JSON",
    long_about = None
)]
struct Cli {
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Print only the value at a dotted path (e.g. `redis.port`, `argv`)
    #[arg(long, value_name = "PATH")]
    key: Option<String>,

    /// Read tokens from stdin, one per line (appended after TOKENS)
    #[arg(long)]
    stdin: bool,

    /// Tokens to parse
    #[arg(last = true, value_name = "TOKENS")]
    tokens: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut tokens = cli.tokens;
    if cli.stdin {
        tokens.extend(read_stdin_tokens()?);
    }
    tracing::debug!(count = tokens.len(), "parsing tokens");

    let args = argh::parse(&tokens);

    match cli.key.as_deref() {
        Some(path) => print_key(&args, path, cli.pretty),
        None => print_json(&args, cli.pretty),
    }
}

fn read_stdin_tokens() -> Result<Vec<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        tracing::warn!("reading tokens from an interactive terminal; end input with EOF");
    }
    stdin
        .lock()
        .lines()
        .map(|line| line.context("failed to read token from stdin"))
        .collect()
}

fn print_key(args: &Args, path: &str, pretty: bool) -> Result<()> {
    // Positionals own `argv`; a flag named `argv` shows only when there are none.
    if path == "argv" && !args.positional().is_empty() {
        return print_json(args.positional(), pretty);
    }
    let Some(value) = args.get_path(path) else {
        bail!("key not found: {path}");
    };
    match value {
        // Scalars print bare so the output can be used in shell scripts.
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            println!("{value}");
            Ok(())
        }
        Value::List(_) | Value::Map(_) => print_json(value, pretty),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize parsed arguments")?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}
