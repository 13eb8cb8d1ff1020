//! Interactive ISO 8583 message inspector.
//!
//! Usage:
//!   iso8583_inspect [OPTIONS] [FILE]
//!
//! Reads raw messages one per line from FILE (or stdin), decodes each and prints its
//! fields as `LABEL -> value`. `search <text>` lists matching fields of the last
//! decoded message, `json` prints it as JSON, and `exit` or `e` quits.
//!
//! Options:
//!   --safe, -s            Mask the primary account number
//!   --verbose, -v         Debug logging (unless RUST_LOG is set)
//!   --schema FILE.dsl     Decode with a schema from a DSL file instead of the built-in table
//!   --name NAME           Schema to use from FILE.dsl (default: first declared)

use anyhow::{bail, Context, Result};
use iso8583::inspect::Inspector;
use iso8583::{load_schemas, schema};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use tracing_subscriber::EnvFilter;

struct Options {
    safe: bool,
    verbose: bool,
    schema_file: Option<String>,
    schema_name: Option<String>,
    input: Option<String>,
}

fn parse_args() -> Result<Options> {
    let mut opts = Options {
        safe: false,
        verbose: false,
        schema_file: None,
        schema_name: None,
        input: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--safe" | "-s" => opts.safe = true,
            "--verbose" | "-v" => opts.verbose = true,
            "--schema" => opts.schema_file = Some(args.next().context("--schema needs a file")?),
            "--name" => opts.schema_name = Some(args.next().context("--name needs a schema name")?),
            s if s.starts_with('-') => bail!("unknown option: {}", s),
            _ if opts.input.is_some() => bail!("only one input file is accepted"),
            _ => opts.input = Some(arg),
        }
    }
    Ok(opts)
}

fn main() -> Result<()> {
    let opts = parse_args()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if opts.verbose { "iso8583=debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let schema = match &opts.schema_file {
        Some(path) => {
            let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            let set = load_schemas(&source).map_err(anyhow::Error::msg).with_context(|| format!("loading {}", path))?;
            let name = match &opts.schema_name {
                Some(name) => name.clone(),
                None => set.names().next().context("schema file declares no schema")?.to_string(),
            };
            set.get(&name).with_context(|| format!("no schema named {} in {}", name, path))?
        }
        None => schema::iso8583_1993(),
    };

    let mut inspector = Inspector::new(schema, opts.safe);
    let stdout = io::stdout().lock();
    match &opts.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path))?;
            inspector.run(BufReader::new(file), stdout, false)?;
        }
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal();
            inspector.run(stdin.lock(), stdout, prompt)?;
        }
    }
    Ok(())
}
