mod input;
mod properties;

use clap::{Parser, ValueEnum};
use serde_json::Map;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stacq::filter::{self, Dialect, Node};
use stacq::search::{self, Filter};

const DEFAULT_LOG: &str = "warn";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Output {
    Json,
    Odata,
    Sql,
}

#[derive(Parser)]
#[command(name = "stacq", about = "Parse, validate and translate CQL2-JSON filters for STAC search")]
struct Cli {
    #[arg(long, help = "Read the filter from a .json, .yaml or .yml file")]
    file: Option<PathBuf>,

    #[arg(long, help = "Read the filter from stdin")]
    stdin: bool,

    #[arg(long, value_enum, env = "STACQ_DIALECT", default_value = "json")]
    dialect: Output,

    #[arg(long, help = "Print a search request body carrying the filter")]
    request: bool,

    #[arg(long, requires = "request", help = "Embed a pre-rendered CQL2 text filter (with --request)")]
    text: Option<String>,

    #[arg(long, help = "List property names referenced by the filter")]
    properties: bool,

    #[arg(long, help = "Show count for each property (use with --properties)")]
    count: bool,

    #[arg(long, help = "Validate every filter document under a directory")]
    check: Option<PathBuf>,

    #[arg(long, env = "STACQ_LOG", help = "Log filter directives, e.g. debug")]
    log: Option<String>,

    #[arg(help = "Inline CQL2-JSON filter")]
    filter: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    if let Some(dir) = &cli.check {
        return run_check_mode(dir, cli.properties, cli.count);
    }

    if let Some(text) = cli.text {
        return print_request(&Filter::Cql2Text(text));
    }

    let loaded = if let Some(path) = &cli.file {
        input::load_filter(path)
    } else if cli.stdin {
        input::read_stdin()
    } else if let Some(inline) = &cli.filter {
        input::decode(inline, false)
    } else {
        eprintln!("Error: No filter provided. Pass it inline, with --file or with --stdin");
        return ExitCode::from(2);
    };

    let node = match loaded {
        Ok(node) => node,
        Err(e) => {
            eprintln!("Filter error: {}", e);
            return ExitCode::from(2);
        }
    };

    if cli.properties {
        return run_properties_mode(&[("filter".to_string(), node)], cli.count);
    }

    if cli.request {
        return print_request(&Filter::Cql2Json(node));
    }

    run_output_mode(&node, cli.dialect)
}

fn init_logging(directives: Option<&str>) {
    let filter = directives
        .map(str::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG.to_string());

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(filter)
        .init();
}

fn run_output_mode(node: &Node, output: Output) -> ExitCode {
    let rendered = match output {
        Output::Json => Ok(filter::serialize::to_string_pretty(node)),
        Output::Odata => Dialect::OData.translate(node),
        Output::Sql => Dialect::Sql.translate(node),
    };

    match rendered {
        Ok(text) => {
            println!("{}", text);
            ExitCode::from(0)
        }
        Err(e) => {
            eprintln!("Translate error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn print_request(filter: &Filter) -> ExitCode {
    let body = search::search_body(Map::new(), Some(filter));
    match serde_json::to_string_pretty(&body) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::from(0)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run_properties_mode(filters: &[(String, Node)], show_count: bool) -> ExitCode {
    if print_properties(filters, show_count) {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}

/// Prints the property listing, returning false when no property was found.
fn print_properties(filters: &[(String, Node)], show_count: bool) -> bool {
    let counts = properties::collect_properties(filters);

    if counts.is_empty() {
        return false;
    }

    for line in properties::format_properties(counts, show_count) {
        println!("{}", line);
    }

    true
}

fn run_check_mode(dir: &Path, list_properties: bool, show_count: bool) -> ExitCode {
    let files = input::collect_filter_files(dir);
    if files.is_empty() {
        eprintln!("Error: No filter documents found under {}", dir.display());
        return ExitCode::from(1);
    }

    let mut valid = Vec::new();
    let mut failed = false;

    for path in files {
        let display_path = path.strip_prefix(dir).unwrap_or(&path).display().to_string();
        match input::load_filter(&path) {
            Ok(node) => valid.push((display_path, node)),
            Err(e) => {
                failed = true;
                println!("{}: {}", display_path, e);
            }
        }
    }

    tracing::info!(valid = valid.len(), failed, "checked filter documents");

    // An empty listing fails the check the same way it fails a single filter.
    if list_properties && !print_properties(&valid, show_count) {
        eprintln!("Error: No properties referenced under {}", dir.display());
        failed = true;
    }

    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    }
}
