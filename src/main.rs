use calculated_panel::{Panel, PanelManifest, PanelOptions};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn, Level};

/// Play the host for a calculated panel: print its manifest, show what it
/// would request from the data layer, or evaluate it against records.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the registration manifest as JSON
    Manifest,
    /// Evaluate the panel against a record (or an array of records)
    Eval {
        /// Panel options as JSON, or @path to a JSON file
        #[arg(long)]
        options: String,
        /// Record object or array of records as JSON, or @path
        #[arg(long)]
        record: String,
    },
    /// Print the fields and filter the panel asks the host for
    Request {
        /// Panel options as JSON, or @path to a JSON file
        #[arg(long)]
        options: String,
    },
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(msg) = run(args.command) {
        eprintln!("{msg}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Manifest => print_json(&PanelManifest::calculated()),
        Command::Request { options } => {
            let panel = Panel::new(&load_options(&options)?);
            if let Err(err) = panel.validate() {
                warn!(%err, "panel expression will not evaluate");
            }
            print_json(&panel.data_request())
        }
        Command::Eval { options, record } => {
            let panel = Panel::new(&load_options(&options)?);
            let record = read_json("record", &record)?;
            match &record {
                Value::Array(records) => {
                    info!(count = records.len(), "evaluating records");
                    print_json(&panel.evaluate_all(records))
                }
                single => print_json(&panel.evaluate(single)),
            }
        }
    }
}

fn load_options(arg: &str) -> Result<PanelOptions, String> {
    let value = read_json("options", arg)?;
    let options = PanelOptions::from_value(&value).map_err(|e| e.to_string())?;
    debug!(mode = ?options.mode(), "options loaded");
    Ok(options)
}

/// Inline JSON, or the contents of a file when the argument starts with `@`.
fn read_json(what: &str, arg: &str) -> Result<Value, String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {what} file {path}: {e}"))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid {what} JSON: {e}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}
