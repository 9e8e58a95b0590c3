use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use serde_json::{json, Value};

use serverconfig::i18n::{Catalog, Identity, Translator};
use serverconfig::parser::detect_protocol;
use serverconfig::{Protocol, ServerConfigHelper, ServerRecord, Settings};

/// Parse, validate and render proxy server entries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse share links and print the normalized records as JSON
    Parse {
        #[arg(required = true, value_name = "LINK")]
        links: Vec<String>,
    },
    /// Import an engine or Shadowsocks GUI document, or a subscription body
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Validate records and print the proxies YAML document
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Treat FILE as a JSON array of records of this protocol
        #[arg(short, long, value_name = "PROTOCOL")]
        protocol: Option<String>,
    },
}

/// Reads records from a foreign document, falling back to a subscription body.
fn import_records(helper: &ServerConfigHelper, content: &str, source: &str) -> Vec<(Protocol, ServerRecord)> {
    match helper.import_document(content) {
        Ok((protocol, records)) => records.into_iter().map(|r| (protocol, r)).collect(),
        Err(e) => {
            info!("{} is not a configuration document ({}), reading it as a subscription", source, e);
            helper.parse_subscription(content, "")
        }
    }
}

fn print_records(servers: &[(Protocol, ServerRecord)]) -> Result<()> {
    let output: Vec<Value> = servers
        .iter()
        .map(|(protocol, record)| json!({"protocol": protocol.as_str(), "record": record}))
        .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    if let Some(path) = &args.config {
        let settings = Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        Settings::set_current(settings);
    }
    let settings = Settings::current();

    let catalog = match &settings.catalog {
        Some(path) => Some(
            Catalog::load(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        ),
        None => None,
    };
    let translator: &dyn Translator = match &catalog {
        Some(catalog) => catalog,
        None => &Identity,
    };

    let helper = ServerConfigHelper::new(Arc::clone(&settings)).with_translator(translator);

    match args.command {
        Command::Parse { links } => {
            let servers: Vec<(Protocol, ServerRecord)> = links
                .iter()
                .map(|link| {
                    let protocol = detect_protocol(link);
                    (protocol, helper.parse_share_link(protocol, link, ""))
                })
                .collect();
            print_records(&servers)?;
        }
        Command::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let servers = import_records(&helper, &content, &file.display().to_string());
            info!("Imported {} servers from {}", servers.len(), file.display());
            print_records(&servers)?;
        }
        Command::Render { file, protocol } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let servers = match protocol {
                Some(name) => {
                    let protocol = Protocol::from_name(&name);
                    let records: Vec<ServerRecord> = serde_json::from_str(&content)
                        .with_context(|| format!("{} is not a JSON array of records", file.display()))?;
                    records.into_iter().map(|r| (protocol, r)).collect()
                }
                None => import_records(&helper, &content, &file.display().to_string()),
            };

            let mut names: HashSet<String> = HashSet::new();
            let mut valid = Vec::new();
            for (protocol, record) in servers {
                let errors = ServerConfigHelper::new(Arc::clone(&settings))
                    .with_translator(translator)
                    .with_names(&names)
                    .validate(protocol, &record, None);
                if errors.is_empty() {
                    names.insert(record.server_name().to_string());
                    valid.push((protocol, record));
                } else {
                    warn!("Rejecting server '{}'", record.server_name());
                    for error in errors {
                        eprintln!("{}: {}", record.server_name(), error);
                    }
                }
            }

            print!("{}", helper.render_proxies(&valid)?);
        }
    }

    Ok(())
}
